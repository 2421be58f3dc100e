// Garasi - flat-file vehicle catalog REST API
// Root library module

pub mod catalog_store;
pub mod http_server;
pub mod http_types;
pub mod index_views;
pub mod observability;
pub mod types;
pub mod validation;

// Re-export key types
pub use observability::{init_logging, init_logging_with_level, with_trace_id};

pub use types::{parse_year, Catalog, Vehicle, VehicleGroup};

pub use catalog_store::{CatalogError, CatalogStore};

pub use index_views::IndexViews;

pub use http_server::{create_server, start_server};

pub use http_types::{ApiResponse, MessageResponse};

pub use validation::{validate_name, validate_vehicle, ValidationError};
