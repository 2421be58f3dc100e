// HTTP REST API Server Implementation
// One handler per endpoint. Category and type path segments are validated
// against the index views, request bodies against the schema checks in
// `validation`, and every mutation goes through the catalog store, which
// persists before the handler answers.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, sync::Mutex};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    catalog_store::{CatalogError, CatalogStore},
    http_types::{ApiResponse, MessageResponse},
    observability::with_trace_id,
    types::{parse_year, Catalog, Vehicle, VehicleGroup},
    validation::{validate_name, validate_vehicle},
};

// Global server start time for uptime tracking
static SERVER_START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<CatalogStore>>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Error side of every handler: status plus message-only envelope.
type ApiError = (StatusCode, Json<MessageResponse>);

fn client_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(MessageResponse::new(message)))
}

fn server_error(operation: &str, err: impl std::fmt::Display) -> ApiError {
    warn!("{} failed: {}", operation, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::internal_server_error()),
    )
}

/// Create HTTP server with all routes configured.
///
/// matchit allows one parameter name per segment position, so the two
/// root-level dynamic GET routes share the `releaseYear` segment name; the
/// three-segment route reads it as the category.
pub fn create_server(store: Arc<Mutex<CatalogStore>>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(health_check))
        .route("/all/:category", get(all_by_category))
        .route("/all/:category/:type", get(all_by_type))
        .route("/:releaseYear", get(vehicles_by_year))
        .route("/:releaseYear/:type/:name", get(vehicle_by_name))
        .route("/add/:category/:type", post(add_vehicle))
        .route("/add-category", post(add_category))
        .route("/add-type/:category", post(add_type))
        .route("/update/:category/:type/:name", put(update_vehicle))
        .route("/delete/:category/:type/:name", delete(delete_vehicle))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Start the HTTP server on the specified port.
pub async fn start_server(store: Arc<Mutex<CatalogStore>>, port: u16) -> Result<()> {
    let app = create_server(store);
    let listener = TcpListener::bind(&format!("0.0.0.0:{port}")).await?;

    info!("garasi HTTP server starting on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    let uptime_seconds = SERVER_START_TIME.elapsed().as_secs();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
    })
}

/// GET /all/:category - every vehicle group under a category
async fn all_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<VehicleGroup>>, ApiError> {
    let store = state.store.lock().await;
    if !store.views().contains_category(&category) {
        return Err(client_error(StatusCode::NOT_FOUND, "Category Not Found"));
    }
    match store.category(&category) {
        Some(group) => Ok(Json(ApiResponse::new(group.clone(), "success"))),
        None => Err(client_error(StatusCode::NOT_FOUND, "Category Not Found")),
    }
}

/// GET /all/:category/:type - the vehicle list for one type
async fn all_by_type(
    State(state): State<AppState>,
    Path((category, ty)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, ApiError> {
    let store = state.store.lock().await;
    let views = store.views();
    if !views.contains_category(&category) || !views.contains_type(&category, &ty) {
        return Err(client_error(StatusCode::NOT_FOUND, "Data Not Found"));
    }
    match store.vehicles(&category, &ty) {
        Some(vehicles) => Ok(Json(ApiResponse::new(vehicles.to_vec(), "success"))),
        None => Err(client_error(StatusCode::NOT_FOUND, "Data Not Found")),
    }
}

/// GET /:category/:type/:name - single vehicle, case-insensitive name match
async fn vehicle_by_name(
    State(state): State<AppState>,
    Path((category, ty, name)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let store = state.store.lock().await;
    let views = store.views();
    if !views.contains_category(&category) || !views.contains_type(&category, &ty) {
        return Err(client_error(StatusCode::NOT_FOUND, "Data Not Found"));
    }
    match store.find_vehicle(&category, &ty, &name) {
        Some(vehicle) => Ok(Json(ApiResponse::new(vehicle.clone(), "success"))),
        None => Err(client_error(StatusCode::NOT_FOUND, "Data Not Found")),
    }
}

/// GET /:releaseYear - union of matching vehicles across the whole catalog
async fn vehicles_by_year(
    State(state): State<AppState>,
    Path(release_year): Path<String>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, ApiError> {
    let matches = match parse_year(&release_year) {
        Some(year) => state.store.lock().await.vehicles_by_year(year),
        // A non-numeric segment can never match a stored year.
        None => Vec::new(),
    };
    if matches.is_empty() {
        return Err(client_error(StatusCode::NOT_FOUND, "Data Not Found"));
    }
    Ok(Json(ApiResponse::new(matches, "success")))
}

/// POST /add/:category/:type - create a vehicle
async fn add_vehicle(
    State(state): State<AppState>,
    Path((category, ty)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), ApiError> {
    let vehicle = validate_vehicle(&body)
        .map_err(|e| client_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let created = vehicle.clone();
    let result = with_trace_id("add_vehicle", async {
        let mut store = state.store.lock().await;
        store.insert_vehicle(&category, &ty, vehicle).await
    })
    .await;

    match result {
        Ok(()) => Ok((StatusCode::CREATED, Json(ApiResponse::new(created, "Created")))),
        Err(CatalogError::UnknownCategory(_)) | Err(CatalogError::UnknownType(_, _)) => Err(
            client_error(StatusCode::NOT_FOUND, "Data category and type not found"),
        ),
        Err(CatalogError::DuplicateName(_)) => Err(client_error(
            StatusCode::BAD_REQUEST,
            "Data With That Name Already Existed",
        )),
        Err(e) => Err(server_error("add_vehicle", e)),
    }
}

/// POST /add-category - create an empty category
async fn add_category(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Catalog>>), ApiError> {
    let name =
        validate_name(&body).map_err(|e| client_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = with_trace_id("add_category", async {
        let mut store = state.store.lock().await;
        store.add_category(&name).await?;
        Ok::<Catalog, CatalogError>(store.catalog().clone())
    })
    .await;

    match result {
        Ok(catalog) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(catalog, "Created new category")),
        )),
        Err(CatalogError::CategoryExists(_)) => Err(client_error(
            StatusCode::CONFLICT,
            "Category Already Exists",
        )),
        Err(e) => Err(server_error("add_category", e)),
    }
}

/// POST /add-type/:category - create an empty type under a category
async fn add_type(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Catalog>>), ApiError> {
    let name =
        validate_name(&body).map_err(|e| client_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = with_trace_id("add_type", async {
        let mut store = state.store.lock().await;
        store.add_type(&category, &name).await?;
        Ok::<Catalog, CatalogError>(store.catalog().clone())
    })
    .await;

    match result {
        Ok(catalog) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(catalog, "Created new type")),
        )),
        Err(CatalogError::UnknownCategory(_)) => {
            Err(client_error(StatusCode::NOT_FOUND, "Category Not Found"))
        }
        Err(CatalogError::TypeExists(_)) => {
            Err(client_error(StatusCode::CONFLICT, "Data Already Exists"))
        }
        Err(e) => Err(server_error("add_type", e)),
    }
}

/// PUT /update/:category/:type/:name - full-record replacement
async fn update_vehicle(
    State(state): State<AppState>,
    Path((category, ty, name)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let vehicle = validate_vehicle(&body)
        .map_err(|e| client_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let updated = vehicle.clone();
    let result = with_trace_id("update_vehicle", async {
        let mut store = state.store.lock().await;
        store.replace_vehicle(&category, &ty, &name, vehicle).await
    })
    .await;

    match result {
        Ok(()) => Ok(Json(ApiResponse::new(updated, "Updated"))),
        Err(CatalogError::UnknownCategory(_))
        | Err(CatalogError::UnknownType(_, _))
        | Err(CatalogError::UnknownVehicle(_)) => {
            Err(client_error(StatusCode::NOT_FOUND, "Data not found"))
        }
        Err(e) => Err(server_error("update_vehicle", e)),
    }
}

/// DELETE /delete/:category/:type/:name - remove all matching vehicles
async fn delete_vehicle(
    State(state): State<AppState>,
    Path((category, ty, name)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let result = with_trace_id("delete_vehicle", async {
        let mut store = state.store.lock().await;
        store.delete_vehicle(&category, &ty, &name).await
    })
    .await;

    match result {
        Ok(()) => Ok(Json(MessageResponse::new("Deleted"))),
        Err(CatalogError::UnknownCategory(_))
        | Err(CatalogError::UnknownType(_, _))
        | Err(CatalogError::UnknownVehicle(_)) => {
            Err(client_error(StatusCode::NOT_FOUND, "Data not found"))
        }
        Err(e) => Err(server_error("delete_vehicle", e)),
    }
}
