//! Garasi API Server
//!
//! Serves a vehicle catalog from a single flat JSON file.

use anyhow::{Context, Result};
use clap::Parser;
use garasi::{catalog_store::CatalogStore, observability::init_logging_with_level, start_server};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Garasi vehicle catalog API server")]
struct Args {
    /// Path to the catalog database file
    #[arg(short = 'f', long, default_value = "database/db.json", env = "DB_PATH")]
    db_path: PathBuf,

    /// Server port
    #[arg(short = 'p', long, default_value = "5000", env = "APP_PORT")]
    port: u16,

    /// Freeze the category/type views at load time (legacy behavior:
    /// categories and types added at runtime stay invisible to reads)
    #[arg(long, env = "STALE_VIEWS")]
    stale_views: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging_with_level(args.verbose, args.quiet)?;

    info!("Starting garasi API server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Catalog file: {}", args.db_path.display());
    info!("Port: {}", args.port);

    // The catalog file must exist and parse; there is no recovery path.
    let store = CatalogStore::load(&args.db_path, args.stale_views)
        .await
        .context("cannot start without a readable catalog file")?;
    let store = Arc::new(Mutex::new(store));

    start_server(store, args.port).await
}
