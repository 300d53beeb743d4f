//! Keepsake - love-album publishing service

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::Config;
use keepsake_api::{create_router, AppState};
use keepsake_auth::JwtManager;
use keepsake_core::{spawn_purge_task, AlbumService, AnalyticsService, TtlCache};
use keepsake_db::Database;
use keepsake_storage::LocalStorage;

/// Keepsake - publish love albums at slug URLs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "KEEPSAKE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "KEEPSAKE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Keepsake v{}", env!("CARGO_PKG_VERSION"));

    // Create data directories
    tokio::fs::create_dir_all(&config.storage.path).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Create a default admin account if none exist
    if !db.has_admins().await? {
        info!("Creating default admin account");
        let password_hash = keepsake_auth::hash_password("admin123")?;
        db.insert_admin(keepsake_db::NewAdmin {
            account: "admin".to_string(),
            password_hash,
        })
        .await?;
        info!("Default admin account created (account: admin, password: admin123)");
    }

    // Initialize upload storage
    let storage = Arc::new(LocalStorage::new(&config.storage.path).await?);

    // Initialize the album cache and its background sweep
    let cache = Arc::new(TtlCache::new(Duration::from_secs(config.cache.ttl_seconds)));
    spawn_purge_task(cache.clone(), config.cache.sweep_interval_seconds);

    // Initialize services
    let albums = Arc::new(AlbumService::new(db.clone(), storage.clone(), cache));
    let analytics = Arc::new(AnalyticsService::new(db.clone()));

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.token_expiry_hours,
    ));

    // Install the Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map(Arc::new)
        .ok();

    // Create application state
    let state = AppState::new(db, albums, analytics, storage, jwt);

    // Create router
    let app = create_router(state, metrics_handle)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
