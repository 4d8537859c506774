//! Kiosk Server - Offline-first attendance and inventory kiosk
//!
//! A site-local REST server for recording punches and inventory counts,
//! reconciled with the cloud in the background.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk_server::{
    api,
    cloud::{CloudClient, HttpProber},
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing: console plus a daily rolling file, so a kiosk in
    // the field keeps logs across restarts
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("kiosk_server={},tower_http=debug", config.logging.level).into());

    let file_appender = tracing_appender::rolling::daily(&config.logging.directory, "kiosk.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    tracing::info!("Starting Kiosk Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the local store
    let connect_options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await
        .expect("Failed to open local store");

    tracing::info!("Local store opened");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Cloud boundary
    let cloud = Arc::new(CloudClient::new(&config.cloud).expect("Failed to create cloud client"));
    let prober = Arc::new(HttpProber::new(&config.connectivity));

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Arc::new(Services::new(
        repository,
        cloud,
        prober,
        config.sync.clone(),
    ));

    // Start the background sync engine
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = Arc::clone(&services.sync);
    tokio::spawn(engine.run(shutdown_rx));

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the sync engine with the server
    let _ = shutdown_tx.send(true);

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Kiosk: punches and device bindings
        .route("/kiosk/punch", post(api::kiosk::punch))
        .route("/kiosk/link", post(api::kiosk::link))
        .route("/kiosk/verify", get(api::kiosk::verify))
        .route("/kiosk/unlink", post(api::kiosk::unlink))
        .route("/employees", get(api::kiosk::list_employees))
        .route("/attendance/today", get(api::kiosk::today))
        // Inventory
        .route("/inventory-counts", post(api::inventory::create_count))
        .route("/products", get(api::inventory::list_products))
        // Sync
        .route("/sync/status", get(api::sync::status))
        .route("/sync/log", get(api::sync::log))
        .route("/sync/now", post(api::sync::sync_now))
        .route("/sync/refresh-employees", post(api::sync::refresh_employees))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
