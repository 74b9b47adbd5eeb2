//! Shopfloor RS Server
//!
//! Hosts the flat-file entity store behind its HTTP surface: per-collection
//! read/replace, the sync snapshot, and the backup/restore protocol.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sf_core::AppConfig;
use sf_store::FileStore;

mod error;
mod handlers;

use handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config_path =
        PathBuf::from(std::env::var("SHOPFLOOR_CONFIG").unwrap_or_else(|_| "config.json".into()));
    let config = AppConfig::load(&config_path).apply_env();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        data_dir = %config.database.data_dir,
        "Starting Shopfloor RS"
    );

    let store = Arc::new(
        FileStore::open(&config.database.data_dir)?.with_config_path(&config_path),
    );

    let addr = config.server_addr();
    let state = Arc::new(AppState {
        store,
        config: RwLock::new(config),
        config_path,
    });

    let app = build_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sf_server=debug,sf_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Build the application router
fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/save-config", post(handlers::save_config))
        .route("/users", get(handlers::get_users).post(handlers::put_users))
        .route("/users/:username", axum::routing::delete(handlers::delete_user))
        .route("/department-users/:department", get(handlers::department_users))
        .route(
            "/projects",
            get(handlers::get_projects).post(handlers::put_projects),
        )
        .route(
            "/processes",
            get(handlers::get_processes).post(handlers::put_processes),
        )
        .route(
            "/daily-reports",
            get(handlers::get_daily_reports).post(handlers::put_daily_reports),
        )
        .route("/sync-data", get(handlers::sync_data))
        .route("/backup", post(handlers::create_backup))
        .route("/backup/auto", post(handlers::create_auto_backup))
        .route("/backup/auto/status", get(handlers::auto_backup_status))
        .route("/backup/:name", axum::routing::delete(handlers::delete_backup))
        .route("/backups", get(handlers::list_backups))
        .route("/restore/:name", post(handlers::restore_backup))
        .route("/data-stats", get(handlers::data_stats));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
