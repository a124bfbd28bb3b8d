//! Ziel Analytics - Backend Server
//!
//! Serves the dashboard API over the in-memory dataset store, restoring
//! the last saved snapshot on startup.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ziel_backend::services::store::DatasetStore;
use ziel_backend::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ziel_backend=debug,ziel_server=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Ziel Analytics Server");
    tracing::info!("Environment: {}", config.environment);

    // Restore the dataset snapshot from disk, if any
    let store = DatasetStore::load(Path::new(&config.storage.data_dir))?;
    let state = AppState {
        store: Arc::new(tokio::sync::RwLock::new(store)),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
