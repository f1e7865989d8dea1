//! LMS Server - Library Management System
//!
//! Serves the librarian and user routes over HTTP.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_server::{api, config::AppConfig, connect_database, AppState, MIGRATOR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lms_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting LMS Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = connect_database(&config.database).await?;
    tracing::info!("Connected to database");

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database migrations completed");

    tokio::fs::create_dir_all(&config.storage.sections_dir).await?;
    tracing::info!("Storing sections under {}", config.storage.sections_dir);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(config, pool);
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
