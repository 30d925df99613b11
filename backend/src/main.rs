use anyhow::Context;
use axum::http::HeaderValue;
use tracing::info;
use tracing_subscriber::EnvFilter;

use budget_tracker_backend::config::Config;
use budget_tracker_backend::db::DbConnection;
use budget_tracker_backend::domain::BudgetService;
use budget_tracker_backend::rest::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    info!("Setting up database");
    let db = DbConnection::new(&config.database_url)
        .await
        .context("failed to open the database")?;

    let cors_origin: HeaderValue = config
        .cors_origin
        .parse()
        .context("CORS_ORIGIN is not a valid header value")?;

    let state = AppState::new(BudgetService::new(db));
    let app = create_router(state, cors_origin);

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
