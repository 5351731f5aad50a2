mod config;
mod core;
mod interfaces;

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::interfaces::web::{AppState, build_api_router};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let config = Config::from_env();
    if !config.api_configured() {
        warn!("GEMINI_API_KEY is not configured; /api/analyze will return setup instructions");
    }

    let state = AppState::from_config(&config);
    let app = build_api_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("FishCast API running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
