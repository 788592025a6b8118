use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use skycast::api::AppState;
use skycast::{OpenWeatherClient, SkycastConfig, Store, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkycastConfig::load()?;
    init_tracing(&config);

    let store = Store::open(&config.database.path)
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    let provider = Arc::new(OpenWeatherClient::new(&config.weather)?);

    let state = AppState::new(store, provider);
    web::run(&config.server.host, config.server.port, state).await
}

fn init_tracing(config: &SkycastConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
