mod config;
mod error;
mod gemini;
mod generator;
mod mock;
mod routes;
mod state;
mod vertex;
mod wire;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables already in the environment take precedence over .env.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "askai=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(path) => info!("loaded {}", path.display()),
        Err(_) => info!("no .env file found, using process environment"),
    }

    let config = config::Config::from_env();
    info!(
        port = config.port,
        api_key = if config.api_key.is_some() { "set" } else { "not set" },
        project_id = config.project_id.as_deref().unwrap_or("not set"),
        location = %config.location,
        vertex_model = %config.vertex_model,
        timeout_secs = config.request_timeout.as_secs(),
        "configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config).await);
    info!(strategy = %state.generator.kind(), "reply strategy selected");

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("server running at http://localhost:{}", config.port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
