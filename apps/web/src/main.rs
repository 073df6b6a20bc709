mod api_client;
mod config;
mod errors;
mod lifecycle;
mod models;
mod pages;
mod quiz;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::quiz::SessionRegistry;
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing or malformed API origin)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PulseLoop web v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the PulseLoop API client
    let backend = ApiClient::new(
        config.api_url.clone(),
        config.api_token.clone(),
        config.api_timeout,
    )?;
    info!(
        "API client initialized (origin: {}, timeout: {:?})",
        config.api_url, config.api_timeout
    );

    // Quiz sessions expire after sitting idle
    let quiz_sessions = Arc::new(SessionRegistry::new(config.quiz_session_ttl));
    Arc::clone(&quiz_sessions).spawn_sweeper(SESSION_SWEEP_INTERVAL);

    // Build app state
    let state = AppState {
        backend: Arc::new(backend),
        config: config.clone(),
        quiz_sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
