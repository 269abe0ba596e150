mod config;
mod document;
mod errors;
mod extract;
mod form;
mod generation;
mod ledger;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::default_page_style;
use crate::llm_client::ChatCompletionClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::{AppState, PipelineSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting prior authorization API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client (single attempt per request, bounded by timeout)
    let completion = ChatCompletionClient::new(
        config.completion_api_url.clone(),
        config.groq_api_key.clone(),
        config.completion_timeout,
    )?;
    info!(
        "Completion client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.completion_timeout.as_secs()
    );

    let settings = PipelineSettings {
        page_style: default_page_style(),
        retention: config.retention,
    };
    info!(
        "Ledger keeps the first {} chars of each generated document",
        settings.retention.snippet_chars
    );

    // Session store plus a background sweeper for idle sessions
    let sessions = Arc::new(SessionStore::with_limits(config.session_limits));
    info!(
        "Sessions expire after {}s idle (max {})",
        config.session_limits.idle_ttl.as_secs(),
        config.session_limits.max_sessions
    );
    tokio::spawn(sweep_idle_sessions(Arc::clone(&sessions)));

    // Build app state
    let state = AppState {
        completion: Arc::new(completion),
        sessions,
        settings,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the form front-end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops idle sessions so abandoned ones do not pile up.
async fn sweep_idle_sessions(sessions: Arc<SessionStore>) {
    let period = (sessions.limits().idle_ttl / 4).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        sessions.evict_idle().await;
    }
}
