use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use notebridge_core::{AgentBackend, DisabledBackend};
use notebridge_letta::{LettaClient, LettaConfig};
use notebridge_server::{app, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,notebridge=debug")),
        )
        .init();

    let letta = LettaConfig::from_env()?;
    let backend: Arc<dyn AgentBackend> = if letta.is_configured() {
        if letta.can_create_agents() {
            tracing::info!(
                api_base = %letta.api_base,
                project = %letta.project,
                template = ?letta.template_version,
                "letta integration enabled"
            );
        } else {
            tracing::warn!(
                api_base = %letta.api_base,
                project = %letta.project,
                "LETTA_TEMPLATE_VERSION not set; agents cannot be created and analysis will report not configured"
            );
        }
        Arc::new(LettaClient::new(letta)?)
    } else {
        tracing::warn!("LETTA_API_KEY not set; running with agent integration disabled");
        Arc::new(DisabledBackend)
    };

    let mut state = AppState::new(backend);
    if let Some(path) = &config.notebook_log {
        state = state.with_notebook_log(path.clone());
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        allowed_origin = %config.allowed_origin,
        "notebridge listening"
    );
    axum::serve(listener, app(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
