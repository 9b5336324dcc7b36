use anyhow::{Context, Result};
use art_connoisseur::config::AppConfig;
use art_connoisseur::report::{PipelineSettings, ReportPipeline};
use art_connoisseur::web::{build_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let bind_addr = config.bind_addr;
    info!(
        vision_model = %config.vision_model,
        research_model = %config.research_model,
        report_model = %config.report_model,
        "Art Connoisseur starting"
    );

    let pipeline = ReportPipeline::new(PipelineSettings::from(&config));
    let state = AppState::new(config, Arc::new(pipeline));
    state.sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
