//! Talk-to-me server
//!
//! HTTP service that forwards prompts to the OpenAI Responses API and returns
//! the normalized answer with an approximate token usage estimate

use anyhow::{Context, Result};
use talktome::config::{load_model_limits, settings::LoggingConfig, Settings};
use talktome::create_router;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load server settings")?;

    // Initialize logging
    init_logging(&settings.logging)?;
    info!("{}", talktome::version_info());

    if !settings.has_api_key() {
        warn!("OPENAI_API_KEY is not set; prompt requests will fail until it is configured");
    }

    // Load model context limits
    let limits = load_model_limits(settings.model_limits_file.as_deref())
        .context("Failed to load model limits")?;
    info!(
        "📁 Model limits loaded: {} models, default {}",
        limits.len(),
        limits.default_limit()
    );

    // Create application
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app = create_router(settings, limits).await?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("🔄 Prompt endpoint: http://{}/api/talktome", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Text format logs (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Logging system initialized");
    Ok(())
}
