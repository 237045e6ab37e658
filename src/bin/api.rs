use financial_advisor_engine::{api::start_server, AdvisorConfig, AdvisorContext};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AdvisorConfig::from_env()?;

    info!("🚀 Financial Advisor Engine - API Server");
    info!("📍 Port: {}", config.port);

    let context = Arc::new(AdvisorContext::from_config(&config)?);

    info!("✅ Advisor context initialized");
    info!("📡 Starting API server...");

    start_server(context, config.port).await?;

    Ok(())
}
