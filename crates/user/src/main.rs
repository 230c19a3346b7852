use anyhow::{Context, Result};
use shared::{
    config::AwsClients,
    utils::{Telemetry, init_logger},
};
use std::sync::Arc;
use tracing::{error, info};
use user::{config::Config, handler::AppRouter, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::init("user-service", &config.otel_endpoint)
        .context("Failed to initialize telemetry")?;

    init_logger(
        telemetry.logger_provider(),
        "user-service",
        is_dev,
        is_enable_file,
    );

    let aws = AwsClients::init().await;

    let state = Arc::new(
        AppState::new(&aws, &config)
            .await
            .context("Failed to create AppState")?,
    );

    info!("✅ Application setup completed successfully.");

    AppRouter::serve(config.port, state).await?;

    if let Err(e) = telemetry.shutdown().await {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ User Service shutdown complete.");

    Ok(())
}
