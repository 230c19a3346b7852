use anyhow::{Context, Result};
use order::{
    abstract_trait::QueueKind,
    config::Config,
    handler::AppRouter,
    state::AppState,
    worker::{NotificationHandler, ProcessingHandler, QueueWorker},
};
use shared::{
    config::AwsClients,
    utils::{Telemetry, init_logger},
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, state, telemetry) = setup().await.context("Failed to setup application")?;

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let handles = run_services(&config, state, &shutdown_tx);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received (Ctrl+C).");
        }
        _ = shutdown_rx.recv() => {
            info!("🛑 Shutdown signal received from internal component.");
        }
    }

    let _ = shutdown_tx.send(());
    shutdown(telemetry, handles).await;

    Ok(())
}

async fn setup() -> Result<(Config, Arc<AppState>, Telemetry)> {
    dotenv::dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::init("order-service", &config.otel_endpoint)
        .context("Failed to initialize telemetry")?;

    init_logger(
        telemetry.logger_provider(),
        "order-service",
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
    Ok((config, state, telemetry))
}

fn run_services(
    config: &Config,
    state: Arc<AppState>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    let port = config.port;
    let server_state = state.clone();
    let server_shutdown = shutdown_tx.subscribe();
    let server_shutdown_tx = shutdown_tx.clone();
    handles.push(tokio::spawn(async move {
        if let Err(e) = AppRouter::serve(port, server_state, server_shutdown).await {
            error!("HTTP server failed: {e}");
            let _ = server_shutdown_tx.send(());
        }
    }));

    let processing_worker = QueueWorker::new(
        state.di_container.order_queue.clone(),
        ProcessingHandler::new(
            state.di_container.order_command_repository.clone(),
            state.di_container.order_queue.clone(),
        ),
        QueueKind::Processing,
        state.worker_metrics.clone(),
    );
    let processing_shutdown = shutdown_tx.subscribe();
    handles.push(tokio::spawn(async move {
        processing_worker.run(processing_shutdown).await;
    }));

    let notification_worker = QueueWorker::new(
        state.di_container.order_queue.clone(),
        NotificationHandler::new(state.di_container.notification_topic.clone()),
        QueueKind::Notification,
        state.worker_metrics.clone(),
    );
    let notification_shutdown = shutdown_tx.subscribe();
    handles.push(tokio::spawn(async move {
        notification_worker.run(notification_shutdown).await;
    }));

    handles
}

async fn shutdown(telemetry: Telemetry, handles: Vec<tokio::task::JoinHandle<()>>) {
    info!("🛑 Shutting down all services...");

    let shutdown_timeout = tokio::time::Duration::from_secs(30);
    for handle in handles {
        match tokio::time::timeout(shutdown_timeout, handle).await {
            Ok(Err(e)) => error!("Service task panicked: {e}"),
            Err(_) => warn!("⚠️  Shutdown timeout reached, forcing exit."),
            Ok(Ok(())) => {}
        }
    }

    if let Err(e) = telemetry.shutdown().await {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Order Service shutdown complete.");
}
