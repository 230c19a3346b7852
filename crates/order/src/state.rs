use crate::{config::Config, di::DependenciesInject};
use anyhow::Result;
use prometheus_client::registry::Registry;
use shared::{
    config::AwsClients,
    utils::{SystemMetrics, WorkerMetrics, run_metrics_collector},
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
    pub worker_metrics: WorkerMetrics,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("system_metrics", &"SystemMetrics")
            .finish()
    }
}

impl AppState {
    pub async fn new(aws: &AwsClients, config: &Config) -> Result<Self> {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let system_metrics = Arc::new(SystemMetrics::new());
        let worker_metrics = WorkerMetrics::new();

        let di_container = DependenciesInject::new(aws, config, registry.clone()).await;

        {
            let mut registry = registry.lock().await;
            system_metrics.register(&mut registry);
            worker_metrics.register(&mut registry);
        }

        tokio::spawn(run_metrics_collector(system_metrics.clone()));

        Ok(Self {
            di_container,
            registry,
            system_metrics,
            worker_metrics,
        })
    }
}
