mod gracefullshutdown;
mod logs;
mod metrics;
mod otel;

pub use self::gracefullshutdown::shutdown_signal;
pub use self::logs::init_logger;
pub use self::metrics::{
    Method, Metrics, Status, SystemMetrics, WorkerMetrics, WorkerOutcome, WorkerQueue,
    run_metrics_collector,
};
pub use self::otel::{Telemetry, TracingContext};
