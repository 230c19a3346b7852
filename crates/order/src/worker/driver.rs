use crate::abstract_trait::queue::{DynOrderQueue, QueueDelivery, QueueKind};
use async_trait::async_trait;
use shared::{
    errors::ServiceError,
    utils::{WorkerMetrics, WorkerOutcome, WorkerQueue},
};
use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// What the per-message handler decided. The loop driver settles the
/// delivery accordingly: delete on `Processed` and `Poison`, leave it for
/// visibility-timeout redelivery on `Retry`.
#[derive(Debug)]
pub enum MessageOutcome {
    Processed,
    Poison(ServiceError),
    Retry(ServiceError),
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, delivery: &QueueDelivery) -> MessageOutcome;
}

/// Long-running poll loop shared by both workers. Messages within a batch
/// are handled sequentially; each one is settled immediately after its
/// handler returns, and the delete call is never issued before that.
pub struct QueueWorker<H> {
    queue: DynOrderQueue,
    handler: H,
    kind: QueueKind,
    metrics: WorkerMetrics,
    idle_backoff: Duration,
    error_backoff: Duration,
}

impl<H: MessageHandler> QueueWorker<H> {
    pub fn new(queue: DynOrderQueue, handler: H, kind: QueueKind, metrics: WorkerMetrics) -> Self {
        Self {
            queue,
            handler,
            kind,
            metrics,
            idle_backoff: Duration::from_secs(5),
            error_backoff: Duration::from_secs(5),
        }
    }

    pub fn with_backoff(mut self, idle: Duration, error: Duration) -> Self {
        self.idle_backoff = idle;
        self.error_backoff = error;
        self
    }

    fn label(&self) -> WorkerQueue {
        match self.kind {
            QueueKind::Processing => WorkerQueue::Processing,
            QueueKind::Notification => WorkerQueue::Notification,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("🚀 {} worker started", self.kind);

        loop {
            let batch = tokio::select! {
                _ = shutdown.recv() => break,
                result = self.queue.receive_messages(self.kind) => result,
            };

            match batch {
                Err(e) => {
                    error!("⚠️ {} worker failed to receive messages: {e}", self.kind);

                    if self.wait(self.error_backoff, &mut shutdown).await {
                        break;
                    }
                }
                Ok(batch) if batch.is_empty() => {
                    if self.wait(self.idle_backoff, &mut shutdown).await {
                        break;
                    }
                }
                Ok(batch) => {
                    let mut stop = false;

                    for delivery in &batch {
                        self.metrics.inc(self.label(), WorkerOutcome::Received);

                        let outcome = self.handler.handle(delivery).await;
                        self.settle(delivery, outcome).await;

                        // Finish the in-flight message, then stop without
                        // starting the next one.
                        if shutdown_requested(&mut shutdown) {
                            stop = true;
                            break;
                        }
                    }

                    if stop {
                        break;
                    }
                }
            }
        }

        info!("🛑 {} worker stopped", self.kind);
    }

    async fn settle(&self, delivery: &QueueDelivery, outcome: MessageOutcome) {
        match outcome {
            MessageOutcome::Processed => {
                self.metrics.inc(self.label(), WorkerOutcome::Processed);

                if let Err(e) = self
                    .queue
                    .delete_message(self.kind, &delivery.receipt_handle)
                    .await
                {
                    // The message was handled; redelivery will reprocess it,
                    // which the idempotent handlers tolerate.
                    warn!(
                        "{} worker processed a message but failed to delete it: {e}",
                        self.kind
                    );
                    self.metrics.inc(self.label(), WorkerOutcome::AckFailed);
                }
            }
            MessageOutcome::Poison(err) => {
                error!("☠️ {} worker deleting poison message: {err}", self.kind);
                self.metrics.inc(self.label(), WorkerOutcome::Poisoned);

                if let Err(e) = self
                    .queue
                    .delete_message(self.kind, &delivery.receipt_handle)
                    .await
                {
                    warn!(
                        "{} worker failed to delete poison message: {e}",
                        self.kind
                    );
                    self.metrics.inc(self.label(), WorkerOutcome::AckFailed);
                }
            }
            MessageOutcome::Retry(err) => {
                warn!(
                    "{} worker leaving message for redelivery: {err}",
                    self.kind
                );
                self.metrics.inc(self.label(), WorkerOutcome::Retried);
            }
        }
    }

    /// Returns true when shutdown was requested during the wait.
    async fn wait(&self, duration: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
        tokio::select! {
            _ = shutdown.recv() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    use tokio::sync::broadcast::error::TryRecvError;

    match shutdown.try_recv() {
        Ok(()) | Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) => false,
    }
}
