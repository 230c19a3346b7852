//! End-to-end tests for the queue worker loops against in-memory transport
//! fakes that mimic visibility-timeout redelivery.

use async_trait::async_trait;
use chrono::Utc;
use order::{
    abstract_trait::{
        DynNotificationTopic, DynOrderQueue, NotificationTopicTrait, OrderQueueTrait,
        QueueDelivery, QueueKind,
        order::repository::{DynOrderCommandRepository, OrderCommandRepositoryTrait},
    },
    domain::message::{OrderLine, OrderNotificationMessage, OrderProcessingMessage},
    model::{Order, OrderStatus},
    worker::{NotificationHandler, ProcessingHandler, QueueWorker},
};
use rust_decimal::Decimal;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::WorkerMetrics,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::{Mutex, broadcast};

#[derive(Clone)]
struct StoredMessage {
    id: usize,
    body: String,
    deleted: bool,
}

/// Queue fake with at-least-once semantics: every receive hands out the
/// still-visible messages again under fresh receipt handles, and only a
/// delete makes a message disappear.
#[derive(Default)]
struct FakeQueue {
    processing: Mutex<Vec<StoredMessage>>,
    notification: Mutex<Vec<StoredMessage>>,
    next_id: AtomicUsize,
    delivery_seq: AtomicUsize,
    deletes: AtomicUsize,
    receives: AtomicUsize,
    fail_receive_once: AtomicBool,
    fail_delete: AtomicBool,
}

impl FakeQueue {
    fn store(&self, kind: QueueKind) -> &Mutex<Vec<StoredMessage>> {
        match kind {
            QueueKind::Processing => &self.processing,
            QueueKind::Notification => &self.notification,
        }
    }

    async fn push(&self, kind: QueueKind, body: String) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.store(kind).lock().await.push(StoredMessage {
            id,
            body,
            deleted: false,
        });
    }

    async fn visible(&self, kind: QueueKind) -> usize {
        self.store(kind)
            .lock()
            .await
            .iter()
            .filter(|m| !m.deleted)
            .count()
    }

    fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderQueueTrait for FakeQueue {
    async fn send_order_for_processing(
        &self,
        message: &OrderProcessingMessage,
    ) -> Result<String, ServiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| ServiceError::Queue(e.to_string()))?;
        self.push(QueueKind::Processing, body).await;
        Ok("fake-processing-id".into())
    }

    async fn send_order_notification(
        &self,
        message: &OrderNotificationMessage,
    ) -> Result<String, ServiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| ServiceError::Queue(e.to_string()))?;
        self.push(QueueKind::Notification, body).await;
        Ok("fake-notification-id".into())
    }

    async fn receive_messages(
        &self,
        kind: QueueKind,
    ) -> Result<Vec<QueueDelivery>, ServiceError> {
        self.receives.fetch_add(1, Ordering::SeqCst);

        if self.fail_receive_once.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::Queue("transport unavailable".into()));
        }

        let store = self.store(kind).lock().await;
        let batch = store
            .iter()
            .filter(|m| !m.deleted)
            .take(10)
            .map(|m| {
                let attempt = self.delivery_seq.fetch_add(1, Ordering::SeqCst);
                QueueDelivery {
                    body: m.body.clone(),
                    receipt_handle: format!("rh-{}-{attempt}", m.id),
                }
            })
            .collect();

        Ok(batch)
    }

    async fn delete_message(
        &self,
        kind: QueueKind,
        receipt_handle: &str,
    ) -> Result<(), ServiceError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ServiceError::Queue("delete rejected".into()));
        }

        let id: usize = receipt_handle
            .split('-')
            .nth(1)
            .and_then(|part| part.parse().ok())
            .expect("receipt handle minted by this fake");

        let mut store = self.store(kind).lock().await;
        if let Some(message) = store.iter_mut().find(|m| m.id == id) {
            message.deleted = true;
        }

        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Order store fake that can fail a configurable number of status writes
/// before letting them through.
#[derive(Default)]
struct FakeOrderStore {
    statuses: Mutex<HashMap<String, OrderStatus>>,
    update_attempts: AtomicUsize,
    fail_updates_remaining: AtomicUsize,
}

impl FakeOrderStore {
    async fn with_order(order: &Order) -> Self {
        let store = Self::default();
        store
            .statuses
            .lock()
            .await
            .insert(order.id.clone(), order.status);
        store
    }

    async fn status_of(&self, id: &str) -> Option<OrderStatus> {
        self.statuses.lock().await.get(id).copied()
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for FakeOrderStore {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.statuses
            .lock()
            .await
            .insert(order.id.clone(), order.status);
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.statuses
            .lock()
            .await
            .insert(order.id.clone(), order.status);
        Ok(())
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<(), RepositoryError> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_updates_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_updates_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Dynamo("write throttled".into()));
        }

        let mut statuses = self.statuses.lock().await;
        match statuses.get_mut(id) {
            Some(current) => {
                *current = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default)]
struct FakeTopic {
    publishes: AtomicUsize,
    fail_publishes_remaining: AtomicUsize,
    return_empty_id_once: AtomicBool,
}

#[async_trait]
impl NotificationTopicTrait for FakeTopic {
    async fn publish_order_confirmation(
        &self,
        _notification: &OrderNotificationMessage,
    ) -> Result<String, ServiceError> {
        let remaining = self.fail_publishes_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_publishes_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(ServiceError::Topic("endpoint unreachable".into()));
        }

        if self.return_empty_id_once.swap(false, Ordering::SeqCst) {
            return Ok(String::new());
        }

        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok("fake-sns-id".into())
    }

    async fn publish_status_update(
        &self,
        _order_id: &str,
        _user_email: &str,
        _status: OrderStatus,
    ) -> Result<String, ServiceError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok("fake-sns-id".into())
    }
}

fn sample_order() -> Order {
    let lines = vec![OrderLine {
        product_id: "p-1".into(),
        name: "Bananas".into(),
        price: Decimal::new(250, 2),
        quantity: 2,
        total_price: Decimal::new(500, 2),
    }];
    let products = serde_json::to_string(&lines).unwrap();

    Order::new(
        "user-1".to_string(),
        products,
        Decimal::new(500, 2),
        Decimal::new(500, 2),
    )
}

fn processing_body(order: &Order) -> String {
    let lines = order.lines().unwrap();
    let message = OrderProcessingMessage::from_order(order, "user@example.com", lines);
    serde_json::to_string(&message).unwrap()
}

fn notification_body(order_id: &str) -> String {
    let message = OrderNotificationMessage {
        order_id: order_id.to_string(),
        user_email: "user@example.com".into(),
        user_name: "user@example.com".into(),
        total_amount: Decimal::new(1000, 2),
        order_date: Utc::now(),
        status: "Processing".into(),
        products: Vec::new(),
    };
    serde_json::to_string(&message).unwrap()
}

fn fast_worker<H: order::worker::MessageHandler>(
    queue: DynOrderQueue,
    handler: H,
    kind: QueueKind,
) -> QueueWorker<H> {
    QueueWorker::new(queue, handler, kind, WorkerMetrics::new())
        .with_backoff(Duration::from_millis(5), Duration::from_millis(5))
}

/// Polls `condition` until it holds or two seconds pass.
async fn wait_for<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within two seconds");
}

#[tokio::test]
async fn processing_message_is_handled_then_deleted_exactly_once() {
    let order = sample_order();
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::with_order(&order).await);

    queue.push(QueueKind::Processing, processing_body(&order)).await;

    let handler = ProcessingHandler::new(
        store.clone() as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue.clone(), handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Processing).await == 0 }
    })
    .await;

    assert_eq!(store.status_of(&order.id).await, Some(OrderStatus::Processing));
    assert_eq!(queue.delete_count(), 1);
    // The handler forwarded exactly one notification request downstream.
    assert_eq!(queue.visible(QueueKind::Notification).await, 1);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn failed_delivery_is_redelivered_and_succeeds_with_one_delete() {
    let order = sample_order();
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::with_order(&order).await);
    store.fail_updates_remaining.store(1, Ordering::SeqCst);

    queue.push(QueueKind::Processing, processing_body(&order)).await;

    let handler = ProcessingHandler::new(
        store.clone() as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue.clone(), handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Processing).await == 0 }
    })
    .await;

    // One failed attempt, one successful redelivery, a single delete.
    assert!(store.update_attempts.load(Ordering::SeqCst) >= 2);
    assert_eq!(queue.delete_count(), 1);
    assert_eq!(store.status_of(&order.id).await, Some(OrderStatus::Processing));

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn poison_message_is_dropped_without_disturbing_the_batch() {
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::default());

    let mut order_ids = Vec::new();
    for _ in 0..9 {
        let order = sample_order();
        store.create_order(&order).await.unwrap();
        queue.push(QueueKind::Processing, processing_body(&order)).await;
        order_ids.push(order.id);
    }
    queue
        .push(QueueKind::Processing, "{not json at all".into())
        .await;

    let handler = ProcessingHandler::new(
        store.clone() as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue.clone(), handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Processing).await == 0 }
    })
    .await;

    // The poison message is deleted like the processed ones, never retried.
    assert_eq!(queue.delete_count(), 10);
    for id in &order_ids {
        assert_eq!(store.status_of(id).await, Some(OrderStatus::Processing));
    }
    assert_eq!(queue.visible(QueueKind::Notification).await, 9);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn notification_is_never_deleted_before_publish_succeeds() {
    let queue = Arc::new(FakeQueue::default());
    let topic = Arc::new(FakeTopic::default());
    topic.fail_publishes_remaining.store(3, Ordering::SeqCst);

    queue
        .push(QueueKind::Notification, notification_body("order-1"))
        .await;

    let handler = NotificationHandler::new(topic.clone() as DynNotificationTopic);
    let worker = fast_worker(queue.clone(), handler, QueueKind::Notification);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Notification).await == 0 }
    })
    .await;

    // Three failed publishes left the message in place; the fourth attempt
    // published and acknowledged it.
    assert_eq!(topic.publishes.load(Ordering::SeqCst), 1);
    assert_eq!(queue.delete_count(), 1);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn empty_publish_id_is_treated_as_a_retry() {
    let queue = Arc::new(FakeQueue::default());
    let topic = Arc::new(FakeTopic::default());
    topic.return_empty_id_once.store(true, Ordering::SeqCst);

    queue
        .push(QueueKind::Notification, notification_body("order-2"))
        .await;

    let handler = NotificationHandler::new(topic.clone() as DynNotificationTopic);
    let worker = fast_worker(queue.clone(), handler, QueueKind::Notification);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Notification).await == 0 }
    })
    .await;

    assert_eq!(topic.publishes.load(Ordering::SeqCst), 1);
    assert_eq!(queue.delete_count(), 1);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn ack_failure_after_success_does_not_stop_the_worker() {
    let order = sample_order();
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::with_order(&order).await);
    queue.fail_delete.store(true, Ordering::SeqCst);

    queue.push(QueueKind::Processing, processing_body(&order)).await;

    let handler = ProcessingHandler::new(
        store.clone() as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue.clone(), handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_store = store.clone();
    wait_for(|| {
        let store = probe_store.clone();
        async move { store.update_attempts.load(Ordering::SeqCst) >= 2 }
    })
    .await;

    // Processing succeeded despite the broken ack; the redelivered message
    // was processed again rather than crashing the loop.
    assert_eq!(store.status_of(&order.id).await, Some(OrderStatus::Processing));
    assert_eq!(queue.delete_count(), 0);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn receive_error_backs_off_and_recovers() {
    let order = sample_order();
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::with_order(&order).await);
    queue.fail_receive_once.store(true, Ordering::SeqCst);

    queue.push(QueueKind::Processing, processing_body(&order)).await;

    let handler = ProcessingHandler::new(
        store.clone() as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue.clone(), handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    let probe_queue = queue.clone();
    wait_for(|| {
        let queue = probe_queue.clone();
        async move { queue.visible(QueueKind::Processing).await == 0 }
    })
    .await;

    assert!(queue.receives.load(Ordering::SeqCst) >= 2);
    assert_eq!(store.status_of(&order.id).await, Some(OrderStatus::Processing));

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn empty_polls_are_spaced_by_the_idle_backoff() {
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::default());

    let handler = ProcessingHandler::new(
        store as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = QueueWorker::new(
        queue.clone(),
        handler,
        QueueKind::Processing,
        WorkerMetrics::new(),
    )
    .with_backoff(Duration::from_millis(50), Duration::from_millis(50));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(160)).await;
    shutdown_tx.send(()).unwrap();
    task.await.unwrap();

    // Roughly one poll per backoff window, never a busy loop.
    let receives = queue.receives.load(Ordering::SeqCst);
    assert!(receives >= 2, "worker never polled again: {receives}");
    assert!(receives <= 6, "worker busy-looped on empty polls: {receives}");
}

#[tokio::test]
async fn worker_stops_promptly_when_shutdown_is_signalled() {
    let queue = Arc::new(FakeQueue::default());
    let store = Arc::new(FakeOrderStore::default());

    let handler = ProcessingHandler::new(
        store as DynOrderCommandRepository,
        queue.clone() as DynOrderQueue,
    );
    let worker = fast_worker(queue, handler, QueueKind::Processing);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(worker.run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("worker did not stop after shutdown signal")
        .unwrap();
}
