pub mod order;
pub mod queue;
pub mod topic;
pub mod user_client;

pub use self::queue::{DynOrderQueue, OrderQueueTrait, QueueDelivery, QueueKind};
pub use self::topic::{DynNotificationTopic, NotificationTopicTrait};
pub use self::user_client::{DynUserClient, TokenValidation, UserClientTrait};
