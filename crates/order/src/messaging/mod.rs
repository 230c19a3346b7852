mod sns;
mod sqs;

pub use self::sns::SnsNotificationTopic;
pub use self::sqs::SqsOrderQueue;
