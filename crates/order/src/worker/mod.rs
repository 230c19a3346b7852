mod driver;
mod notification;
mod processing;

pub use self::driver::{MessageHandler, MessageOutcome, QueueWorker};
pub use self::notification::NotificationHandler;
pub use self::processing::ProcessingHandler;
