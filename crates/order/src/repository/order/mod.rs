mod command;
mod marshal;
mod query;

pub use self::command::OrderCommandRepository;
pub use self::query::OrderQueryRepository;
