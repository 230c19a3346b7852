mod command;
mod marshal;
mod query;

pub use self::command::UserCommandRepository;
pub use self::query::UserQueryRepository;
