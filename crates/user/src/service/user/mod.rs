mod auth;
mod query;

pub use self::auth::{AuthService, AuthServiceDeps};
pub use self::query::UserQueryService;
