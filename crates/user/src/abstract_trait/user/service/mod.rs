mod auth;
mod query;

pub use self::auth::{AuthServiceTrait, DynAuthService};
pub use self::query::{DynUserQueryService, UserQueryServiceTrait};
