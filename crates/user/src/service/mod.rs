pub mod user;

pub use self::user::{AuthService, AuthServiceDeps, UserQueryService};
