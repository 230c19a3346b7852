mod user;

pub use self::user::UserHttpClient;
