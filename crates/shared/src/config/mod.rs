mod aws;
mod hashing;
mod jwt;

pub use self::aws::AwsClients;
pub use self::hashing::Hashing;
pub use self::jwt::{Claims, JwtConfig};
