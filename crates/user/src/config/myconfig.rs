use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub users_table: String,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub otel_endpoint: String,
}

impl Config {
    pub fn init() -> Result<Self> {
        let port = std::env::var("PORT")
            .context("Missing environment variable: PORT")?
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let users_table =
            std::env::var("USERS_TABLE").context("Missing environment variable: USERS_TABLE")?;

        let jwt_secret =
            std::env::var("JWT_SECRET").context("Missing environment variable: JWT_SECRET")?;

        let jwt_expiration_minutes = match std::env::var("JWT_EXPIRATION_MINUTES") {
            Ok(value) => value
                .parse::<i64>()
                .context("JWT_EXPIRATION_MINUTES must be a valid integer")?,
            Err(_) => 60,
        };

        let otel_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        Ok(Self {
            port,
            users_table,
            jwt_secret,
            jwt_expiration_minutes,
            otel_endpoint,
        })
    }
}
