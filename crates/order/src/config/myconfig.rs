use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub orders_table: String,
    pub processing_queue_url: String,
    pub notification_queue_url: String,
    pub notification_topic_arn: String,
    pub user_service_base_url: String,
    pub otel_endpoint: String,
}

impl Config {
    pub fn init() -> Result<Self> {
        let port = std::env::var("PORT")
            .context("Missing environment variable: PORT")?
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let orders_table =
            std::env::var("ORDERS_TABLE").context("Missing environment variable: ORDERS_TABLE")?;

        let processing_queue_url = std::env::var("ORDER_PROCESSING_QUEUE_URL")
            .context("Missing environment variable: ORDER_PROCESSING_QUEUE_URL")?;

        let notification_queue_url = std::env::var("ORDER_NOTIFICATION_QUEUE_URL")
            .context("Missing environment variable: ORDER_NOTIFICATION_QUEUE_URL")?;

        let notification_topic_arn = std::env::var("ORDER_NOTIFICATION_TOPIC_ARN")
            .context("Missing environment variable: ORDER_NOTIFICATION_TOPIC_ARN")?;

        let user_service_base_url = std::env::var("USER_SERVICE_BASE_URL")
            .context("Missing environment variable: USER_SERVICE_BASE_URL")?;

        let otel_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        Ok(Self {
            port,
            orders_table,
            processing_queue_url,
            notification_queue_url,
            notification_topic_arn,
            user_service_base_url,
            otel_endpoint,
        })
    }
}
