use aws_config::BehaviorVersion;
use tracing::info;

/// Service clients built once from the default provider chain and shared
/// across repositories and messaging facades.
#[derive(Clone)]
pub struct AwsClients {
    pub sqs: aws_sdk_sqs::Client,
    pub sns: aws_sdk_sns::Client,
    pub dynamodb: aws_sdk_dynamodb::Client,
}

impl AwsClients {
    pub async fn init() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        info!(
            "✅ AWS clients initialized (region: {:?})",
            config.region().map(|r| r.as_ref().to_string())
        );

        Self {
            sqs: aws_sdk_sqs::Client::new(&config),
            sns: aws_sdk_sns::Client::new(&config),
            dynamodb: aws_sdk_dynamodb::Client::new(&config),
        }
    }
}
