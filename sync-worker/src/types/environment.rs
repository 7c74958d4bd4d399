use std::{env, str::FromStr, time::Duration};

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use sync_storage::queue::QueueConfig;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

/// Reads `key` and parses it, falling back to `default` when unset
///
/// # Panics
///
/// Panics if the variable is set but does not parse
fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).map_or(default, |raw| {
        raw.trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} environment variable is not valid: {raw}"))
    })
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// Whether S3 must be addressed path-style (`LocalStack` has no virtual hosts)
    #[must_use]
    pub const fn s3_force_path_style(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// Returns the listing queue configuration
    ///
    /// # Panics
    ///
    /// Panics if the `LISTING_QUEUE_URL` environment variable is not set in production/staging
    #[must_use]
    pub fn listing_queue_config(&self) -> QueueConfig {
        let queue_url = match self {
            Self::Production | Self::Staging => env::var("LISTING_QUEUE_URL")
                .expect("LISTING_QUEUE_URL environment variable is not set"),
            Self::Development => "http://localhost:4566/000000000000/listing-queue".to_string(),
        };

        QueueConfig {
            queue_url,
            default_max_messages: 10,
            // Must outlast the per-message timeout plus the acknowledgment
            default_visibility_timeout: 60,
            default_wait_time_seconds: 20,
        }
    }

    /// Returns the sync record table name
    ///
    /// # Panics
    ///
    /// Panics if the `DYNAMODB_SYNC_TABLE_NAME` environment variable is not set in production/staging
    #[must_use]
    pub fn sync_record_table_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("DYNAMODB_SYNC_TABLE_NAME")
                .expect("DYNAMODB_SYNC_TABLE_NAME environment variable is not set"),
            Self::Development => "Bolha".to_string(),
        }
    }

    /// Returns the bucket holding listing images
    ///
    /// # Panics
    ///
    /// Panics if the `S3_IMAGES_BUCKET` environment variable is not set in production/staging
    #[must_use]
    pub fn image_bucket_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("S3_IMAGES_BUCKET")
                .expect("S3_IMAGES_BUCKET environment variable is not set"),
            Self::Development => "bolha-images".to_string(),
        }
    }

    /// Returns the marketplace API base URL
    ///
    /// # Panics
    ///
    /// Panics if the `MARKETPLACE_API_URL` environment variable is not set in production/staging
    #[must_use]
    pub fn marketplace_api_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("MARKETPLACE_API_URL")
                .expect("MARKETPLACE_API_URL environment variable is not set"),
            Self::Development => env::var("MARKETPLACE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    /// Maximum number of image downloads running at once for one listing
    ///
    /// # Panics
    ///
    /// Panics if `IMAGE_FETCH_CONCURRENCY` is set but not a valid usize
    #[must_use]
    pub fn image_fetch_concurrency(&self) -> usize {
        parsed_var("IMAGE_FETCH_CONCURRENCY", 4)
    }

    /// Maximum number of messages of one batch processed at once
    ///
    /// # Panics
    ///
    /// Panics if `SYNC_MAX_IN_FLIGHT` is set but not a valid usize
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        parsed_var("SYNC_MAX_IN_FLIGHT", 10)
    }

    /// Deadline for one message, acknowledgment excluded
    ///
    /// # Panics
    ///
    /// Panics if `SYNC_MESSAGE_TIMEOUT_SECS` is set but not a valid u64
    #[must_use]
    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(parsed_var("SYNC_MESSAGE_TIMEOUT_SECS", 50))
    }

    /// Receive count from which a failing message is reported as a dead-letter candidate
    ///
    /// # Panics
    ///
    /// Panics if `SYNC_MAX_RECEIVE_COUNT` is set but not a valid u32
    #[must_use]
    pub fn max_receive_count(&self) -> u32 {
        parsed_var("SYNC_MAX_RECEIVE_COUNT", 5)
    }

    /// Port of the health check server
    ///
    /// # Panics
    ///
    /// Panics if `PORT` is set but not a valid u16
    #[must_use]
    pub fn health_port(&self) -> u16 {
        parsed_var("PORT", 8001)
    }

    /// `DogStatsD` agent host, metrics are not exported when unset
    #[must_use]
    pub fn dd_agent_host(&self) -> Option<String> {
        env::var("DD_AGENT_HOST").ok().filter(|host| !host.is_empty())
    }
}
