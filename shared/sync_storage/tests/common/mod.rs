//! LocalStack test setup utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sqs::Client as SqsClient;
use sync_storage::sync_record::SyncRecordAttribute;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Loads an AWS config pointed at LocalStack with hardcoded credentials
pub async fn localstack_config() -> SdkConfig {
    let credentials = Credentials::from_keys(
        "test", // AWS_ACCESS_KEY_ID
        "test", // AWS_SECRET_ACCESS_KEY
        None,   // no session token
    );

    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await
}

/// Test context that provides SQS client and queue setup
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub queue_url: String,
}

impl QueueTestContext {
    /// Creates a new test context with a unique standard queue
    pub async fn new(test_name: &str) -> Self {
        let queue_name = format!("{}-{}", test_name, Uuid::new_v4());
        let sqs_client = Arc::new(SqsClient::new(&localstack_config().await));

        let result = sqs_client
            .create_queue()
            .queue_name(&queue_name)
            .send()
            .await
            .expect("Failed to create test queue");

        let queue_url = result
            .queue_url()
            .expect("Queue URL not returned")
            .to_string();

        Self {
            sqs_client,
            queue_url,
        }
    }
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        let client = self.sqs_client.clone();
        let queue_url = self.queue_url.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_queue().queue_url(&queue_url).send().await;
            });
        }
    }
}

/// Test context that creates a unique sync record table and drops it afterwards
pub struct TableTestContext {
    pub dynamodb_client: Arc<DynamoDbClient>,
    pub table_name: String,
}

impl TableTestContext {
    pub async fn new() -> Self {
        let table_name = format!("test-sync-records-{}", Uuid::new_v4());
        let dynamodb_client = Arc::new(DynamoDbClient::new(&localstack_config().await));

        dynamodb_client
            .create_table()
            .table_name(&table_name)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(SyncRecordAttribute::AdTitle.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(SyncRecordAttribute::AdTitle.to_string())
                    .key_type(KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .expect("Failed to create test table");

        // Wait a bit for table to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            dynamodb_client,
            table_name,
        }
    }
}

impl Drop for TableTestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

/// Test context that creates a unique image bucket
pub struct BucketTestContext {
    pub s3_client: Arc<S3Client>,
    pub bucket_name: String,
}

impl BucketTestContext {
    pub async fn new() -> Self {
        let bucket_name = format!("test-images-{}", Uuid::new_v4());
        let config = localstack_config().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();
        let s3_client = Arc::new(S3Client::from_conf(s3_config));

        s3_client
            .create_bucket()
            .bucket(&bucket_name)
            .send()
            .await
            .expect("Failed to create test bucket");

        Self {
            s3_client,
            bucket_name,
        }
    }
}
