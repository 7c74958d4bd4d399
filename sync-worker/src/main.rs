use std::sync::Arc;

use anyhow::Result;
use datadog_tracing::axum::shutdown_signal;
use sync_storage::{
    image_storage::ImageStorage, queue::ListingQueue, sync_record::SyncRecordStorage,
};
use sync_worker::{
    health,
    marketplace::HttpMarketplace,
    sync_processor::{PipelineConfig, SyncPipeline, SyncProcessor},
    telemetry,
    types::Environment,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sqs::Client as SqsClient;

#[tokio::main]
async fn main() -> Result<()> {
    let env = Environment::from_env();

    // The _guard must be kept alive for the duration of the program
    let (_guard, tracer_shutdown) = datadog_tracing::init()?;

    info!("Starting Sync Worker in {:?} environment", env);

    telemetry::init_metrics(&env)?;

    let aws_config = env.aws_config().await;

    let sqs_client = Arc::new(SqsClient::new(&aws_config));
    let listing_queue = Arc::new(ListingQueue::new(sqs_client, env.listing_queue_config()));

    info!("✅ Initialized listing queue");

    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));
    let sync_records = Arc::new(SyncRecordStorage::new(
        dynamodb_client,
        env.sync_record_table_name(),
    ));

    info!("✅ Initialized sync record storage");

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(env.s3_force_path_style())
        .build();
    let image_storage = Arc::new(ImageStorage::new(
        Arc::new(S3Client::from_conf(s3_config)),
        env.image_bucket_name(),
    ));

    info!("✅ Initialized image storage");

    let marketplace = Arc::new(HttpMarketplace::new(env.marketplace_api_url()));

    let pipeline = Arc::new(SyncPipeline::new(
        marketplace,
        image_storage,
        sync_records,
        listing_queue.clone(),
        PipelineConfig {
            max_in_flight: env.max_in_flight(),
            image_fetch_concurrency: env.image_fetch_concurrency(),
            message_timeout: env.message_timeout(),
            max_receive_count: env.max_receive_count(),
        },
    ));

    // Single shutdown token for everything
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down Sync Worker...");
        signal_token.cancel();
    });

    let health_handle = {
        let token = shutdown_token.clone();
        let port = env.health_port();
        tokio::spawn(async move {
            if let Err(e) = health::start_health_server(port, token).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Blocks until shutdown
    SyncProcessor::new(listing_queue, pipeline, shutdown_token.clone())
        .start()
        .await;

    shutdown_token.cancel();
    health_handle.await.ok();

    // Ensure the tracer is properly shut down
    tracer_shutdown.shutdown();

    info!("✅ Sync Worker shutdown complete");

    Ok(())
}
