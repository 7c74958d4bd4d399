// Not every helper is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sync_worker::mock::{
    inbound_message, InMemoryImageStore, InMemoryRecordStore, Journal, MockMarketplace,
    RecordingQueue,
};
use sync_worker::sync_processor::{PipelineConfig, SyncPipeline};
use sync_worker::types::InboundMessage;

/// Loads the example environment and initializes tracing for tests
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Pipeline wired to in-memory collaborators sharing one journal
pub struct TestContext {
    pub journal: Journal,
    pub images: Arc<InMemoryImageStore>,
    pub marketplace: Arc<MockMarketplace>,
    pub records: Arc<InMemoryRecordStore>,
    pub queue: Arc<RecordingQueue>,
    pub pipeline: Arc<SyncPipeline>,
}

pub struct TestContextBuilder {
    images: InMemoryImageStore,
    marketplace: MockMarketplace,
    records: InMemoryRecordStore,
    queue: RecordingQueue,
    config: PipelineConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestContextBuilder {
        TestContextBuilder {
            images: bike_images(),
            marketplace: MockMarketplace::new(),
            records: InMemoryRecordStore::new(),
            queue: RecordingQueue::new(),
            config: PipelineConfig {
                message_timeout: Duration::from_secs(5),
                ..PipelineConfig::default()
            },
        }
    }
}

impl TestContextBuilder {
    pub fn images(mut self, images: InMemoryImageStore) -> Self {
        self.images = images;
        self
    }

    pub fn marketplace(mut self, marketplace: MockMarketplace) -> Self {
        self.marketplace = marketplace;
        self
    }

    pub fn records(mut self, records: InMemoryRecordStore) -> Self {
        self.records = records;
        self
    }

    pub fn queue(mut self, queue: RecordingQueue) -> Self {
        self.queue = queue;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestContext {
        setup_test_env();

        let journal = Journal::new();
        let images = Arc::new(self.images.with_journal(&journal));
        let marketplace = Arc::new(self.marketplace.with_journal(&journal));
        let records = Arc::new(self.records.with_journal(&journal));
        let queue = Arc::new(self.queue.with_journal(&journal));

        let pipeline = Arc::new(SyncPipeline::new(
            marketplace.clone(),
            images.clone(),
            records.clone(),
            queue.clone(),
            self.config,
        ));

        TestContext {
            journal,
            images,
            marketplace,
            records,
            queue,
            pipeline,
        }
    }
}

/// Image store holding the two pictures of the bike ad
pub fn bike_images() -> InMemoryImageStore {
    InMemoryImageStore::new()
        .with_image("bike/front.jpg", vec![1, 2, 3])
        .with_image("bike/side.jpg", vec![4, 5])
}

pub fn ad_body(title: &str, images: &[&str]) -> String {
    json!({
        "title": title,
        "description": "City bike, barely used",
        "price": 15000,
        "category-id": 42,
        "images": images,
    })
    .to_string()
}

pub fn upload_message(id: &str, body: &str) -> InboundMessage {
    inbound_message(
        id,
        &[("action", "upload"), ("username", "seller"), ("password", "hunter2")],
        body,
    )
}

pub fn bike_upload(id: &str) -> InboundMessage {
    upload_message(id, &ad_body("Bike", &["bike/front.jpg", "bike/side.jpg"]))
}

pub fn remove_message(id: &str, body: &str) -> InboundMessage {
    inbound_message(
        id,
        &[("action", "remove"), ("username", "seller"), ("password", "hunter2")],
        body,
    )
}
