//! In-memory collaborators for exercising the pipeline without AWS or a
//! marketplace
//!
//! Every mock can share a [`Journal`], which records calls across collaborators
//! in the order they happened.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aws_sdk_sqs::error::SdkError;
use sync_storage::image_storage::ImageStorageError;
use sync_storage::queue::{MessageAttribute, QueueError};

use crate::assets::ImageStore;
use crate::marketplace::{
    AuthError, Marketplace, MarketplaceSession, PublishError, WithdrawError,
};
use crate::state_recorder::{StoreError, SyncRecordStore};
use crate::transport::QueueTransport;
use crate::types::{
    AdDraft, Credentials, ExternalId, ImageAsset, InboundMessage, ListingKey, MarketplaceListing,
};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A call made to a mocked collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetImage(String),
    Authenticate(String),
    Publish(String),
    Withdraw(ExternalId),
    Commit(ListingKey, ExternalId),
    Delete(String),
}

/// Ordered log of calls shared between mocks
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        locked(&self.0).push(call);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        locked(&self.0).clone()
    }

    /// Index of the first call matching `predicate`
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        locked(&self.0).iter().position(predicate)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        locked(&self.0).iter().filter(|call| predicate(call)).count()
    }
}

/// Builds an inbound message with string attributes
#[must_use]
pub fn inbound_message(id: &str, attributes: &[(&str, &str)], body: &str) -> InboundMessage {
    InboundMessage {
        message_id: id.to_string(),
        receipt_handle: format!("receipt-{id}"),
        body: body.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), MessageAttribute::String(v.to_string())))
            .collect(),
        receive_count: 1,
    }
}

/// Image store backed by a map
#[derive(Default)]
pub struct InMemoryImageStore {
    images: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    fetches: AtomicUsize,
    journal: Journal,
}

impl InMemoryImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_image(mut self, key: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(key.to_string(), bytes);
        self
    }

    /// Delays every download of `key`
    #[must_use]
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    /// Number of downloads started
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageStore for InMemoryImageStore {
    async fn get_image(&self, image_ref: &str) -> Result<Vec<u8>, ImageStorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.journal.record(Call::GetImage(image_ref.to_string()));

        if let Some(delay) = self.delays.get(image_ref) {
            tokio::time::sleep(*delay).await;
        }

        self.images
            .get(image_ref)
            .cloned()
            .ok_or_else(|| ImageStorageError::NotFound(image_ref.to_string()))
    }
}

/// Marketplace handing out sequential listing ids, starting at 987
#[derive(Clone)]
pub struct MockMarketplace {
    journal: Journal,
    next_id: Arc<AtomicI64>,
    reject_credentials: bool,
    publish_failure: bool,
    withdraw_failure: bool,
    publish_delay: Duration,
}

impl Default for MockMarketplace {
    fn default() -> Self {
        Self {
            journal: Journal::default(),
            next_id: Arc::new(AtomicI64::new(987)),
            reject_credentials: false,
            publish_failure: false,
            withdraw_failure: false,
            publish_delay: Duration::ZERO,
        }
    }
}

impl MockMarketplace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    #[must_use]
    pub const fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    #[must_use]
    pub const fn failing_publish(mut self) -> Self {
        self.publish_failure = true;
        self
    }

    #[must_use]
    pub const fn failing_withdraw(mut self) -> Self {
        self.withdraw_failure = true;
        self
    }

    /// Makes every publish take `delay` before answering
    #[must_use]
    pub const fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl Marketplace for MockMarketplace {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn MarketplaceSession>, AuthError> {
        self.journal
            .record(Call::Authenticate(credentials.username.clone()));

        if self.reject_credentials {
            return Err(AuthError::InvalidCredentials(credentials.username.clone()));
        }

        Ok(Box::new(self.clone()))
    }
}

#[async_trait::async_trait]
impl MarketplaceSession for MockMarketplace {
    async fn publish(
        &self,
        draft: &AdDraft,
        _images: &[ImageAsset],
    ) -> Result<ExternalId, PublishError> {
        self.journal.record(Call::Publish(draft.title.clone()));

        if !self.publish_delay.is_zero() {
            tokio::time::sleep(self.publish_delay).await;
        }
        if self.publish_failure {
            return Err(PublishError::Transport("connection reset".to_string()));
        }

        Ok(ExternalId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn withdraw(&self, external_id: ExternalId) -> Result<(), WithdrawError> {
        self.journal.record(Call::Withdraw(external_id));

        if self.withdraw_failure {
            return Err(WithdrawError::Transport("connection reset".to_string()));
        }

        Ok(())
    }
}

/// Sync record store with the conditional-write rule of the real table
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<ListingKey, MarketplaceListing>>,
    failure: Option<StoreError>,
    journal: Journal,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    /// Fails every commit with `error`
    #[must_use]
    pub fn failing_with(mut self, error: StoreError) -> Self {
        self.failure = Some(error);
        self
    }

    #[must_use]
    pub fn records(&self) -> HashMap<ListingKey, MarketplaceListing> {
        locked(&self.records).clone()
    }
}

#[async_trait::async_trait]
impl SyncRecordStore for InMemoryRecordStore {
    async fn commit(
        &self,
        key: &ListingKey,
        listing: &MarketplaceListing,
    ) -> Result<(), StoreError> {
        self.journal
            .record(Call::Commit(key.clone(), listing.external_id));

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut records = locked(&self.records);
        if records
            .get(key)
            .is_some_and(|existing| existing.published_at >= listing.published_at)
        {
            return Err(StoreError::Conflict(key.to_string()));
        }
        records.insert(key.clone(), *listing);

        Ok(())
    }
}

/// Queue serving preloaded messages and remembering deletions
#[derive(Default)]
pub struct RecordingQueue {
    pending: Mutex<VecDeque<InboundMessage>>,
    deleted: Mutex<Vec<String>>,
    stale_receipts: bool,
    failing_deletes: bool,
    failing_receives: AtomicUsize,
    receives: AtomicUsize,
    journal: Journal,
}

impl RecordingQueue {
    /// Empty polls wait this long, standing in for long polling
    const EMPTY_POLL_WAIT: Duration = Duration::from_millis(10);

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    /// Answers every delete with a stale receipt error
    #[must_use]
    pub const fn with_stale_receipts(mut self) -> Self {
        self.stale_receipts = true;
        self
    }

    #[must_use]
    pub const fn with_failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Fails the next `count` receives
    #[must_use]
    pub fn with_failing_receives(self, count: usize) -> Self {
        self.failing_receives.store(count, Ordering::SeqCst);
        self
    }

    /// Number of receives attempted, failed ones included
    #[must_use]
    pub fn receive_calls(&self) -> usize {
        self.receives.load(Ordering::SeqCst)
    }

    pub fn push(&self, message: InboundMessage) {
        locked(&self.pending).push_back(message);
    }

    /// Receipt handles passed to delete, in call order
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        locked(&self.deleted).clone()
    }
}

#[async_trait::async_trait]
impl QueueTransport for RecordingQueue {
    async fn receive_messages(&self) -> Result<Vec<InboundMessage>, QueueError> {
        self.receives.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_receives
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(QueueError::ReceiveMessage(SdkError::timeout_error(
                "simulated receive timeout",
            )));
        }

        let batch: Vec<InboundMessage> = {
            let mut pending = locked(&self.pending);
            let take = pending.len().min(10);
            pending.drain(..take).collect()
        };

        if batch.is_empty() {
            tokio::time::sleep(Self::EMPTY_POLL_WAIT).await;
        }

        Ok(batch)
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.journal.record(Call::Delete(receipt_handle.to_string()));
        locked(&self.deleted).push(receipt_handle.to_string());

        if self.stale_receipts {
            return Err(QueueError::StaleReceipt);
        }
        if self.failing_deletes {
            return Err(QueueError::DeleteMessage(SdkError::timeout_error(
                "simulated delete timeout",
            )));
        }

        Ok(())
    }
}
