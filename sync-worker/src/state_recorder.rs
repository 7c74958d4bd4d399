//! Durable record of published listings

use sync_storage::sync_record::{SyncRecordStorage, SyncRecordStorageError};
use thiserror::Error;

use crate::types::{ListingKey, MarketplaceListing};

/// Failures committing a sync record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The state store could not be reached or failed the write
    #[error("Sync record store unavailable: {0}")]
    Unavailable(String),

    /// The conditional write was rejected because a newer record exists
    #[error("Sync record for {0} was written by a newer publication")]
    Conflict(String),
}

impl From<SyncRecordStorageError> for StoreError {
    fn from(err: SyncRecordStorageError) -> Self {
        match err {
            SyncRecordStorageError::NewerRecordExists(title) => Self::Conflict(title),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Key-value store mapping local ads to marketplace listings
#[async_trait::async_trait]
pub trait SyncRecordStore: Send + Sync {
    /// Writes the listing for `key`, replacing older publications only
    async fn commit(&self, key: &ListingKey, listing: &MarketplaceListing)
        -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl SyncRecordStore for SyncRecordStorage {
    async fn commit(
        &self,
        key: &ListingKey,
        listing: &MarketplaceListing,
    ) -> Result<(), StoreError> {
        self.record_upload(key.as_str(), listing.external_id.0, listing.published_at)
            .await?;
        Ok(())
    }
}
