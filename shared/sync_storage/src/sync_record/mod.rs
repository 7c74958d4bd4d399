//! Sync record storage integration using Dynamo DB
//!
//! Sync Record Storage maps a local ad (keyed by its title) to the listing the
//! marketplace created for it.

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use error::{SyncRecordStorageError, SyncRecordStorageResult};
use strum::Display;

/// Attribute names for sync record table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "PascalCase")]
pub enum SyncRecordAttribute {
    /// Ad title (Primary Key)
    AdTitle,
    /// Marketplace identifier of the published listing
    AdUploadedId,
    /// RFC3339 publication timestamp
    AdUploadedAt,
}

/// Sync record data structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncRecord {
    /// Ad title (Primary Key)
    pub ad_title: String,
    /// Marketplace identifier of the published listing
    pub ad_uploaded_id: i64,
    /// RFC3339 publication timestamp (UTC, nanosecond precision)
    pub ad_uploaded_at: String,
}

/// Formats a publication timestamp the way it is stored
///
/// Fixed-width UTC timestamps compare lexicographically in time order, which the
/// conditional write relies on. Two publications within the same millisecond
/// still order correctly.
#[must_use]
pub fn format_uploaded_at(uploaded_at: DateTime<Utc>) -> String {
    uploaded_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Sync record storage client for Dynamo DB operations
pub struct SyncRecordStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl SyncRecordStorage {
    /// Creates a new sync record storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for sync records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Records the listing published for an ad
    ///
    /// The write only applies when no publication is recorded yet, or the recorded
    /// one is older than `uploaded_at`.
    ///
    /// # Arguments
    ///
    /// * `ad_title` - The ad title (Primary Key)
    /// * `uploaded_id` - The marketplace identifier of the listing
    /// * `uploaded_at` - When the listing was published
    ///
    /// # Errors
    ///
    /// Returns `SyncRecordStorageError::NewerRecordExists` if the conditional write is
    /// rejected, and `SyncRecordStorageError::DynamoDbUpdateError` for other failures
    pub async fn record_upload(
        &self,
        ad_title: &str,
        uploaded_id: i64,
        uploaded_at: DateTime<Utc>,
    ) -> SyncRecordStorageResult<()> {
        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                SyncRecordAttribute::AdTitle.to_string(),
                AttributeValue::S(ad_title.to_string()),
            )
            .update_expression("SET #uploaded_id = :uploaded_id, #uploaded_at = :uploaded_at")
            .condition_expression(
                "attribute_not_exists(#uploaded_at) OR #uploaded_at < :uploaded_at",
            )
            .expression_attribute_names("#uploaded_id", SyncRecordAttribute::AdUploadedId.to_string())
            .expression_attribute_names("#uploaded_at", SyncRecordAttribute::AdUploadedAt.to_string())
            .expression_attribute_values(":uploaded_id", AttributeValue::N(uploaded_id.to_string()))
            .expression_attribute_values(
                ":uploaded_at",
                AttributeValue::S(format_uploaded_at(uploaded_at)),
            )
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    SyncRecordStorageError::NewerRecordExists(ad_title.to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Gets the sync record for an ad title
    ///
    /// # Arguments
    ///
    /// * `ad_title` - The ad title to look up
    ///
    /// # Errors
    ///
    /// Returns `SyncRecordStorageError` if the Dynamo DB operation fails or the item
    /// cannot be deserialized
    pub async fn get_by_title(&self, ad_title: &str) -> SyncRecordStorageResult<Option<SyncRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                SyncRecordAttribute::AdTitle.to_string(),
                AttributeValue::S(ad_title.to_string()),
            )
            .consistent_read(true)
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()
            .map_err(|e| SyncRecordStorageError::SerializationError(e.to_string()))?;

        Ok(item)
    }
}
