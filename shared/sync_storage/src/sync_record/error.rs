//! Error types for sync record storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, update_item::UpdateItemError};
use thiserror::Error;

/// Result type for sync record storage operations
pub type SyncRecordStorageResult<T> = Result<T, SyncRecordStorageError>;

/// Errors that can occur during sync record storage operations
#[derive(Error, Debug)]
pub enum SyncRecordStorageError {
    /// Failed to update sync record in Dynamo DB
    #[error("Failed to update sync record in DynamoDB: {0}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to get sync record from Dynamo DB
    #[error("Failed to get sync record from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// A newer publication is already recorded for this ad
    #[error("A newer publication is already recorded for ad {0}")]
    NewerRecordExists(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
