//! Error types for image storage operations

use aws_sdk_s3::{error::SdkError, operation::get_object::GetObjectError};
use thiserror::Error;

/// Result type for image storage operations
pub type ImageStorageResult<T> = Result<T, ImageStorageError>;

/// Errors that can occur during image storage operations
#[derive(Error, Debug)]
pub enum ImageStorageError {
    /// The requested image does not exist in the bucket
    #[error("Image not found: {0}")]
    NotFound(String),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Failed to read the object body
    #[error("Failed to read object body: {0}")]
    BodyError(String),
}

impl From<SdkError<GetObjectError>> for ImageStorageError {
    fn from(error: SdkError<GetObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => {
                if err.raw().status().as_u16() >= 500 {
                    Self::UpstreamError(format!("{:?}", err.err()))
                } else {
                    Self::S3Error(format!("{:?}", err.err()))
                }
            }
            _ => Self::S3Error(error.to_string()),
        }
    }
}
