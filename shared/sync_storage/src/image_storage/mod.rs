//! S3-based image storage operations
//!
//! Listing images are uploaded to the bucket ahead of time; listing messages refer
//! to them by object key.
mod error;

use std::sync::Arc;

use aws_sdk_s3::{error::SdkError, operation::get_object::GetObjectError, Client as S3Client};

pub use error::{ImageStorageError, ImageStorageResult};

/// Image storage client for S3 operations
pub struct ImageStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
}

impl ImageStorage {
    /// Creates a new image storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name holding listing images
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
        }
    }

    /// Downloads an image into memory
    ///
    /// # Arguments
    ///
    /// * `key` - The object key of the image
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError::NotFound` if the key does not exist
    /// Returns `ImageStorageError::UpstreamError` for 5xx errors
    /// Returns `ImageStorageError::BodyError` if the body stream fails mid-read
    pub async fn download(&self, key: &str) -> ImageStorageResult<Vec<u8>> {
        tracing::debug!(key, "Downloading image from S3");

        let output = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(ref svc)
                    if matches!(svc.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    ImageStorageError::NotFound(key.to_string())
                }
                other => ImageStorageError::from(other),
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| ImageStorageError::BodyError(e.to_string()))?;

        Ok(body.into_bytes().to_vec())
    }

    /// Uploads an image, used to seed the bucket
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError::S3Error` if the upload fails
    pub async fn upload(&self, key: &str, bytes: Vec<u8>) -> ImageStorageResult<()> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type("application/octet-stream")
            .body(bytes.into())
            .send()
            .await
            .map_err(|e| ImageStorageError::S3Error(e.to_string()))?;

        Ok(())
    }
}
