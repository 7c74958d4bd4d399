//! Image asset fetching
//!
//! Resolves the image references of a draft into bytes. References are fetched
//! concurrently up to a fixed limit, and the result keeps the order of the input
//! because the marketplace assigns image slots by position.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use sync_storage::image_storage::{ImageStorage, ImageStorageError};
use thiserror::Error;
use tracing::debug;

use crate::types::ImageAsset;

/// Object store holding listing images
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn get_image(&self, image_ref: &str) -> Result<Vec<u8>, ImageStorageError>;
}

#[async_trait::async_trait]
impl ImageStore for ImageStorage {
    async fn get_image(&self, image_ref: &str) -> Result<Vec<u8>, ImageStorageError> {
        self.download(image_ref).await
    }
}

/// The first image that could not be fetched
#[derive(Error, Debug)]
#[error("Failed to fetch image {image_ref}: {cause}")]
pub struct FetchError {
    pub image_ref: String,
    #[source]
    pub cause: ImageStorageError,
}

/// Bounded-parallel image fetcher
pub struct AssetFetcher {
    store: Arc<dyn ImageStore>,
    max_concurrency: usize,
}

impl AssetFetcher {
    /// Creates a fetcher running at most `max_concurrency` downloads at once
    /// (at least one)
    #[must_use]
    pub fn new(store: Arc<dyn ImageStore>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Fetches every reference, returning assets in input order
    ///
    /// # Errors
    ///
    /// Returns the first `FetchError` to complete. Remaining downloads are
    /// cancelled and already fetched assets are discarded.
    pub async fn fetch(&self, image_refs: &[String]) -> Result<Vec<ImageAsset>, FetchError> {
        if image_refs.is_empty() {
            return Ok(Vec::new());
        }

        let store = &self.store;
        let mut in_flight = stream::iter(image_refs.iter().cloned().enumerate())
            .map(|(position, image_ref)| async move {
                let bytes = store
                    .get_image(&image_ref)
                    .await
                    .map_err(|cause| FetchError {
                        image_ref: image_ref.clone(),
                        cause,
                    })?;

                debug!(image_ref = %image_ref, position, size = bytes.len(), "Fetched image");

                Ok::<_, FetchError>((
                    position,
                    ImageAsset {
                        image_ref: image_ref.clone(),
                        bytes,
                    },
                ))
            })
            .buffer_unordered(self.max_concurrency);

        let mut slots: Vec<Option<ImageAsset>> = image_refs.iter().map(|_| None).collect();
        while let Some((position, asset)) = in_flight.try_next().await? {
            slots[position] = Some(asset);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
