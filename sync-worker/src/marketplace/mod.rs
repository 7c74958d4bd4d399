//! Marketplace access
//!
//! A [`Marketplace`] turns credentials into a [`MarketplaceSession`]. Sessions are
//! created per message and dropped once its workflow ends; they are never shared
//! between messages.

mod client;
mod error;

pub use client::HttpMarketplace;
pub use error::{AuthError, PublishError, WithdrawError};

use crate::types::{AdDraft, Credentials, ExternalId, ImageAsset};

/// Session factory
#[async_trait::async_trait]
pub trait Marketplace: Send + Sync {
    /// Authenticates against the marketplace. Failures are not retried here.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn MarketplaceSession>, AuthError>;
}

/// Credential-scoped handle to the marketplace API
#[async_trait::async_trait]
pub trait MarketplaceSession: Send + Sync {
    /// Creates a listing. Not idempotent: every call may create a new listing.
    async fn publish(
        &self,
        draft: &AdDraft,
        images: &[ImageAsset],
    ) -> Result<ExternalId, PublishError>;

    /// Deletes a listing
    async fn withdraw(&self, external_id: ExternalId) -> Result<(), WithdrawError>;
}
