use chrono::Utc;
use metrics::counter;
use tracing::info;

use super::{Completion, StateTracker, SyncState, WorkflowDeps};
use crate::marketplace::MarketplaceSession;
use crate::types::{AdDraft, MarketplaceListing, SyncError};

/// Fetches the images, creates the listing and records it
///
/// The listing key stays locked from upload until the record is written, so two
/// publications of the same ad in this process cannot interleave. Ordering is
/// not deduplication: the second one still creates its own marketplace listing.
pub(super) async fn run(
    deps: &WorkflowDeps,
    session: &dyn MarketplaceSession,
    draft: &AdDraft,
    tracker: &StateTracker,
) -> Result<Completion, SyncError> {
    tracker.advance(SyncState::Fetching);
    let images = deps.fetcher.fetch(&draft.image_refs).await?;

    let key = draft.listing_key();
    // Serialises same-ad publishes, a later one still publishes again
    let _guard = deps.key_locks.lock(&key).await;

    tracker.advance(SyncState::Uploading);
    let external_id = session.publish(draft, &images).await?;
    let listing = MarketplaceListing {
        external_id,
        published_at: Utc::now(),
    };

    info!(
        listing_key = %key,
        %external_id,
        images = images.len(),
        "Listing created on marketplace"
    );

    // From here a failure leaves a live listing without a record
    tracker.advance(SyncState::Recording);
    deps.records.commit(&key, &listing).await?;

    counter!("listing_published").increment(1);

    Ok(Completion::Published { key, listing })
}
