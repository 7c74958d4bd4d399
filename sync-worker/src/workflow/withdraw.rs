use metrics::counter;
use tracing::info;

use super::{Completion, StateTracker, SyncState};
use crate::marketplace::MarketplaceSession;
use crate::types::{ExternalId, SyncError};

/// Deletes the listing; the sync record table is not touched
pub(super) async fn run(
    session: &dyn MarketplaceSession,
    external_id: ExternalId,
    tracker: &StateTracker,
) -> Result<Completion, SyncError> {
    tracker.advance(SyncState::Withdrawing);
    session.withdraw(external_id).await?;

    info!(%external_id, "Listing withdrawn from marketplace");
    counter!("listing_withdrawn").increment(1);

    Ok(Completion::Withdrawn(external_id))
}
