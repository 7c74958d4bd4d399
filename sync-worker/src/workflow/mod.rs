//! Per-action workflows
//!
//! A workflow runs every step of one message up to, but excluding, the
//! acknowledgment. It stops at the first failing step and leaves the state
//! tracker at the step that failed.

mod publish;
mod withdraw;

use std::sync::Arc;

use strum::Display;
use tokio::sync::watch;
use tracing::debug;

use crate::assets::AssetFetcher;
use crate::marketplace::Marketplace;
use crate::state_recorder::SyncRecordStore;
use crate::sync_processor::KeyLocks;
use crate::types::{Credentials, ExternalId, ListingKey, MarketplaceListing, SyncCommand, SyncError};

/// Lifecycle of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SyncState {
    Received,
    Parsed,
    Fetching,
    Uploading,
    Recording,
    Withdrawing,
    Acknowledged,
    Failed,
}

impl SyncState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged | Self::Failed)
    }
}

/// Last state a message reached
///
/// Readable after the workflow future has been dropped, which is how a timed out
/// message reports where it was stuck.
pub struct StateTracker {
    state: watch::Sender<SyncState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(SyncState::Received),
        }
    }

    /// Moves to `next`
    ///
    /// Terminal states are final; later transitions are ignored.
    pub fn advance(&self, next: SyncState) {
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            debug!(from = %state, to = %next, "Sync state transition");
            *state = next;
            true
        });
    }

    #[must_use]
    pub fn current(&self) -> SyncState {
        *self.state.borrow()
    }
}

/// Collaborators shared by every workflow run
pub struct WorkflowDeps {
    pub marketplace: Arc<dyn Marketplace>,
    pub fetcher: AssetFetcher,
    pub records: Arc<dyn SyncRecordStore>,
    pub key_locks: KeyLocks,
}

/// Durable effect of a completed workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Published {
        key: ListingKey,
        listing: MarketplaceListing,
    },
    Withdrawn(ExternalId),
}

/// Opens a session for `credentials` and runs `command` with it
///
/// The session lives until this function returns.
///
/// # Errors
///
/// Returns the first `SyncError` of authentication or the workflow steps
pub async fn execute(
    deps: &WorkflowDeps,
    credentials: &Credentials,
    command: &SyncCommand,
    tracker: &StateTracker,
) -> Result<Completion, SyncError> {
    let session = deps.marketplace.authenticate(credentials).await?;

    match command {
        SyncCommand::Publish(draft) => {
            publish::run(deps, session.as_ref(), draft, tracker).await
        }
        SyncCommand::Withdraw(external_id) => {
            withdraw::run(session.as_ref(), *external_id, tracker).await
        }
    }
}
