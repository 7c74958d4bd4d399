use thiserror::Error;

use crate::types::{Action, ErrorKind, SyncError};
use crate::workflow::SyncState;

/// Why a message ended up `Failed`
#[derive(Debug)]
pub struct Failure {
    /// Last state reached before failing
    pub at: SyncState,
    pub error: SyncError,
    /// Failed on or after the last delivery the queue allows
    pub dead_letter_candidate: bool,
}

/// Result of processing one message
#[derive(Debug)]
pub struct MessageOutcome {
    pub message_id: String,
    /// Known once attributes have been parsed
    pub action: Option<Action>,
    /// Terminal state, `Acknowledged` or `Failed`
    pub state: SyncState,
    pub failure: Option<Failure>,
}

impl MessageOutcome {
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        matches!(self.state, SyncState::Acknowledged)
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure.as_ref().map(|f| f.error.kind())
    }

    #[must_use]
    pub fn is_dead_letter_candidate(&self) -> bool {
        self.failure.as_ref().is_some_and(|f| f.dead_letter_candidate)
    }
}

/// Outcomes of one batch, in completion order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<MessageOutcome>,
}

/// At least one message of a batch failed
#[derive(Error, Debug)]
#[error("{} of {total} messages failed, first: {}", .failures.len(), first_error(.failures))]
pub struct BatchError {
    pub total: usize,
    pub failures: Vec<MessageOutcome>,
}

fn first_error(failures: &[MessageOutcome]) -> String {
    failures
        .iter()
        .find_map(|outcome| outcome.failure.as_ref())
        .map_or_else(String::new, |failure| failure.error.to_string())
}

impl BatchReport {
    #[must_use]
    pub fn acknowledged(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_acknowledged()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MessageOutcome> {
        self.outcomes.iter().filter(|o| !o.is_acknowledged())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// All-or-nothing view of the batch
    ///
    /// Known limitation: a single failed message fails the whole batch even though
    /// its successful siblings are already acknowledged. Only the failed ones are
    /// redelivered, but callers that retry the batch as a unit will see a failure
    /// for work that is done.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` carrying every failed outcome if any message failed
    pub fn into_result(self) -> Result<usize, BatchError> {
        let total = self.outcomes.len();
        let (acknowledged, failures): (Vec<_>, Vec<_>) = self
            .outcomes
            .into_iter()
            .partition(MessageOutcome::is_acknowledged);

        if failures.is_empty() {
            Ok(acknowledged.len())
        } else {
            Err(BatchError { total, failures })
        }
    }
}
