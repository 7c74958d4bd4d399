//! Error taxonomy of the synchronization pipeline

use std::time::Duration;

use strum::Display;
use thiserror::Error;

use crate::ack::AckError;
use crate::assets::FetchError;
use crate::attributes::ValidationError;
use crate::marketplace::{AuthError, PublishError, WithdrawError};
use crate::state_recorder::StoreError;

/// How a failure should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The message can never succeed, only the dead-letter path helps
    Validation,
    /// An I/O dependency failed, redelivery may succeed
    TransientIo,
    /// The marketplace rejected the credentials
    Auth,
    /// A conditional write lost against a newer publication
    Conflict,
}

/// First failure of a message workflow
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Withdraw(#[from] WithdrawError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ack(#[from] AckError),

    /// The workflow did not finish within the per-message deadline
    #[error("Message processing timed out after {0:?}")]
    Timeout(Duration),
}

impl SyncError {
    /// Classifies the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(AuthError::InvalidCredentials(_)) => ErrorKind::Auth,
            Self::Store(StoreError::Conflict(_)) => ErrorKind::Conflict,
            // A rejected listing is a marketplace-side verdict, not a glitch
            Self::Publish(PublishError::Rejected { .. })
            | Self::Withdraw(WithdrawError::Rejected { .. }) => ErrorKind::Validation,
            Self::Fetch(_)
            | Self::Auth(AuthError::Transport(_))
            | Self::Publish(PublishError::Transport(_))
            | Self::Withdraw(WithdrawError::Transport(_))
            | Self::Store(StoreError::Unavailable(_))
            | Self::Ack(_)
            | Self::Timeout(_) => ErrorKind::TransientIo,
        }
    }

    /// Whether redelivering the message may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientIo)
    }
}
