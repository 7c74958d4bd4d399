//! Error types for marketplace operations

use thiserror::Error;

/// Authentication failures
#[derive(Error, Debug)]
pub enum AuthError {
    /// The marketplace rejected the credentials
    #[error("Marketplace rejected credentials for user {0}")]
    InvalidCredentials(String),

    /// The marketplace could not be reached or answered unexpectedly
    #[error("Marketplace authentication request failed: {0}")]
    Transport(String),
}

/// Failures creating a listing
#[derive(Error, Debug)]
pub enum PublishError {
    /// The marketplace refused the listing (4xx)
    #[error("Marketplace rejected listing: HTTP {status}")]
    Rejected {
        /// HTTP status returned by the marketplace
        status: u16,
    },

    /// The marketplace could not be reached or answered unexpectedly
    #[error("Marketplace publish request failed: {0}")]
    Transport(String),
}

/// Failures deleting a listing
#[derive(Error, Debug)]
pub enum WithdrawError {
    /// The marketplace refused the deletion (4xx other than 404)
    #[error("Marketplace rejected withdrawal of listing {external_id}: HTTP {status}")]
    Rejected {
        /// Listing that was being withdrawn
        external_id: i64,
        /// HTTP status returned by the marketplace
        status: u16,
    },

    /// The marketplace could not be reached or answered unexpectedly
    #[error("Marketplace withdraw request failed: {0}")]
    Transport(String),
}

impl From<reqwest_middleware::Error> for AuthError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for PublishError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for WithdrawError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
