//! Queue operations for the listing sync worker
//!
//! This module provides functionality for interacting with the AWS SQS queue
//! that carries listing publish and withdraw requests.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Error types for queue operations
pub mod error;
/// Listing queue functionality
pub mod listing_queue;
/// Common types for queue operations
pub mod types;

pub use error::{QueueError, QueueResult};
pub use listing_queue::ListingQueue;
pub use types::{MessageAttribute, QueueConfig, QueueMessage};
