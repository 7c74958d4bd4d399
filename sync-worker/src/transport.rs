//! Queue transport seam

use sync_storage::queue::{ListingQueue, QueueError, QueueMessage};

/// Delivers listing messages and deletes them once handled
#[async_trait::async_trait]
pub trait QueueTransport: Send + Sync {
    /// Long-polls for the next batch, which may be empty
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>, QueueError>;

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError>;
}

#[async_trait::async_trait]
impl QueueTransport for ListingQueue {
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>, QueueError> {
        self.poll_messages().await
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.ack_message(receipt_handle).await
    }
}
