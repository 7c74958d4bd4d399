//! Acknowledgment gate
//!
//! Deleting a message is the last step of every successful workflow. Callers must
//! only reach it once all side effects for the message are durable.

use std::sync::Arc;

use sync_storage::queue::QueueError;
use thiserror::Error;
use tracing::warn;

use crate::transport::QueueTransport;

/// Failure deleting a message from the queue
#[derive(Error, Debug)]
#[error("Failed to acknowledge message: {0}")]
pub struct AckError(#[from] pub QueueError);

/// Deletes messages whose workflow has committed
#[derive(Clone)]
pub struct AckGate {
    transport: Arc<dyn QueueTransport>,
}

impl AckGate {
    #[must_use]
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self { transport }
    }

    /// Deletes the message behind `receipt_handle`
    ///
    /// A stale receipt means the message is already gone or will be redelivered,
    /// so it is logged and reported as success.
    ///
    /// # Errors
    ///
    /// Returns `AckError` for any other transport failure
    pub async fn delete(&self, receipt_handle: &str) -> Result<(), AckError> {
        match self.transport.delete_message(receipt_handle).await {
            Ok(()) => Ok(()),
            Err(QueueError::StaleReceipt) => {
                warn!("Receipt handle is stale, treating message as acknowledged");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingQueue;

    #[tokio::test]
    async fn test_stale_receipt_is_success() {
        let queue = Arc::new(RecordingQueue::new().with_stale_receipts());
        let gate = AckGate::new(queue.clone());

        assert!(gate.delete("receipt-1").await.is_ok());
        assert_eq!(queue.deleted(), vec!["receipt-1".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let queue = Arc::new(RecordingQueue::new().with_failing_deletes());
        let gate = AckGate::new(queue);

        assert!(gate.delete("receipt-1").await.is_err());
    }
}
