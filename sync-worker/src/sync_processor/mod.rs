//! Queue polling and batch processing

mod key_lock;
mod pipeline;
mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use key_lock::{KeyGuard, KeyLocks};
pub use pipeline::{PipelineConfig, SyncPipeline};
pub use report::{BatchError, BatchReport, Failure, MessageOutcome};

use crate::transport::QueueTransport;
use crate::types::InboundMessage;

/// Pause after a failed poll before trying again
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Long-polls the listing queue and feeds every batch to the pipeline
pub struct SyncProcessor {
    queue: Arc<dyn QueueTransport>,
    pipeline: Arc<SyncPipeline>,
    shutdown: CancellationToken,
}

impl SyncProcessor {
    #[must_use]
    pub fn new(
        queue: Arc<dyn QueueTransport>,
        pipeline: Arc<SyncPipeline>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            pipeline,
            shutdown,
        }
    }

    /// Polls until the shutdown token is cancelled
    ///
    /// Only the long poll is interrupted by shutdown. A batch already received
    /// runs to completion, each message bounded by its own timeout.
    pub async fn start(self) {
        info!("Starting SyncProcessor");

        while !self.shutdown.is_cancelled() {
            tokio::select! {
                result = self.poll_once() => match result {
                    Ok(messages) => self.process(messages).await,
                    Err(e) => {
                        error!(error = ?e, "Failed to poll messages");
                        tokio::select! {
                            () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                            () = self.shutdown.cancelled() => {}
                        }
                    }
                },
                () = self.shutdown.cancelled() => {
                    info!("Queue poller shutting down");
                    break;
                }
            }
        }

        info!("SyncProcessor shutdown complete");
    }

    async fn poll_once(&self) -> anyhow::Result<Vec<InboundMessage>> {
        self.queue
            .receive_messages()
            .await
            .context("Failed to poll messages")
    }

    async fn process(&self, messages: Vec<InboundMessage>) {
        if messages.is_empty() {
            return;
        }

        let received = messages.len();
        let report = self.pipeline.process_batch(messages).await;

        for outcome in report.failures() {
            warn!(
                message_id = %outcome.message_id,
                kind = ?outcome.error_kind(),
                dead_letter_candidate = outcome.is_dead_letter_candidate(),
                "Message not acknowledged"
            );
        }
        info!(
            received,
            acknowledged = report.acknowledged(),
            "Processed listing batch"
        );
    }
}
