use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use metrics::counter;
use tracing::{error, info, instrument, warn};

use super::{BatchReport, Failure, KeyLocks, MessageOutcome};
use crate::ack::AckGate;
use crate::assets::{AssetFetcher, ImageStore};
use crate::attributes;
use crate::marketplace::Marketplace;
use crate::state_recorder::SyncRecordStore;
use crate::transport::QueueTransport;
use crate::types::{Action, InboundMessage, SyncCommand, SyncError};
use crate::workflow::{self, Completion, StateTracker, SyncState, WorkflowDeps};

/// Tuning of the message pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Messages of one batch processed at once
    pub max_in_flight: usize,
    /// Concurrent image downloads per listing
    pub image_fetch_concurrency: usize,
    /// Deadline for one workflow, acknowledgment excluded
    pub message_timeout: Duration,
    /// Receive count from which failures are reported as dead-letter candidates
    pub max_receive_count: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 10,
            image_fetch_concurrency: 4,
            message_timeout: Duration::from_secs(50),
            max_receive_count: 5,
        }
    }
}

/// Runs messages through parsing, their workflow and the acknowledgment gate
pub struct SyncPipeline {
    deps: WorkflowDeps,
    ack: AckGate,
    config: PipelineConfig,
}

impl SyncPipeline {
    #[must_use]
    pub fn new(
        marketplace: Arc<dyn Marketplace>,
        images: Arc<dyn ImageStore>,
        records: Arc<dyn SyncRecordStore>,
        queue: Arc<dyn QueueTransport>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            deps: WorkflowDeps {
                marketplace,
                fetcher: AssetFetcher::new(images, config.image_fetch_concurrency),
                records,
                key_locks: KeyLocks::new(),
            },
            ack: AckGate::new(queue),
            config,
        }
    }

    /// Processes a batch, at most `max_in_flight` messages at a time
    ///
    /// Every message gets its own outcome; a failing message never stops its
    /// siblings.
    pub async fn process_batch(&self, messages: Vec<InboundMessage>) -> BatchReport {
        let outcomes: Vec<MessageOutcome> = stream::iter(messages)
            .map(|message| self.process_message(message))
            .buffer_unordered(self.config.max_in_flight.max(1))
            .collect()
            .await;

        BatchReport { outcomes }
    }

    /// Processes one message and acknowledges it if its workflow committed
    #[instrument(
        skip(self, message),
        fields(
            message_id = %message.message_id,
            receive_count = message.receive_count,
            action = tracing::field::Empty,
            listing_key = tracing::field::Empty,
        )
    )]
    pub async fn process_message(&self, message: InboundMessage) -> MessageOutcome {
        let tracker = StateTracker::new();

        let (attributes, command) = match parse(&message) {
            Ok(parsed) => parsed,
            Err(error) => return self.fail(&message, None, &tracker, error),
        };
        let action = attributes.action;
        let span = tracing::Span::current();
        span.record("action", tracing::field::display(action));
        if let SyncCommand::Publish(draft) = &command {
            span.record("listing_key", tracing::field::display(draft.listing_key()));
        }
        tracker.advance(SyncState::Parsed);

        let timeout = self.config.message_timeout;
        let result = tokio::time::timeout(
            timeout,
            workflow::execute(&self.deps, &attributes.credentials, &command, &tracker),
        )
        .await
        .unwrap_or_else(|_| Err(SyncError::Timeout(timeout)));

        let completion = match result {
            Ok(completion) => completion,
            Err(error) => return self.fail(&message, Some(action), &tracker, error),
        };

        // Effects are durable, the message may go
        if let Err(error) = self.ack.delete(&message.receipt_handle).await {
            if let Completion::Published { key, listing } = &completion {
                warn!(
                    listing_key = %key,
                    external_id = %listing.external_id,
                    "Listing recorded but message not acknowledged, redelivery will publish again"
                );
            }
            return self.fail(&message, Some(action), &tracker, error.into());
        }

        tracker.advance(SyncState::Acknowledged);
        counter!("sync_message_acknowledged").increment(1);
        info!(state = %tracker.current(), "Message acknowledged");

        MessageOutcome {
            message_id: message.message_id,
            action: Some(action),
            state: tracker.current(),
            failure: None,
        }
    }

    fn fail(
        &self,
        message: &InboundMessage,
        action: Option<Action>,
        tracker: &StateTracker,
        error: SyncError,
    ) -> MessageOutcome {
        let at = tracker.current();
        tracker.advance(SyncState::Failed);

        let kind = error.kind();
        counter!("sync_message_failed", "kind" => kind.to_string()).increment(1);

        let dead_letter_candidate = message.receive_count >= self.config.max_receive_count;
        if dead_letter_candidate {
            error!(
                error = %error,
                %kind,
                state = %at,
                receive_count = message.receive_count,
                "Message failed on its last delivery, dead-letter candidate"
            );
        } else if error.is_retryable() {
            warn!(error = %error, %kind, state = %at, "Message failed, left for redelivery");
        } else {
            error!(error = %error, %kind, state = %at, "Message failed");
        }

        MessageOutcome {
            message_id: message.message_id.clone(),
            action,
            state: tracker.current(),
            failure: Some(Failure {
                at,
                error,
                dead_letter_candidate,
            }),
        }
    }
}

fn parse(
    message: &InboundMessage,
) -> Result<(attributes::MessageAttributes, SyncCommand), SyncError> {
    let extracted = attributes::extract(&message.attributes)?;
    let command = attributes::decode_command(extracted.action, &message.body)?;
    Ok((extracted, command))
}
