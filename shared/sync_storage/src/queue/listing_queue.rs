//! Listing queue operations
//!
//! Messages on this queue carry their routing data (action and marketplace
//! credentials) as message attributes, and the listing payload as the body.

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_sqs::{
    error::SdkError,
    types::{MessageAttributeValue, MessageSystemAttributeName},
    Client as SqsClient,
};

use crate::queue::{
    error::{QueueError, QueueResult},
    types::{MessageAttribute, QueueConfig, QueueMessage},
};

/// Listing queue for receiving publish and withdraw requests
pub struct ListingQueue {
    sqs_client: Arc<SqsClient>,
    config: QueueConfig,
}

impl ListingQueue {
    /// Creates a new listing queue
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    /// * `config` - Queue configuration including URL and default parameters
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: QueueConfig) -> Self {
        Self { sqs_client, config }
    }

    /// Sends a message with string attributes to the queue
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message body
    /// * `attributes` - String attributes attached to the message
    ///
    /// # Returns
    ///
    /// The message ID if successful or an empty string
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if an attribute is invalid or the send operation fails
    pub async fn send_message(
        &self,
        body: &str,
        attributes: &[(&str, &str)],
    ) -> QueueResult<String> {
        let mut request = self
            .sqs_client
            .send_message()
            .queue_url(&self.config.queue_url)
            .message_body(body);

        for (name, value) in attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(*value)
                .build()?;
            request = request.message_attributes(*name, attribute);
        }

        let result = request.send().await?;

        Ok(result
            .message_id()
            .map(std::string::ToString::to_string)
            .unwrap_or_default())
    }

    /// Polls messages from the queue
    ///
    /// Messages without a body, receipt handle or ID are skipped. Attributes whose
    /// value does not match their declared data type are dropped, which later
    /// surfaces as a missing attribute.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the poll operation fails
    pub async fn poll_messages(&self) -> QueueResult<Vec<QueueMessage>> {
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.default_max_messages)
            .visibility_timeout(self.config.default_visibility_timeout)
            .wait_time_seconds(self.config.default_wait_time_seconds)
            .message_attribute_names("All")
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await?;

        let messages = result
            .messages()
            .iter()
            .filter_map(|msg| {
                let body = msg.body()?.to_string();
                let receipt_handle = msg.receipt_handle()?.to_string();
                let message_id = msg.message_id()?.to_string();

                let attributes: HashMap<String, MessageAttribute> = msg
                    .message_attributes()
                    .map(|attrs| {
                        attrs
                            .iter()
                            .filter_map(|(name, value)| {
                                MessageAttribute::from_sqs(value).map(|v| (name.clone(), v))
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let receive_count = msg
                    .attributes()
                    .and_then(|attrs| {
                        attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount)
                    })
                    .and_then(|count| count.parse().ok())
                    .unwrap_or(1);

                tracing::debug!(
                    message_id = %message_id,
                    receive_count,
                    "Received listing message with {} attributes",
                    attributes.len()
                );

                Some(QueueMessage {
                    message_id,
                    receipt_handle,
                    body,
                    attributes,
                    receive_count,
                })
            })
            .collect();

        Ok(messages)
    }

    /// Acknowledges receipt of a message by deleting it from the queue
    ///
    /// # Arguments
    ///
    /// * `receipt_handle` - The receipt handle from the received message
    ///
    /// # Errors
    ///
    /// Returns `QueueError::StaleReceipt` if the receipt handle is no longer valid,
    /// and `QueueError::DeleteMessage` for any other failure
    pub async fn ack_message(&self, receipt_handle: &str) -> QueueResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_receipt_handle_is_invalid()
                ) {
                    QueueError::StaleReceipt
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }
}
