use std::collections::HashMap;

use aws_sdk_sqs::types::MessageAttributeValue;

/// A message attribute value as carried by SQS
///
/// SQS custom data types (`String.foo`, `Number.bar`) collapse onto their base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAttribute {
    /// `String` attribute
    String(String),
    /// `Number` attribute, kept in its textual form
    Number(String),
    /// `Binary` attribute
    Binary(Vec<u8>),
}

impl MessageAttribute {
    /// Returns the value if this is a `String` attribute
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Number(_) | Self::Binary(_) => None,
        }
    }

    /// Converts an SQS attribute value, returning `None` when the value is
    /// missing for its declared data type
    #[must_use]
    pub fn from_sqs(value: &MessageAttributeValue) -> Option<Self> {
        let data_type = value.data_type();
        if data_type.starts_with("String") {
            value.string_value().map(|v| Self::String(v.to_string()))
        } else if data_type.starts_with("Number") {
            value.string_value().map(|v| Self::Number(v.to_string()))
        } else if data_type.starts_with("Binary") {
            value
                .binary_value()
                .map(|blob| Self::Binary(blob.as_ref().to_vec()))
        } else {
            None
        }
    }
}

/// A raw message received from the listing queue
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Message ID
    pub message_id: String,
    /// Receipt handle for acknowledging the message
    pub receipt_handle: String,
    /// The message body, left undecoded
    pub body: String,
    /// Custom message attributes
    pub attributes: HashMap<String, MessageAttribute>,
    /// Number of times the message has been received, including this delivery
    pub receive_count: u32,
}

/// Configuration for queue operations
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// Default maximum number of messages to retrieve
    pub default_max_messages: i32,
    /// Default visibility timeout for messages (in seconds)
    pub default_visibility_timeout: i32,
    /// Default wait time for long polling
    pub default_wait_time_seconds: i32,
}
