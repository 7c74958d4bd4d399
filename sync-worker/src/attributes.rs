//! Message attribute extraction
//!
//! Turns the attributes and body of a queue message into a [`SyncCommand`] plus
//! the credentials to run it with. Pure functions, no I/O.

use std::collections::HashMap;
use std::str::FromStr;

use sync_storage::queue::MessageAttribute;
use thiserror::Error;

use crate::types::{Action, AdDraft, Credentials, ExternalId, SyncCommand};

const ACTION: &str = "action";
const USERNAME: &str = "username";
const PASSWORD: &str = "password";

/// Attributes every message must carry, checked in this order
pub const REQUIRED_ATTRIBUTES: [&str; 3] = [ACTION, USERNAME, PASSWORD];

/// A message that can never succeed as delivered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required attribute is absent or not a string
    #[error("Missing message attribute \"{0}\"")]
    MissingAttribute(String),

    /// The `action` attribute names no known action
    #[error("Unknown action \"{0}\"")]
    UnknownAction(String),

    /// The body does not match what the action expects
    #[error("Invalid {action} payload: {reason}")]
    InvalidPayload { action: Action, reason: String },
}

/// Routing data of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttributes {
    pub action: Action,
    pub credentials: Credentials,
}

fn required<'a>(
    attributes: &'a HashMap<String, MessageAttribute>,
    key: &str,
) -> Result<&'a str, ValidationError> {
    attributes
        .get(key)
        .and_then(MessageAttribute::as_string)
        .ok_or_else(|| ValidationError::MissingAttribute(key.to_string()))
}

/// Extracts the action and credentials from message attributes
///
/// # Errors
///
/// Returns `ValidationError::MissingAttribute` for the first required attribute
/// that is absent or not a string, then `ValidationError::UnknownAction` if the
/// action is not recognised.
pub fn extract(
    attributes: &HashMap<String, MessageAttribute>,
) -> Result<MessageAttributes, ValidationError> {
    let [action, username, password] = REQUIRED_ATTRIBUTES.map(|key| required(attributes, key));
    let (action, username, password) = (action?, username?, password?);

    let action = Action::from_str(action)
        .map_err(|_| ValidationError::UnknownAction(action.to_string()))?;

    Ok(MessageAttributes {
        action,
        credentials: Credentials {
            username: username.to_string(),
            password: password.to_string(),
        },
    })
}

/// Decodes a message body according to its action
///
/// `upload` bodies are JSON ad drafts, `remove` bodies are a bare decimal
/// marketplace identifier.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPayload` if the body does not decode
pub fn decode_command(action: Action, body: &str) -> Result<SyncCommand, ValidationError> {
    match action {
        Action::Publish => serde_json::from_str::<AdDraft>(body)
            .map(SyncCommand::Publish)
            .map_err(|e| ValidationError::InvalidPayload {
                action,
                reason: e.to_string(),
            }),
        Action::Withdraw => ExternalId::from_str(body)
            .map(SyncCommand::Withdraw)
            .map_err(|e| ValidationError::InvalidPayload {
                action,
                reason: format!("{e}: {body:?}"),
            }),
    }
}
