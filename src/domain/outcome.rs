//! Email-processing outcome messages.
//!
//! Inbound email handlers record warnings and errors against the status an
//! email tried to move an entity to. These are annotations only; they are
//! never part of the activity log.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Severity of an outcome message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Warning,
    Error,
}

/// A single outcome message. Extra fields are kept but not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailProcessingMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,

    #[serde(alias = "toStatus")]
    pub to_status: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl EmailProcessingMessage {
    pub fn new(message_type: MessageType, to_status: impl Into<String>) -> Self {
        Self {
            message_type,
            to_status: to_status.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Outcome messages grouped by `{type, to_status}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeIndex {
    errors: HashSet<String>,
    warnings: HashSet<String>,
}

impl OutcomeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages<'a, I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a EmailProcessingMessage>,
    {
        let mut index = Self::new();
        for message in messages {
            index.insert(message);
        }
        index
    }

    /// Read messages from a metadata document.
    ///
    /// Looks for an array at `email_processing.messages` (or
    /// `emailProcessing.messages`). Anything missing or malformed yields an
    /// empty index; entries that fail to parse are skipped.
    pub fn from_metadata(metadata: &Value) -> Self {
        let messages = metadata
            .get("email_processing")
            .or_else(|| metadata.get("emailProcessing"))
            .and_then(|section| section.get("messages"));

        match messages {
            Some(value) => Self::from_value(value),
            None => Self::new(),
        }
    }

    /// Parse a raw JSON array of messages
    pub fn from_value(value: &Value) -> Self {
        let Some(entries) = value.as_array() else {
            debug!("Outcome messages are not an array, ignoring");
            return Self::new();
        };

        let mut index = Self::new();
        for entry in entries {
            match serde_json::from_value::<EmailProcessingMessage>(entry.clone()) {
                Ok(message) => index.insert(&message),
                Err(e) => debug!(error = %e, "Skipping malformed outcome message"),
            }
        }
        index
    }

    pub fn insert(&mut self, message: &EmailProcessingMessage) {
        let target = match message.message_type {
            MessageType::Error => &mut self.errors,
            MessageType::Warning => &mut self.warnings,
        };
        target.insert(message.to_status.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_error(&self, status: &str) -> bool {
        self.errors.contains(status)
    }

    pub fn has_warning(&self, status: &str) -> bool {
        self.warnings.contains(status)
    }
}
