//! Notification Types
//!
//! Human-readable messages emitted to whatever transport is attached to a
//! simulation run, and the envelope networked transports wrap them in.
//!
//! # Example
//!
//! ```
//! use town_events::{Envelope, MessageType, Notification, Role};
//!
//! let note = Notification::inform(Role::System, "Agent town started...");
//! let frame = Envelope::wrap(note).to_json().unwrap();
//! assert!(frame.contains(r#""msg_type":"inform""#));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a notification speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Narration from the simulation itself
    System,
    /// Speech from an agent
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// What the receiver is expected to do with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Display only
    Inform,
    /// The human is expected to answer
    AskHuman,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Inform => write!(f, "inform"),
            MessageType::AskHuman => write!(f, "ask_human"),
        }
    }
}

/// A single message for the human participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub role: Role,
    pub msg_type: MessageType,
    pub message: String,
}

impl Notification {
    /// Creates a notification.
    pub fn new(role: Role, msg_type: MessageType, message: impl Into<String>) -> Self {
        Self {
            role,
            msg_type,
            message: message.into(),
        }
    }

    /// Creates an `inform` notification.
    pub fn inform(role: Role, message: impl Into<String>) -> Self {
        Self::new(role, MessageType::Inform, message)
    }

    /// Creates a system `ask_human` prompt.
    pub fn ask_human(message: impl Into<String>) -> Self {
        Self::new(Role::System, MessageType::AskHuman, message)
    }

    /// Returns true if the human is expected to answer this notification.
    pub fn expects_reply(&self) -> bool {
        self.msg_type == MessageType::AskHuman
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Frame pushed over duplex and request/response transports.
///
/// Serializes to `{"result": {role, msg_type, message}, "error": "", "stdout": ""}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub result: Notification,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub stdout: String,
}

impl Envelope {
    /// Wraps a notification with empty error and stdout fields.
    pub fn wrap(result: Notification) -> Self {
        Self {
            result,
            error: String::new(),
            stdout: String::new(),
        }
    }

    /// Serializes to a single-line JSON frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a JSON frame.
    pub fn from_json(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), r#""agent""#);
    }

    #[test]
    fn test_message_type_serialization() {
        assert_eq!(
            serde_json::to_string(&MessageType::AskHuman).unwrap(),
            r#""ask_human""#
        );
        assert_eq!(MessageType::Inform.to_string(), "inform");
    }

    #[test]
    fn test_envelope_shape() {
        let frame = Envelope::wrap(Notification::ask_human("Pick an action to perform?"))
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(value["result"]["role"], "system");
        assert_eq!(value["result"]["msg_type"], "ask_human");
        assert_eq!(value["result"]["message"], "Pick an action to perform?");
        assert_eq!(value["error"], "");
        assert_eq!(value["stdout"], "");
    }

    #[test]
    fn test_envelope_missing_optional_fields() {
        let frame = r#"{"result":{"role":"agent","msg_type":"inform","message":"hi"}}"#;
        let envelope = Envelope::from_json(frame).unwrap();
        assert_eq!(envelope.result.role, Role::Agent);
        assert!(envelope.error.is_empty());
        assert!(!envelope.result.expects_reply());
    }
}
