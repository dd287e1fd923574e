//! Session state: the message log and the per-turn flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::LanguageCode;

/// A single entry in the conversation log. Immutable once appended;
/// display order is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_user: true,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_user: false,
            timestamp: Utc::now(),
        }
    }
}

/// Mutable state of one conversation session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Append-only conversation log.
    pub messages: Vec<Message>,
    /// Text awaiting submission; overwritten by speech transcripts.
    pub pending_input: String,
    /// Whether speech capture is active.
    pub is_listening: bool,
    /// Whether a generation turn is in flight. Gates new submissions.
    pub is_loading: bool,
    /// The user's conversation language.
    pub language: LanguageCode,
    /// Key for the generation service. Never empty after initialization.
    pub api_key: String,
}

impl SessionState {
    pub fn new(language: LanguageCode, api_key: String) -> Self {
        Self {
            messages: Vec::new(),
            pending_input: String::new(),
            is_listening: false,
            is_loading: false,
            language,
            api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        let user = Message::user("hi");
        assert!(user.is_user);
        assert_eq!(user.text, "hi");

        let assistant = Message::assistant("hello");
        assert!(!assistant.is_user);
    }

    #[test]
    fn new_state_is_idle() {
        let state = SessionState::new(LanguageCode::En, "key".to_string());
        assert!(state.messages.is_empty());
        assert!(state.pending_input.is_empty());
        assert!(!state.is_listening);
        assert!(!state.is_loading);
        assert!(!state.api_key.is_empty());
    }
}
