//! The conversation session engine.
//!
//! Owns the message log, input buffer, and per-turn flags, and orchestrates
//! one full turn: optional speech transcript → translation to English →
//! generation → translation back → message log → speech output event.
//!
//! ## Design
//! - All collaborators are injected ports, so turn processing is a pure
//!   function of `(state, input, ports)` and unit-testable without any
//!   platform or network.
//! - A turn can never leave `is_loading` stuck true or abort the session:
//!   every remote failure degrades to a visible assistant message.
//! - Fire-and-forget effects come back as [`SessionEvent`]s for the outer
//!   driver to execute.

use std::sync::Arc;

use crate::generation::GenerationPort;
use crate::language::LanguageCode;
use crate::modes::{ModeConfig, ModeKind};
use crate::prefs::PreferencesStore;
use crate::session::events::SessionEvent;
use crate::session::state::{Message, SessionState};
use crate::speech::SpeechCapture;
use crate::translate::TranslatePort;

/// Keywords that make the shopping persona ask for a delivery location.
const SHOPPING_TRIGGERS: [&str; 3] = ["order", "buy", "purchase"];

/// Reply used when generation fails for any non-key reason.
const APOLOGY_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Reply used when the generation service rejected the API key.
const KEY_ERROR_REPLY: &str = "I couldn't reach my language service because the API key was \
     rejected. Please provide a new key and then ask me again.";

/// One active conversation with a persona.
pub struct SessionEngine {
    mode: ModeConfig,
    state: SessionState,
    prefs: Arc<dyn PreferencesStore>,
    generation: Arc<dyn GenerationPort>,
    translator: Arc<dyn TranslatePort>,
    capture: Arc<dyn SpeechCapture>,
}

impl SessionEngine {
    /// Initialize a session for `mode`. Language and API key come from the
    /// preference store; a missing key is replaced by the built-in fallback,
    /// which is persisted back so later sessions see it.
    pub fn new(
        mode: ModeConfig,
        prefs: Arc<dyn PreferencesStore>,
        generation: Arc<dyn GenerationPort>,
        translator: Arc<dyn TranslatePort>,
        capture: Arc<dyn SpeechCapture>,
    ) -> Self {
        let language = prefs.preferred_language().unwrap_or(LanguageCode::En);

        let api_key = match prefs.gemini_api_key() {
            Some(key) if !key.is_empty() => key,
            _ => {
                let key = crate::config::fallback_api_key();
                if let Err(error) = prefs.set_gemini_api_key(&key) {
                    tracing::warn!(error = %error, "failed to persist fallback API key");
                }
                key
            }
        };

        let mut state = SessionState::new(language, api_key);
        state.messages.push(Message::assistant(&welcome_text(&mode)));

        Self {
            mode,
            state,
            prefs,
            generation,
            translator,
            capture,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    /// Run one full turn. Never fails; every remote failure is converted
    /// into an assistant message and `is_loading` is reset on every path.
    ///
    /// No-op on empty input or while a turn is already in flight.
    pub async fn submit_turn(&mut self, raw_input: &str) -> Vec<SessionEvent> {
        if raw_input.trim().is_empty() {
            return Vec::new();
        }
        if self.state.is_loading {
            tracing::debug!("submission rejected: a turn is already in flight");
            return Vec::new();
        }

        let mut events = Vec::new();

        self.state.messages.push(Message::user(raw_input));
        self.state.pending_input.clear();
        self.state.is_loading = true;

        if self.mode.kind == ModeKind::Shopping && wants_delivery(raw_input) {
            events.push(SessionEvent::LocationRequested);
        }

        let english = self
            .translator
            .translate(raw_input, self.state.language, LanguageCode::En)
            .await;

        let reply = match self
            .generation
            .generate(&self.mode.system_prompt, &english, &self.state.api_key)
            .await
        {
            Ok(text) => text,
            Err(error) if error.is_recoverable_auth() => {
                tracing::warn!(error = %error, "generation rejected the API key");
                events.push(SessionEvent::KeyRecoveryRequested {
                    reason: error.to_string(),
                });
                KEY_ERROR_REPLY.to_string()
            }
            Err(error) => {
                tracing::warn!(error = %error, "generation failed");
                APOLOGY_REPLY.to_string()
            }
        };

        let localized = self
            .translator
            .translate(&reply, LanguageCode::En, self.state.language)
            .await;

        self.state.messages.push(Message::assistant(&localized));
        events.push(SessionEvent::Speak {
            text: localized,
            language: self.state.language,
        });

        self.state.is_loading = false;
        events
    }

    /// Answer an earlier [`SessionEvent::KeyRecoveryRequested`]. `Some`
    /// persists and adopts the new key for subsequent turns; `None` keeps
    /// the old one.
    pub fn supply_api_key(&mut self, key: Option<String>) -> Vec<SessionEvent> {
        match key {
            Some(key) if !key.trim().is_empty() => {
                let key = key.trim().to_string();
                if let Err(error) = self.prefs.set_gemini_api_key(&key) {
                    tracing::warn!(error = %error, "failed to persist replacement API key");
                }
                self.state.api_key = key;
                tracing::info!("API key replaced");
                vec![SessionEvent::KeyUpdated]
            }
            _ => {
                tracing::debug!("key recovery declined; keeping existing key");
                Vec::new()
            }
        }
    }

    /// Flip speech capture on or off. A platform without capture leaves
    /// `is_listening` false and the session accepts typed input only.
    pub async fn toggle_listening(&mut self) {
        if !self.capture.is_supported() {
            tracing::debug!("speech capture unsupported on this platform");
            self.state.is_listening = false;
            return;
        }

        if self.state.is_listening {
            if let Err(error) = self.capture.stop().await {
                tracing::warn!(error = %error, "failed to stop speech capture");
            }
            self.state.is_listening = false;
        } else {
            match self.capture.start(self.state.language).await {
                Ok(()) => self.state.is_listening = true,
                Err(error) => {
                    tracing::warn!(error = %error, "failed to start speech capture");
                    self.state.is_listening = false;
                }
            }
        }
    }

    /// Deliver a recognition result: the full accumulated transcript so
    /// far, replacing (not appending to) the pending input.
    pub fn transcript(&mut self, joined: &str) {
        self.state.pending_input = joined.to_string();
    }

    /// The capture adapter ended the session on its own (end of speech).
    pub fn capture_ended(&mut self) {
        self.state.is_listening = false;
    }

    /// Switch the conversation language and persist the choice. An active
    /// capture keeps its old binding until the next listening cycle.
    pub fn change_language(&mut self, language: LanguageCode) {
        self.state.language = language;
        if let Err(error) = self.prefs.set_preferred_language(language) {
            tracing::warn!(error = %error, "failed to persist language preference");
        }
    }

    /// Activate a different persona: session state resets except for the
    /// persisted language and API key, and a fresh welcome is logged.
    pub fn activate_mode(&mut self, mode: ModeConfig) {
        self.mode = mode;
        self.state.messages.clear();
        self.state.pending_input.clear();
        self.state.is_loading = false;
        self.state.is_listening = false;
        self.state
            .messages
            .push(Message::assistant(&welcome_text(&self.mode)));
    }
}

fn welcome_text(mode: &ModeConfig) -> String {
    format!(
        "Hello! I'm your {} assistant. How can I help you today?",
        mode.name
    )
}

fn wants_delivery(input: &str) -> bool {
    let lower = input.to_lowercase();
    SHOPPING_TRIGGERS.iter().any(|t| lower.contains(t))
}

// ── Tests ────────────────────────────────────────────────────────
