//! Sahayak — a voice-enabled AI companion for senior citizens.
//!
//! The heart of the crate is the [`session::SessionEngine`]: it owns the
//! conversation log and, for each user turn, coordinates speech capture,
//! bidirectional translation, the Gemini generation client, and speech
//! output. Remote services and platform capabilities are all injected
//! behind ports so the engine runs (and is tested) without any of them.
//!
//! Module map:
//! - [`session`] — message log, turn engine, output events
//! - [`generation`] — Gemini client and failure taxonomy
//! - [`translate`] — best-effort translation gateway
//! - [`speech`] — capture/synthesis ports and the remote TTS fallback
//! - [`modes`] — persona configurations
//! - [`prefs`] — persisted language and API-key preferences
//! - [`config`] — endpoints and model selection

pub mod config;
pub mod generation;
pub mod language;
pub mod modes;
pub mod prefs;
pub mod session;
pub mod speech;
pub mod translate;

pub use config::Config;
pub use language::LanguageCode;
pub use modes::{ModeConfig, ModeKind};
pub use session::{Message, SessionEngine, SessionEvent, SessionState};
