//! Output events emitted by the session engine.
//!
//! Fire-and-forget side effects (speech playback, the location prompt, key
//! recovery) are returned to the caller as events instead of being executed
//! inside the engine, keeping turn processing deterministic. The outer
//! driver performs the actual playback or UI effect.

use crate::language::LanguageCode;

/// A side effect requested by the engine alongside its state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Speak the localized assistant reply.
    Speak {
        text: String,
        language: LanguageCode,
    },
    /// The shopping persona detected an order intent; ask the user to
    /// confirm a delivery location. Fire-and-forget, never blocks the turn.
    LocationRequested,
    /// The generation service rejected the API key; ask the user for a
    /// replacement. The turn has already completed with an error message in
    /// the log, and a new key applies to subsequent turns only.
    KeyRecoveryRequested { reason: String },
    /// A replacement API key was accepted and persisted.
    KeyUpdated,
}
