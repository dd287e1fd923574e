//! Speech capture and synthesis ports.
//!
//! Platform speech support is injected behind traits with an explicit
//! "unsupported" answer, so the session engine works identically on hosts
//! with no audio at all: capture disabled means the session accepts typed
//! input only, and synthesis falls back to the remote service (see
//! [`fallback`]).

pub mod fallback;

use async_trait::async_trait;

use crate::language::LanguageCode;

/// Speaking rate for synthesized speech: a little below natural, for
/// comprehension by the target audience.
pub const SPEECH_RATE: f32 = 0.9;

// ── Capture ──────────────────────────────────────────────────────

/// Port to a platform speech-recognition capability.
///
/// Capture runs continuously across pauses until explicitly stopped or the
/// underlying service ends the session. Recognition results are delivered
/// to the engine as full accumulated transcripts, each replacing the
/// previous one.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Whether the platform offers speech recognition at all.
    fn is_supported(&self) -> bool;

    /// Start continuous capture in the given language.
    async fn start(&self, language: LanguageCode) -> anyhow::Result<()>;

    /// Stop capture.
    async fn stop(&self) -> anyhow::Result<()>;
}

/// The absent-capability capture adapter.
pub struct NoCapture;

#[async_trait]
impl SpeechCapture for NoCapture {
    fn is_supported(&self) -> bool {
        false
    }

    async fn start(&self, _language: LanguageCode) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

// ── Synthesis ────────────────────────────────────────────────────

/// Result of asking the platform synthesizer to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The utterance started playing.
    Started,
    /// The platform has no synthesis capability.
    Unsupported,
}

/// Port to a platform speech-synthesis capability.
///
/// `speak` resolves once the utterance has actually started; a synthesizer
/// that stays silent simply never resolves, which the fallback speaker
/// treats as a miss after its grace window.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str, language: LanguageCode) -> anyhow::Result<SpeakOutcome>;
}

/// The absent-capability synthesizer.
pub struct NoSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NoSynthesizer {
    async fn speak(&self, _text: &str, _language: LanguageCode) -> anyhow::Result<SpeakOutcome> {
        Ok(SpeakOutcome::Unsupported)
    }
}

// ── Audio output ─────────────────────────────────────────────────

/// Port that plays an audio payload returned by the remote fallback.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: &[u8]) -> anyhow::Result<()>;
}

/// Sink that discards audio, for hosts with no playback device.
pub struct NullSink;

#[async_trait]
impl AudioSink for NullSink {
    async fn play(&self, audio: &[u8]) -> anyhow::Result<()> {
        tracing::debug!(bytes = audio.len(), "discarding audio payload");
        Ok(())
    }
}

// ── Voice selection ──────────────────────────────────────────────

/// A synthesis voice advertised by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47 tag, e.g. `hi-IN`.
    pub tag: String,
}

/// Best-match voice selection: exact tag match, then language-family
/// prefix match, then whatever voice is first in the inventory.
pub fn pick_voice(voices: &[Voice], language: LanguageCode) -> Option<&Voice> {
    if let Some(exact) = voices
        .iter()
        .find(|v| v.tag.eq_ignore_ascii_case(language.tag()))
    {
        return Some(exact);
    }

    let base = language.base_code();
    if let Some(family) = voices
        .iter()
        .find(|v| v.tag.to_ascii_lowercase().starts_with(base))
    {
        return Some(family);
    }

    voices.first()
}

// ── Tests ────────────────────────────────────────────────────────
