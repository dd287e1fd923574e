//! Remote speech-synthesis fallback.
//!
//! When the platform synthesizer is absent, errors, or produces nothing
//! within a short grace window, the reply text is sent to a remote TTS
//! service and the returned audio is played through the injected sink.
//! Fallback failures are logged and never surfaced to the user.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::language::LanguageCode;
use crate::speech::{AudioSink, SpeakOutcome, SpeechSynthesizer};

/// How long to wait for local synthesis to start before falling back.
pub const SYNTH_GRACE_WINDOW: Duration = Duration::from_millis(1500);

#[derive(serde::Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

/// HTTP client for the remote TTS endpoint. The response body is an audio
/// payload to be played as-is.
pub struct RemoteTtsClient {
    http: reqwest::Client,
    url: String,
}

impl RemoteTtsClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.tts_url.clone(),
        })
    }

    /// Synthesize `text` in the given base language code, returning the
    /// raw audio bytes.
    pub async fn synthesize(&self, text: &str, lang: &str) -> anyhow::Result<Vec<u8>> {
        let response = self
            .http
            .post(&self.url)
            .json(&TtsRequest { text, lang })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Speech output adapter: platform synthesis first, remote fallback after
/// the grace window.
pub struct Speaker {
    synth: Arc<dyn SpeechSynthesizer>,
    fallback: RemoteTtsClient,
    sink: Arc<dyn AudioSink>,
    grace_window: Duration,
}

impl Speaker {
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        fallback: RemoteTtsClient,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        Self {
            synth,
            fallback,
            sink,
            grace_window: SYNTH_GRACE_WINDOW,
        }
    }

    /// Override the grace window (tests shrink it).
    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.grace_window = grace_window;
        self
    }

    /// Speak `text` in `language`. Never fails: every miss along the way
    /// degrades to the next option and the last one is only logged.
    pub async fn speak(&self, text: &str, language: LanguageCode) {
        match tokio::time::timeout(self.grace_window, self.synth.speak(text, language)).await {
            Ok(Ok(SpeakOutcome::Started)) => return,
            Ok(Ok(SpeakOutcome::Unsupported)) => {
                tracing::debug!("platform synthesis unsupported; using remote fallback");
            }
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "platform synthesis failed; using remote fallback");
            }
            Err(_) => {
                tracing::debug!(
                    grace_ms = self.grace_window.as_millis() as u64,
                    "no speech within grace window; using remote fallback"
                );
            }
        }

        match self.fallback.synthesize(text, language.base_code()).await {
            Ok(audio) => {
                if let Err(error) = self.sink.play(&audio).await {
                    tracing::warn!(error = %error, "audio playback failed");
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "remote speech fallback failed");
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StartedSynth;

    #[async_trait]
    impl SpeechSynthesizer for StartedSynth {
        async fn speak(&self, _: &str, _: LanguageCode) -> anyhow::Result<SpeakOutcome> {
            Ok(SpeakOutcome::Started)
        }
    }

    /// Synthesizer that accepts the request but never actually speaks.
    struct SilentSynth;

    #[async_trait]
    impl SpeechSynthesizer for SilentSynth {
        async fn speak(&self, _: &str, _: LanguageCode) -> anyhow::Result<SpeakOutcome> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        played: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl AudioSink for RecordingSink {
        async fn play(&self, audio: &[u8]) -> anyhow::Result<()> {
            self.played.lock().push(audio.to_vec());
            Ok(())
        }
    }

    fn tts_client(server: &MockServer) -> RemoteTtsClient {
        let config = Config {
            tts_url: format!("{}/api/tts", server.uri()),
            ..Config::default()
        };
        RemoteTtsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn local_synthesis_skips_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sink = Arc::new(RecordingSink::default());
        let speaker = Speaker::new(Arc::new(StartedSynth), tts_client(&server), sink.clone());
        speaker.speak("hello", LanguageCode::En).await;
        assert!(sink.played.lock().is_empty());
    }

    #[tokio::test]
    async fn unsupported_synthesis_uses_remote_with_base_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .and(body_json(json!({ "text": "नमस्ते", "lang": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let sink = Arc::new(RecordingSink::default());
        let speaker = Speaker::new(
            Arc::new(crate::speech::NoSynthesizer),
            tts_client(&server),
            sink.clone(),
        );
        speaker.speak("नमस्ते", LanguageCode::Hi).await;

        let played = sink.played.lock();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0], vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn silent_synthesis_falls_back_after_grace_window() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8]))
            .expect(1)
            .mount(&server)
            .await;

        let sink = Arc::new(RecordingSink::default());
        let speaker = Speaker::new(Arc::new(SilentSynth), tts_client(&server), sink.clone())
            .with_grace_window(Duration::from_millis(20));
        speaker.speak("hello", LanguageCode::En).await;
        assert_eq!(sink.played.lock().len(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = Arc::new(RecordingSink::default());
        let speaker = Speaker::new(
            Arc::new(crate::speech::NoSynthesizer),
            tts_client(&server),
            sink.clone(),
        );
        // Must not panic or error; the miss is only logged.
        speaker.speak("hello", LanguageCode::En).await;
        assert!(sink.played.lock().is_empty());
    }
}
