//! Translation gateway.
//!
//! Stateless mapping of (text, source, target) to translated text through a
//! LibreTranslate-compatible endpoint. Translation is best-effort: when the
//! source and target match, no network call is made, and any transport or
//! parse failure returns the original text unchanged. A turn is never
//! blocked or failed by translation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::language::LanguageCode;

/// Port to the translation service.
#[async_trait]
pub trait TranslatePort: Send + Sync {
    /// Translate `text` from `source` to `target`, returning the input
    /// unchanged when translation is unnecessary or fails.
    async fn translate(&self, text: &str, source: LanguageCode, target: LanguageCode) -> String;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'static str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for a LibreTranslate-compatible endpoint.
pub struct LibreTranslateClient {
    http: reqwest::Client,
    url: String,
}

impl LibreTranslateClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.translate_url.clone(),
        })
    }

    async fn request(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> anyhow::Result<String> {
        let body = TranslateRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: TranslateResponse = response.json().await?;
        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl TranslatePort for LibreTranslateClient {
    async fn translate(&self, text: &str, source: LanguageCode, target: LanguageCode) -> String {
        if source == target {
            return text.to_string();
        }

        match self.request(text, source, target).await {
            Ok(translated) => translated,
            Err(error) => {
                tracing::warn!(
                    source = source.code(),
                    target = target.code(),
                    error = %error,
                    "translation failed; passing text through"
                );
                text.to_string()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
