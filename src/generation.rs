//! Gemini generation client.
//!
//! Sends a single-turn persona prompt plus user text to the Gemini
//! `generateContent` endpoint and parses the structured response. Failures
//! are tagged so the session engine can tell a rejected API key (which
//! triggers interactive key recovery) from everything else (which degrades
//! to an apology reply). The client never retries: retry is the user's
//! responsibility after correcting the key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

// Fixed generation parameters for all personas. f64 so the wire values
// serialize exactly as 0.7 / 0.8.
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Rejection statuses that mean the API key itself is the problem.
const RECOVERABLE_AUTH_STATUSES: [&str; 2] = ["INVALID_ARGUMENT", "PERMISSION_DENIED"];

/// Failure taxonomy for a generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service rejected the request with a named status.
    #[error("generation rejected ({status}): {message}")]
    Rejected { status: String, message: String },
    /// Transport-level failure (connect, timeout, TLS).
    #[error("generation transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body had neither a candidate nor an error.
    #[error("malformed generation response")]
    Malformed,
}

impl GenerationError {
    /// Whether the failure is the recoverable key-rejection case.
    pub fn is_recoverable_auth(&self) -> bool {
        matches!(
            self,
            Self::Rejected { status, .. } if RECOVERABLE_AUTH_STATUSES.contains(&status.as_str())
        )
    }
}

/// Port to the remote generation service.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate a reply for `user_text` (already in English) under the
    /// given persona prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        api_key: &str,
    ) -> Result<String, GenerationError>;
}

// ── Wire types ───────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Deserialize)]
struct ApiError {
    status: Option<String>,
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(system_prompt: &str, user_text: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: format!("{system_prompt}\n\nUser: {user_text}"),
                }],
            }],
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_HARASSMENT",
                threshold: "BLOCK_MEDIUM_AND_ABOVE",
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[async_trait]
impl GenerationPort for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        let body = Self::build_request(system_prompt, user_text);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        // The error branch is carried in the body, so parse it regardless
        // of the HTTP status code.
        let parsed: GenerateResponse = response.json().await?;

        if let Some(error) = parsed.error {
            let status = error.status.unwrap_or_else(|| "UNKNOWN".to_string());
            let message = error.message.unwrap_or_default();
            tracing::warn!(status = %status, "Gemini rejected the request");
            return Err(GenerationError::Rejected { status, message });
        }

        parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .map(|p| p.text)
            .ok_or(GenerationError::Malformed)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = Config {
            gemini_base_url: server.uri(),
            gemini_model: "gemini-2.0-flash".to_string(),
            ..Config::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn reply_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "parts": [{ "text": text }] } }
            ]
        })
    }

    #[tokio::test]
    async fn generate_parses_reply_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Namaste!")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client
            .generate("You are a guide.", "hello", "test-key")
            .await
            .unwrap();
        assert_eq!(reply, "Namaste!");
    }

    #[tokio::test]
    async fn generate_sends_fixed_parameters_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": "You are a guide.\n\nUser: hello" }]
                }],
                "safetySettings": [{
                    "category": "HARM_CATEGORY_HARASSMENT",
                    "threshold": "BLOCK_MEDIUM_AND_ABOVE"
                }],
                "generationConfig": {
                    "temperature": 0.7,
                    "topP": 0.8,
                    "topK": 40,
                    "maxOutputTokens": 2048
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .generate("You are a guide.", "hello", "k")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn permission_denied_is_recoverable_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "status": "PERMISSION_DENIED", "message": "key revoked" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("p", "t", "bad-key").await.unwrap_err();
        assert!(err.is_recoverable_auth());
        assert!(matches!(
            err,
            GenerationError::Rejected { ref status, .. } if status == "PERMISSION_DENIED"
        ));
    }

    #[tokio::test]
    async fn invalid_argument_is_recoverable_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "status": "INVALID_ARGUMENT", "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("p", "t", "bad-key").await.unwrap_err();
        assert!(err.is_recoverable_auth());
    }

    #[tokio::test]
    async fn other_statuses_are_not_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "status": "RESOURCE_EXHAUSTED", "message": "quota" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("p", "t", "k").await.unwrap_err();
        assert!(!err.is_recoverable_auth());
    }

    #[tokio::test]
    async fn empty_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("p", "t", "k").await.unwrap_err();
        assert!(matches!(err, GenerationError::Malformed));
        assert!(!err.is_recoverable_auth());
    }

    #[tokio::test]
    async fn never_retries_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "status": "INTERNAL", "message": "boom" }
            })))
            .expect(1) // exactly one request, no retry
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _ = client.generate("p", "t", "k").await;
    }
}
