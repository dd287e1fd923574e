//! Runtime configuration: remote endpoints and model selection.
//!
//! Loaded from an optional TOML file under the platform config directory,
//! with environment variable overrides on top. Every field has a working
//! default so a fresh install runs without any config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Shared fallback API key used when no key has been persisted yet.
/// Overridable at runtime through `GEMINI_API_KEY`.
const FALLBACK_API_KEY: &str = "AIzaSy-sahayak-shared-demo-key";

/// Endpoint and model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Gemini API.
    pub gemini_base_url: String,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Translation endpoint (LibreTranslate-compatible).
    pub translate_url: String,
    /// Remote text-to-speech fallback endpoint.
    pub tts_url: String,
    /// Per-request timeout for all remote calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            translate_url: "https://libretranslate.com/translate".to_string(),
            tts_url: "http://localhost:5000/api/tts".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration. Explicit path wins; otherwise the platform
    /// config file is read if present, else defaults. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::read_file(p)?,
            None => match Self::default_config_path() {
                Some(p) if p.exists() => Self::read_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Platform config file location (`<config dir>/sahayak/config.toml`).
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sahayak")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Platform location for the persisted preferences file.
    pub fn default_prefs_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sahayak")
            .map(|dirs| dirs.config_dir().join("preferences.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SAHAYAK_GEMINI_BASE_URL") {
            self.gemini_base_url = url;
        }
        if let Ok(model) = std::env::var("SAHAYAK_GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if let Ok(url) = std::env::var("SAHAYAK_TRANSLATE_URL") {
            self.translate_url = url;
        }
        if let Ok(url) = std::env::var("SAHAYAK_TTS_URL") {
            self.tts_url = url;
        }
    }
}

/// The built-in API key used when the preferences store has none.
pub fn fallback_api_key() -> String {
    std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| FALLBACK_API_KEY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert!(config.gemini_base_url.starts_with("https://"));
        assert!(!config.gemini_model.is_empty());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gemini_model = \"gemini-exp\"\ntranslate_url = \"http://translate.local\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.gemini_model, "gemini-exp");
        assert_eq!(config.translate_url, "http://translate.local");
        // Unspecified fields keep their defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gemini_model = [not toml").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn fallback_key_is_never_empty() {
        assert!(!fallback_api_key().is_empty());
    }
}
