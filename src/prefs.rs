//! Persisted user preferences.
//!
//! Two values survive across sessions: the preferred conversation language
//! and the Gemini API key. The engine reads them once at initialization and
//! writes back whenever either changes; writes are last-write-wins since a
//! single session is the only writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::language::LanguageCode;

/// Port to the persisted preference store.
pub trait PreferencesStore: Send + Sync {
    fn preferred_language(&self) -> Option<LanguageCode>;
    fn set_preferred_language(&self, language: LanguageCode) -> Result<()>;
    fn gemini_api_key(&self) -> Option<String>;
    fn set_gemini_api_key(&self, key: &str) -> Result<()>;
}

// ── TOML file store ──────────────────────────────────────────────

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct PrefsFile {
    preferred_language: Option<String>,
    gemini_api_key: Option<String>,
}

/// Preferences persisted to a TOML file. The file is read once on open and
/// rewritten in full on every change.
pub struct TomlPreferences {
    path: PathBuf,
    cached: Mutex<PrefsFile>,
}

impl TomlPreferences {
    /// Open (or create) the preferences file at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let cached = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading preferences {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing preferences {}", path.display()))?
        } else {
            PrefsFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            cached: Mutex::new(cached),
        })
    }

    fn write(&self, prefs: &PrefsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(prefs).context("serializing preferences")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing preferences {}", self.path.display()))
    }
}

impl PreferencesStore for TomlPreferences {
    fn preferred_language(&self) -> Option<LanguageCode> {
        self.cached
            .lock()
            .preferred_language
            .as_deref()
            .and_then(LanguageCode::from_code)
    }

    fn set_preferred_language(&self, language: LanguageCode) -> Result<()> {
        let mut cached = self.cached.lock();
        cached.preferred_language = Some(language.code().to_string());
        self.write(&cached)
    }

    fn gemini_api_key(&self) -> Option<String> {
        self.cached.lock().gemini_api_key.clone()
    }

    fn set_gemini_api_key(&self, key: &str) -> Result<()> {
        let mut cached = self.cached.lock();
        cached.gemini_api_key = Some(key.to_string());
        self.write(&cached)
    }
}

// ── In-memory store ──────────────────────────────────────────────

/// Volatile store for tests and environments without a writable disk.
#[derive(Default)]
pub struct MemoryPreferences {
    inner: Mutex<PrefsFile>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store.
    pub fn seeded(language: Option<LanguageCode>, api_key: Option<&str>) -> Self {
        Self {
            inner: Mutex::new(PrefsFile {
                preferred_language: language.map(|l| l.code().to_string()),
                gemini_api_key: api_key.map(str::to_string),
            }),
        }
    }
}

impl PreferencesStore for MemoryPreferences {
    fn preferred_language(&self) -> Option<LanguageCode> {
        self.inner
            .lock()
            .preferred_language
            .as_deref()
            .and_then(LanguageCode::from_code)
    }

    fn set_preferred_language(&self, language: LanguageCode) -> Result<()> {
        self.inner.lock().preferred_language = Some(language.code().to_string());
        Ok(())
    }

    fn gemini_api_key(&self) -> Option<String> {
        self.inner.lock().gemini_api_key.clone()
    }

    fn set_gemini_api_key(&self, key: &str) -> Result<()> {
        self.inner.lock().gemini_api_key = Some(key.to_string());
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
