//! Language support for the conversation engine.
//!
//! Sahayak serves senior citizens across India: English plus the nine
//! Indian languages the product ships voices for. Codes follow ISO 639-1;
//! `tag()` carries the region subtag used when matching synthesis voices,
//! and `base_code()` strips it for the remote speech fallback.

use serde::{Deserialize, Serialize};

/// Languages the assistant can converse in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    En, // English
    Hi, // Hindi
    Bn, // Bengali
    Ta, // Tamil
    Te, // Telugu
    Mr, // Marathi
    Gu, // Gujarati
    Kn, // Kannada
    Ml, // Malayalam
    Pa, // Punjabi
}

impl LanguageCode {
    /// ISO 639-1 code, as sent to the translation service.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Bn => "bn",
            Self::Ta => "ta",
            Self::Te => "te",
            Self::Mr => "mr",
            Self::Gu => "gu",
            Self::Kn => "kn",
            Self::Ml => "ml",
            Self::Pa => "pa",
        }
    }

    /// BCP-47 tag with region, used when matching synthesis voices.
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en-IN",
            Self::Hi => "hi-IN",
            Self::Bn => "bn-IN",
            Self::Ta => "ta-IN",
            Self::Te => "te-IN",
            Self::Mr => "mr-IN",
            Self::Gu => "gu-IN",
            Self::Kn => "kn-IN",
            Self::Ml => "ml-IN",
            Self::Pa => "pa-IN",
        }
    }

    /// Subtag before the region, used by the remote speech fallback.
    pub fn base_code(self) -> &'static str {
        match self.tag().split_once('-') {
            Some((base, _)) => base,
            None => self.tag(),
        }
    }

    /// Human-readable language name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Bn => "Bengali",
            Self::Ta => "Tamil",
            Self::Te => "Telugu",
            Self::Mr => "Marathi",
            Self::Gu => "Gujarati",
            Self::Kn => "Kannada",
            Self::Ml => "Malayalam",
            Self::Pa => "Punjabi",
        }
    }

    /// Parse from a code string (case-insensitive). Accepts both bare
    /// codes (`hi`) and region-tagged forms (`hi-IN`, `hi_IN`).
    pub fn from_code(code: &str) -> Option<Self> {
        let base = code
            .split(['-', '_'])
            .next()
            .unwrap_or(code)
            .to_lowercase();
        match base.as_str() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "bn" => Some(Self::Bn),
            "ta" => Some(Self::Ta),
            "te" => Some(Self::Te),
            "mr" => Some(Self::Mr),
            "gu" => Some(Self::Gu),
            "kn" => Some(Self::Kn),
            "ml" => Some(Self::Ml),
            "pa" => Some(Self::Pa),
            _ => None,
        }
    }

    /// All supported languages.
    pub fn all() -> &'static [LanguageCode] {
        &[
            Self::En,
            Self::Hi,
            Self::Bn,
            Self::Ta,
            Self::Te,
            Self::Mr,
            Self::Gu,
            Self::Kn,
            Self::Ml,
            Self::Pa,
        ]
    }

    pub fn is_english(self) -> bool {
        self == Self::En
    }
}

// ── Tests ────────────────────────────────────────────────────────
