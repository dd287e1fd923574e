//! Assistant persona configurations.
//!
//! Each mode pairs a system prompt with display metadata. The set is static
//! configuration consumed by the session engine; the engine never mutates a
//! mode. Selecting a new mode resets the session except for the persisted
//! language and API key.

use serde::{Deserialize, Serialize};

/// Built-in persona kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    Religious,
    Wellness,
    Information,
    Shopping,
}

impl ModeKind {
    /// URL/CLI slug for the mode.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Religious => "religious",
            Self::Wellness => "wellness",
            Self::Information => "information",
            Self::Shopping => "shopping",
        }
    }

    pub fn all() -> &'static [ModeKind] {
        &[
            Self::Religious,
            Self::Wellness,
            Self::Information,
            Self::Shopping,
        ]
    }
}

/// A persona the user can talk to.
#[derive(Debug, Clone)]
pub struct ModeConfig {
    pub kind: ModeKind,
    pub name: String,
    /// Opaque display token (hex color) passed through to the UI.
    pub color: String,
    pub system_prompt: String,
}

impl ModeConfig {
    /// The built-in configuration for a persona kind.
    pub fn builtin(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Religious => Self {
                kind,
                name: "Religious Companion".to_string(),
                color: "#8B5CF6".to_string(),
                system_prompt: "You are a religious companion for senior citizens. \
                     Engage warmly in discussions about faith, share spiritual \
                     teachings across traditions, and offer comfort. Keep answers \
                     short, respectful, and easy to follow."
                    .to_string(),
            },
            ModeKind::Wellness => Self {
                kind,
                name: "Wellness Guide".to_string(),
                color: "#34D399".to_string(),
                system_prompt: "You are a wellness guide for senior citizens. Give \
                     practical guidance on gentle exercise, diet, sleep, and general \
                     wellbeing. Use simple language, avoid medical jargon, and remind \
                     the user to consult a doctor for anything serious."
                    .to_string(),
            },
            ModeKind::Information => Self {
                kind,
                name: "Information Assistant".to_string(),
                color: "#3B82F6".to_string(),
                system_prompt: "You are an information assistant for senior citizens. \
                     Answer questions about government schemes, pensions, local \
                     resources, and everyday topics in short, clear sentences."
                    .to_string(),
            },
            ModeKind::Shopping => Self {
                kind,
                name: "Shopping Helper".to_string(),
                color: "#F97316".to_string(),
                system_prompt: "You are a shopping assistant for senior citizens. Help \
                     the user order food, groceries, medicines, and other items from \
                     online services. Walk through each step slowly and confirm before \
                     anything is ordered."
                    .to_string(),
            },
        }
    }

    /// Resolve a mode from its slug. Unknown slugs fall back to the
    /// information assistant, matching the product's routing behavior.
    pub fn from_slug(slug: &str) -> Self {
        let kind = ModeKind::all()
            .iter()
            .copied()
            .find(|k| k.slug().eq_ignore_ascii_case(slug))
            .unwrap_or(ModeKind::Information);
        Self::builtin(kind)
    }
}
