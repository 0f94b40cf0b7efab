pub mod app;
pub mod encounter;
mod error;
pub mod location;
pub mod rights;
pub mod settings;
pub mod states;
pub mod tiers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use error::{CoreError, CoreResult};
pub use settings::{ai_configured, AiSettings};

/// User id stamped on encounter logs until accounts exist.
pub const PLACEHOLDER_USER_ID: &str = "current_user";

// --- Types ---

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Name shown in the language picker.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::En => "🇺🇸",
            Language::Es => "🇪🇸",
        }
    }

    /// English name of the language, used inside model instructions.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            _ => Err(CoreError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Guidance as returned by the text-generation service.
///
/// Every field defaults when absent so that any JSON object parses; the
/// shape is not validated beyond that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuideContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub what_to_say: Vec<String>,
    #[serde(default)]
    pub what_not_to_say: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_rights: Option<Vec<String>>,
}

/// A guide as held in app state. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: String,
    pub state: String,
    pub title: String,
    pub content: String,
    pub language: Language,
    pub what_to_say: Vec<String>,
    pub what_not_to_say: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_rights: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Guide {
    /// Wrap generated content for a state and language.
    pub fn from_content(state: &str, language: Language, content: GuideContent) -> Self {
        Self {
            id: format!("{}-{}", guide_id(state, language), generate_id()),
            state: state.to_string(),
            title: content.title,
            content: content.content,
            language,
            what_to_say: content.what_to_say,
            what_not_to_say: content.what_not_to_say,
            key_rights: content.key_rights,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLog {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub notes: String,
    pub shared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_version: Option<String>,
}

impl EncounterLog {
    /// Build a log entry. Notes are trimmed and must not be empty.
    pub fn new(
        notes: &str,
        location: Option<String>,
        shared: bool,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(CoreError::EmptyNotes);
        }
        Ok(Self {
            id: generate_id(),
            user_id: PLACEHOLDER_USER_ID.to_string(),
            timestamp,
            location: location.filter(|l| !l.trim().is_empty()),
            notes: notes.to_string(),
            shared,
            guide_version: None,
        })
    }
}

// --- Helpers ---

/// Random unique identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Stable guide identifier for a state/language pair, e.g. "new-york-es".
pub fn guide_id(state: &str, language: Language) -> String {
    let slug: Vec<String> = state
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect();
    format!("{}-{}", slug.join("-"), language.code())
}

/// Cut `text` to `max_chars` characters, appending "..." when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Display form used in encounter listings, e.g. "Oct 19, 2026, 02:05 PM".
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}
