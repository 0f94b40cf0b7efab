pub mod engine;
pub mod fallback;
mod parse;
mod prompt;

#[cfg(test)]
mod mock;

use serde::{Deserialize, Serialize};
use std::fmt;

use kyr_core::{GuideContent, Language};

pub use engine::{ChatRequest, EngineError, LlmService, TextService};

/// Why a guide came from the fallback instead of the model.
#[derive(Debug, Clone, PartialEq)]
pub enum DegradedReason {
    /// The request failed in transport or at the provider.
    Transport(String),
    /// The provider answered with no text.
    EmptyCompletion,
    /// The answer was not a JSON object of the expected shape.
    MalformedOutput(String),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::Transport(e) => write!(f, "service error: {e}"),
            DegradedReason::EmptyCompletion => f.write_str("empty completion"),
            DegradedReason::MalformedOutput(e) => write!(f, "malformed output: {e}"),
        }
    }
}

/// Result of [`generate_guide`]. Both variants carry complete content.
#[derive(Debug, Clone, PartialEq)]
pub enum GuideOutcome {
    Live(GuideContent),
    Degraded {
        content: GuideContent,
        reason: DegradedReason,
    },
}

impl GuideOutcome {
    pub fn content(&self) -> &GuideContent {
        match self {
            GuideOutcome::Live(content) | GuideOutcome::Degraded { content, .. } => content,
        }
    }

    pub fn into_content(self) -> GuideContent {
        match self {
            GuideOutcome::Live(content) | GuideOutcome::Degraded { content, .. } => content,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, GuideOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&DegradedReason> {
        match self {
            GuideOutcome::Live(_) => None,
            GuideOutcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Rights overview for a whole state, independent of scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateGuideContent {
    #[serde(default)]
    pub key_rights: Vec<String>,
    #[serde(default)]
    pub what_to_say: Vec<String>,
    #[serde(default)]
    pub what_not_to_say: Vec<String>,
    /// Free-form; models return a string, a list or an object here.
    #[serde(default)]
    pub state_specific: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to parse state guide: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Generate a guide for a state and scenario. Never fails: transport errors,
/// empty answers and unparseable answers all produce fallback content.
pub async fn generate_guide(
    service: &dyn TextService,
    state: &str,
    scenario: &str,
    language: Language,
) -> GuideOutcome {
    let request = prompt::guide_request(state, scenario, language);

    tracing::info!(state, scenario, %language, "requesting guide");

    let raw = match service.complete(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("guide generation failed: {e}");
            let reason = match e {
                EngineError::EmptyCompletion => DegradedReason::EmptyCompletion,
                other => DegradedReason::Transport(other.to_string()),
            };
            return GuideOutcome::Degraded {
                content: fallback::generic(state, scenario),
                reason,
            };
        }
    };

    tracing::debug!("raw guide output:\n{raw}");

    match parse::parse_guide_content(&raw) {
        Ok(content) => GuideOutcome::Live(content),
        Err(e) => {
            tracing::warn!("guide output was not valid JSON, using raw text: {e}");
            GuideOutcome::Degraded {
                content: fallback::with_raw_text(state, scenario, &raw),
                reason: DegradedReason::MalformedOutput(e.to_string()),
            }
        }
    }
}

/// Translate `text`. Returns it unchanged if the service fails.
pub async fn translate(service: &dyn TextService, text: &str, target: Language) -> String {
    match service.complete(&prompt::translate_request(text, target)).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::error!("translation failed: {e}");
            text.to_string()
        }
    }
}

/// Summarize encounter notes. Returns the notes unchanged if the service fails.
pub async fn summarize(service: &dyn TextService, notes: &str, location: Option<&str>) -> String {
    match service
        .complete(&prompt::summary_request(notes, location))
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("encounter summary failed: {e}");
            notes.to_string()
        }
    }
}

/// Generate a state-wide rights overview. Failures are returned so the caller
/// can fall back to the static table.
pub async fn generate_state_guide(
    service: &dyn TextService,
    state: &str,
    language: Language,
) -> Result<StateGuideContent, GuideError> {
    let raw = service
        .complete(&prompt::state_guide_request(state, language))
        .await?;
    tracing::debug!("raw state guide output:\n{raw}");
    Ok(parse::parse_state_guide(&raw)?)
}
