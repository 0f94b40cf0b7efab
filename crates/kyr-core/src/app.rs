//! Application state.
//!
//! `AppState` is a plain value. Every update consumes the current state and
//! returns the next one, so concurrent callers serialize updates however they
//! like (a mutex in the server) without the state itself holding locks.

use serde::Serialize;

use crate::rights::static_guide;
use crate::tiers::{FREE_ENCOUNTER_LIMIT, PREMIUM_TIER_ID};
use crate::{EncounterLog, Guide, Language};

/// Encounters shown in the "recent" list.
pub const RECENT_ENCOUNTERS: usize = 3;

/// Free users see the upgrade prompt from this many encounters on.
pub const UPGRADE_PROMPT_AT: usize = 2;

/// Identifies one guide request. Only the most recently issued token may
/// install its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideApply {
    Applied,
    /// A newer request or selection change superseded this response.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingToggle {
    Started,
    Stopped,
    NeedsSubscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterRecord {
    Recorded,
    /// Logs are only accepted while a recording is active.
    NotRecording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSave {
    Saved,
    NoGuide,
    NeedsSubscription,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    selected_state: Option<String>,
    language: Language,
    current_guide: Option<Guide>,
    is_recording: bool,
    is_premium: bool,
    /// Newest first.
    encounters: Vec<EncounterLog>,
    #[serde(skip)]
    latest_request: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_state(&self) -> Option<&str> {
        self.selected_state.as_deref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn current_guide(&self) -> Option<&Guide> {
        self.current_guide.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn encounters(&self) -> &[EncounterLog] {
        &self.encounters
    }

    pub fn recent_encounters(&self) -> &[EncounterLog] {
        let n = self.encounters.len().min(RECENT_ENCOUNTERS);
        &self.encounters[..n]
    }

    pub fn shows_upgrade_prompt(&self) -> bool {
        !self.is_premium && self.encounters.len() >= UPGRADE_PROMPT_AT
    }

    /// Select a state. Outstanding guide requests become stale, and the static
    /// guide is installed when the state has one.
    pub fn select_state(mut self, state: impl Into<String>) -> Self {
        let state = state.into();
        if self
            .current_guide
            .as_ref()
            .is_some_and(|g| !g.state.eq_ignore_ascii_case(&state))
        {
            self.current_guide = None;
        }
        self.selected_state = Some(state);
        self.latest_request += 1;
        self.refresh_static_guide()
    }

    /// Go back to the state picker. The last guide stays visible.
    pub fn clear_state(mut self) -> Self {
        self.selected_state = None;
        self
    }

    pub fn select_language(mut self, language: Language) -> Self {
        if language != self.language {
            self.language = language;
            self.latest_request += 1;
        }
        self.refresh_static_guide()
    }

    /// Issue a token for a guide request about to be sent.
    pub fn begin_guide_request(mut self) -> (Self, RequestToken) {
        self.latest_request += 1;
        let token = RequestToken(self.latest_request);
        (self, token)
    }

    /// Install a generated guide if `token` is still the latest request.
    pub fn apply_guide(mut self, token: RequestToken, guide: Guide) -> (Self, GuideApply) {
        if token.0 != self.latest_request {
            tracing::debug!(
                token = token.0,
                latest = self.latest_request,
                "discarding stale guide response"
            );
            return (self, GuideApply::Stale);
        }
        self.current_guide = Some(guide);
        (self, GuideApply::Applied)
    }

    /// Start or stop recording. Free users at the encounter limit cannot start.
    pub fn toggle_recording(mut self) -> (Self, RecordingToggle) {
        if self.is_recording {
            self.is_recording = false;
            return (self, RecordingToggle::Stopped);
        }
        if !self.is_premium && self.encounters.len() >= FREE_ENCOUNTER_LIMIT {
            return (self, RecordingToggle::NeedsSubscription);
        }
        self.is_recording = true;
        (self, RecordingToggle::Started)
    }

    /// Keep a saved or shared encounter and end the recording. Without an
    /// active recording the log is rejected, so the free-tier check in
    /// [`AppState::toggle_recording`] cannot be skipped.
    pub fn record_encounter(mut self, log: EncounterLog) -> (Self, EncounterRecord) {
        if !self.is_recording {
            return (self, EncounterRecord::NotRecording);
        }
        if log.shared {
            tracing::info!(id = %log.id, "sharing encounter");
        }
        self.encounters.insert(0, log);
        self.is_recording = false;
        (self, EncounterRecord::Recorded)
    }

    /// Apply a subscription choice. Only the premium tier changes anything.
    pub fn subscribe(mut self, tier_id: &str) -> Self {
        if tier_id == PREMIUM_TIER_ID {
            self.is_premium = true;
        }
        self
    }

    pub fn save_guide(&self) -> GuideSave {
        if !self.is_premium {
            return GuideSave::NeedsSubscription;
        }
        match &self.current_guide {
            Some(guide) => {
                tracing::info!(id = %guide.id, "guide saved");
                GuideSave::Saved
            }
            None => GuideSave::NoGuide,
        }
    }

    fn refresh_static_guide(mut self) -> Self {
        if let Some(guide) = self
            .selected_state
            .as_deref()
            .and_then(|s| static_guide(s, self.language))
        {
            self.current_guide = Some(guide);
        }
        self
    }
}
