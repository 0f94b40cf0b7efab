//! Recording an encounter before it becomes an [`EncounterLog`].

use chrono::{DateTime, Utc};

use crate::location::PositionSource;
use crate::{truncate_text, CoreResult, EncounterLog};

/// Characters of notes shown in encounter listings.
pub const PREVIEW_CHARS: usize = 100;

/// Form state for an encounter being recorded.
#[derive(Debug, Clone, Default)]
pub struct EncounterDraft {
    recording: bool,
    started_at: Option<DateTime<Utc>>,
    location: Option<String>,
    notes: String,
}

impl EncounterDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording and try to capture the current position.
    pub fn start(&mut self, position: &dyn PositionSource) {
        self.recording = true;
        self.started_at = Some(Utc::now());
        match position.current_position() {
            Ok(coords) => self.location = Some(coords.to_string()),
            Err(e) => tracing::warn!("location not recorded: {e}"),
        }
    }

    pub fn stop(&mut self) {
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Save and share are only offered once there are notes.
    pub fn can_submit(&self) -> bool {
        !self.notes.trim().is_empty()
    }

    /// Produce a private log and reset the form.
    pub fn save(&mut self) -> CoreResult<EncounterLog> {
        let log = self.build(false)?;
        self.notes.clear();
        self.started_at = None;
        self.location = None;
        Ok(log)
    }

    /// Produce a shared log. The form is left as is.
    pub fn share(&self) -> CoreResult<EncounterLog> {
        self.build(true)
    }

    fn build(&self, shared: bool) -> CoreResult<EncounterLog> {
        EncounterLog::new(
            &self.notes,
            self.location.clone(),
            shared,
            self.started_at.unwrap_or_else(Utc::now),
        )
    }
}

/// Shortened notes for listings.
pub fn preview(notes: &str) -> String {
    truncate_text(notes, PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Coordinates, FixedPosition};
    use crate::CoreError;

    #[test]
    fn test_start_captures_time_and_location() {
        let mut draft = EncounterDraft::new();
        draft.start(&FixedPosition(Some(Coordinates { lat: 29.76, lng: -95.37 })));
        assert!(draft.is_recording());
        assert!(draft.started_at().is_some());
        assert_eq!(draft.location(), Some("29.760000, -95.370000"));
    }

    #[test]
    fn test_start_without_position_still_records() {
        let mut draft = EncounterDraft::new();
        draft.start(&FixedPosition(None));
        assert!(draft.is_recording());
        assert!(draft.location().is_none());
    }

    #[test]
    fn test_save_uses_start_time_and_resets_form() {
        let mut draft = EncounterDraft::new();
        draft.start(&FixedPosition(None));
        let started = draft.started_at().unwrap();
        draft.set_notes("  Officer asked for ID  ");
        draft.stop();

        let log = draft.save().unwrap();
        assert_eq!(log.notes, "Officer asked for ID");
        assert_eq!(log.timestamp, started);
        assert!(!log.shared);
        assert!(draft.notes().is_empty());
        assert!(draft.started_at().is_none());
    }

    #[test]
    fn test_share_marks_log_shared_and_keeps_form() {
        let mut draft = EncounterDraft::new();
        draft.set_notes("Stopped at checkpoint");
        draft.set_location("downtown");
        let log = draft.share().unwrap();
        assert!(log.shared);
        assert_eq!(log.location.as_deref(), Some("downtown"));
        assert_eq!(draft.notes(), "Stopped at checkpoint");
    }

    #[test]
    fn test_empty_notes_block_save_and_share() {
        let mut draft = EncounterDraft::new();
        draft.set_notes(" \n ");
        assert!(!draft.can_submit());
        assert!(matches!(draft.save(), Err(CoreError::EmptyNotes)));
        assert!(matches!(draft.share(), Err(CoreError::EmptyNotes)));
    }

    #[test]
    fn test_preview_truncates_long_notes() {
        let notes = "x".repeat(150);
        let shown = preview(&notes);
        assert_eq!(shown.len(), 103);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("brief"), "brief");
    }
}
