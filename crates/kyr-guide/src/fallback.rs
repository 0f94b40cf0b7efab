//! Fixed guidance returned when generation fails.
//!
//! The phrase lists are English regardless of the requested language.

use kyr_core::GuideContent;

pub const WHAT_TO_SAY: [&str; 5] = [
    "I am exercising my right to remain silent.",
    "I do not consent to any searches.",
    "Am I free to leave?",
    "I would like to speak to an attorney.",
    "I am not resisting, but I do not consent.",
];

pub const WHAT_NOT_TO_SAY: [&str; 5] = [
    "I have nothing to hide.",
    "Go ahead and search.",
    "I was just...",
    "That's not mine.",
    "I didn't know that was illegal.",
];

pub const GENERIC_RIGHTS: &str = "Your constitutional rights remain the same regardless of the \
situation. You have the right to remain silent, the right to refuse searches, and the right to \
an attorney. Stay calm, be respectful, and clearly state your rights.";

pub fn fallback_title(scenario: &str, state: &str) -> String {
    format!("{scenario} Rights in {state}")
}

/// Model answered, but not with parseable JSON: keep its text as the body.
pub fn with_raw_text(state: &str, scenario: &str, raw: &str) -> GuideContent {
    build(state, scenario, raw.to_string())
}

/// No usable answer at all.
pub fn generic(state: &str, scenario: &str) -> GuideContent {
    build(state, scenario, GENERIC_RIGHTS.to_string())
}

fn build(state: &str, scenario: &str, content: String) -> GuideContent {
    GuideContent {
        title: fallback_title(scenario, state),
        content,
        what_to_say: WHAT_TO_SAY.iter().map(|s| s.to_string()).collect(),
        what_not_to_say: WHAT_NOT_TO_SAY.iter().map(|s| s.to_string()).collect(),
        key_rights: None,
    }
}
