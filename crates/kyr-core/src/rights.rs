//! Hand-written rights summaries for states that ship without a model call.

use chrono::Utc;

use crate::{guide_id, states, Guide, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRights {
    pub key_rights: &'static [&'static str],
    pub what_to_say: &'static [&'static str],
    pub what_not_to_say: &'static [&'static str],
}

const CALIFORNIA: StateRights = StateRights {
    key_rights: &[
        "You have the right to remain silent",
        "You have the right to refuse searches without a warrant",
        "You have the right to ask if you are free to leave",
        "You have the right to record police interactions in public",
    ],
    what_to_say: &[
        "\"I am exercising my right to remain silent\"",
        "\"I do not consent to any searches\"",
        "\"Am I free to leave?\"",
        "\"I would like to speak to a lawyer\"",
    ],
    what_not_to_say: &[
        "Don't lie or provide false information",
        "Don't resist physically, even if you believe the stop is unlawful",
        "Don't argue about your rights on the scene",
        "Don't consent to searches",
    ],
};

const TEXAS: StateRights = StateRights {
    key_rights: &[
        "You have the right to remain silent",
        "You have the right to refuse consent to search",
        "You have the right to ask if you are being detained",
        "You have the right to record in public spaces",
    ],
    what_to_say: &[
        "\"I invoke my right to remain silent\"",
        "\"I do not consent to searches\"",
        "\"Am I being detained or am I free to go?\"",
        "\"I want to speak with an attorney\"",
    ],
    what_not_to_say: &[
        "Don't provide false identification",
        "Don't physically resist",
        "Don't argue or become confrontational",
        "Don't volunteer information",
    ],
};

/// Sample rights for a state, if it has any. Accepts names or postal codes.
pub fn sample_rights(state: &str) -> Option<&'static StateRights> {
    match states::find_state(state)? {
        "California" => Some(&CALIFORNIA),
        "Texas" => Some(&TEXAS),
        _ => None,
    }
}

/// Build the static guide for `state`. The table is English-only; `language`
/// is recorded on the guide as selected.
pub fn static_guide(state: &str, language: Language) -> Option<Guide> {
    let rights = sample_rights(state)?;
    let name = states::find_state(state)?;
    Some(Guide {
        id: guide_id(name, language),
        state: name.to_string(),
        title: format!("{name} Legal Rights Guide"),
        content: format!("Your rights in {name}"),
        language,
        what_to_say: to_owned(rights.what_to_say),
        what_not_to_say: to_owned(rights.what_not_to_say),
        key_rights: Some(to_owned(rights.key_rights)),
        created_at: Utc::now(),
    })
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_guide_for_california() {
        let guide = static_guide("California", Language::En).unwrap();
        assert_eq!(guide.id, "california-en");
        assert_eq!(guide.title, "California Legal Rights Guide");
        assert_eq!(guide.content, "Your rights in California");
        assert_eq!(guide.what_to_say.len(), 4);
        assert_eq!(guide.key_rights.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_static_guide_accepts_postal_code() {
        let guide = static_guide("tx", Language::Es).unwrap();
        assert_eq!(guide.state, "Texas");
        assert_eq!(guide.language, Language::Es);
        assert_eq!(guide.what_not_to_say[3], "Don't volunteer information");
    }

    #[test]
    fn test_no_static_guide_for_other_states() {
        assert!(static_guide("Ohio", Language::En).is_none());
        assert!(sample_rights("Narnia").is_none());
    }
}
