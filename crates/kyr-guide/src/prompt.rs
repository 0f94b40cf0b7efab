use kyr_core::Language;

use crate::engine::ChatRequest;

const GUIDE_TEMPERATURE: f32 = 0.3;
const GUIDE_MAX_TOKENS: u32 = 1000;
const STATE_GUIDE_MAX_TOKENS: u32 = 1500;
const TRANSLATE_TEMPERATURE: f32 = 0.1;
const TRANSLATE_MAX_TOKENS: u32 = 500;
const SUMMARY_TEMPERATURE: f32 = 0.2;
const SUMMARY_MAX_TOKENS: u32 = 500;

pub fn guide_system_prompt() -> &'static str {
    "You are a legal rights expert who provides clear, accurate, and practical guidance for \
citizens during legal encounters. Always emphasize constitutional rights and de-escalation."
}

pub fn guide_instruction(state: &str, scenario: &str, language: Language) -> String {
    format!(
        "Generate a legal rights guide for {state} state regarding {scenario}.\n\
Language: {language}\n\n\
Please provide:\n\
1. A clear title\n\
2. Brief overview of rights (2-3 paragraphs)\n\
3. 5 specific things TO SAY during an encounter\n\
4. 5 specific things NOT TO SAY during an encounter\n\n\
Keep it practical, mobile-friendly, and easy to understand during stressful situations.\n\
Focus on constitutional rights and state-specific laws.\n\n\
Format as JSON with keys: title, content, whatToSay (array), whatNotToSay (array)",
        language = language.english_name(),
    )
}

pub fn guide_request(state: &str, scenario: &str, language: Language) -> ChatRequest {
    ChatRequest {
        system: guide_system_prompt().to_string(),
        user: guide_instruction(state, scenario, language),
        temperature: GUIDE_TEMPERATURE,
        max_tokens: GUIDE_MAX_TOKENS,
    }
}

pub fn state_guide_request(state: &str, language: Language) -> ChatRequest {
    ChatRequest {
        system: "You are a legal rights expert who creates clear, actionable guidance for \
citizens during police encounters. Focus on constitutional rights and de-escalation."
            .to_string(),
        user: format!(
            "Generate a comprehensive legal rights guide for {state} in {language}.\n\n\
Include:\n\
1. Key constitutional rights during police encounters\n\
2. 5 specific \"what to say\" phrases\n\
3. 5 specific \"what NOT to say\" warnings\n\
4. State-specific laws and considerations\n\n\
Format as JSON with keys: keyRights, whatToSay, whatNotToSay, stateSpecific\n\n\
Keep language simple and actionable for high-stress situations.",
            language = language.english_name(),
        ),
        temperature: GUIDE_TEMPERATURE,
        max_tokens: STATE_GUIDE_MAX_TOKENS,
    }
}

pub fn translate_request(text: &str, target: Language) -> ChatRequest {
    ChatRequest {
        system: format!(
            "You are a professional translator specializing in legal content. Translate the \
following text to {} while maintaining legal accuracy and clarity.",
            target.english_name()
        ),
        user: text.to_string(),
        temperature: TRANSLATE_TEMPERATURE,
        max_tokens: TRANSLATE_MAX_TOKENS,
    }
}

pub fn summary_request(notes: &str, location: Option<&str>) -> ChatRequest {
    let mut user = format!("Create a summary of this encounter: {notes}");
    if let Some(loc) = location.filter(|l| !l.is_empty()) {
        user.push_str(" Location: ");
        user.push_str(loc);
    }
    ChatRequest {
        system: "You are a legal documentation assistant. Create a clear, factual summary of a \
police encounter based on user notes. Focus on key details, timeline, and relevant legal \
considerations."
            .to_string(),
        user,
        temperature: SUMMARY_TEMPERATURE,
        max_tokens: SUMMARY_MAX_TOKENS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_instruction_embeds_inputs() {
        let text = guide_instruction("Texas", "Traffic Stop", Language::Es);
        assert!(text.starts_with("Generate a legal rights guide for Texas state regarding Traffic Stop."));
        assert!(text.contains("Language: Spanish"));
        assert!(text.contains("whatToSay (array), whatNotToSay (array)"));
    }

    #[test]
    fn test_guide_request_is_low_temperature() {
        let req = guide_request("Ohio", "Police Encounter", Language::En);
        assert_eq!(req.temperature, 0.3);
        assert_eq!(req.max_tokens, 1000);
        assert!(req.system.contains("de-escalation"));
        assert!(req.user.contains("Language: English"));
    }

    #[test]
    fn test_translate_request_names_target() {
        let req = translate_request("Hello", Language::Es);
        assert!(req.system.contains("to Spanish"));
        assert_eq!(req.user, "Hello");
        assert_eq!(req.max_tokens, 500);
    }

    #[test]
    fn test_summary_request_appends_location() {
        let req = summary_request("Stopped for speeding", Some("Austin"));
        assert_eq!(
            req.user,
            "Create a summary of this encounter: Stopped for speeding Location: Austin"
        );
        let req = summary_request("Stopped", None);
        assert_eq!(req.user, "Create a summary of this encounter: Stopped");
    }

    #[test]
    fn test_state_guide_request_asks_for_state_specifics() {
        let req = state_guide_request("Oregon", Language::En);
        assert!(req.user.contains("keyRights, whatToSay, whatNotToSay, stateSpecific"));
        assert_eq!(req.max_tokens, 1500);
    }
}
