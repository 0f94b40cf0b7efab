use kyr_core::GuideContent;
use serde::de::DeserializeOwned;

use crate::StateGuideContent;

/// Parse model output as a guide. Any JSON object is accepted; missing keys
/// come back empty.
pub fn parse_guide_content(raw: &str) -> Result<GuideContent, serde_json::Error> {
    parse_object(raw)
}

pub fn parse_state_guide(raw: &str) -> Result<StateGuideContent, serde_json::Error> {
    parse_object(raw)
}

/// The whole answer must be the object, optionally inside one markdown code
/// fence. Objects embedded in prose are not picked out.
fn parse_object<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw.trim()))
}

/// "```json\n{..}\n```" -> "{..}". Anything else comes back unchanged.
fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };
    match body.split_once('\n') {
        Some((info, inner)) if !info.contains('{') => inner.trim(),
        _ => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_exact_json() {
        let content = parse_guide_content(
            r#"{"title":"T","content":"C","whatToSay":["a"],"whatNotToSay":["b"]}"#,
        )
        .unwrap();
        assert_eq!(content.title, "T");
        assert_eq!(content.content, "C");
        assert_eq!(content.what_to_say, vec!["a"]);
        assert_eq!(content.what_not_to_say, vec!["b"]);
    }

    #[test]
    fn test_parses_fenced_json() {
        let raw = "```json\n{\"title\":\"Fenced\",\"content\":\"x\"}\n```";
        assert_eq!(parse_guide_content(raw).unwrap().title, "Fenced");
    }

    #[test]
    fn test_object_inside_prose_fails() {
        let raw = r#"I cannot give legal advice. Metadata: {"disclaimer":"general info"}"#;
        assert!(parse_guide_content(raw).is_err());
        assert!(parse_state_guide(raw).is_err());
    }

    #[test]
    fn test_fence_followed_by_prose_fails() {
        let raw = "```json\n{\"title\":\"T\"}\n```\nHope this helps!";
        assert!(parse_guide_content(raw).is_err());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```{}```"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("```json\n{}"), "```json\n{}");
    }

    #[test]
    fn test_empty_object_parses_with_empty_fields() {
        let content = parse_guide_content("{}").unwrap();
        assert!(content.title.is_empty());
        assert!(content.what_to_say.is_empty());
    }

    #[test]
    fn test_plain_text_fails() {
        assert!(parse_guide_content("hola").is_err());
    }

    #[test]
    fn test_wrong_field_type_fails() {
        assert!(parse_guide_content(r#"{"whatToSay":"just one"}"#).is_err());
    }

    #[test]
    fn test_bare_string_json_fails() {
        assert!(parse_guide_content("\"text\"").is_err());
    }

    #[test]
    fn test_parses_state_guide() {
        let guide = parse_state_guide(
            r#"{"keyRights":["k"],"whatToSay":["s"],"whatNotToSay":["n"],"stateSpecific":"Stop and identify applies"}"#,
        )
        .unwrap();
        assert_eq!(guide.key_rights, vec!["k"]);
        assert_eq!(guide.state_specific, serde_json::json!("Stop and identify applies"));
    }
}
