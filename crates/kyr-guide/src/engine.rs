use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use kyr_core::AiSettings;

/// OpenRouter speaks the OpenAI chat-completions dialect.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1/";

/// One system + user exchange with output bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("build LLM: {0}")]
    Build(String),
    #[error("chat: {0}")]
    Chat(String),
    #[error("LLM returned no text")]
    EmptyCompletion,
}

/// The external text-generation service.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Text of the first completion. Missing or zero-length output is
    /// `EmptyCompletion`; whitespace is returned as-is.
    async fn complete(&self, request: &ChatRequest) -> Result<String, EngineError>;
}

fn map_backend(provider: &str) -> Result<(LLMBackend, Option<&'static str>), EngineError> {
    match provider {
        "openrouter" => Ok((LLMBackend::OpenAI, Some(OPENROUTER_BASE_URL))),
        "openai" => Ok((LLMBackend::OpenAI, None)),
        "anthropic" => Ok((LLMBackend::Anthropic, None)),
        "google" => Ok((LLMBackend::Google, None)),
        "ollama" => Ok((LLMBackend::Ollama, None)),
        "groq" => Ok((LLMBackend::Groq, None)),
        "mistral" => Ok((LLMBackend::Mistral, None)),
        "deepseek" => Ok((LLMBackend::DeepSeek, None)),
        other => Err(EngineError::UnknownProvider(other.to_string())),
    }
}

/// [`TextService`] backed by the `llm` crate. A provider is built per request
/// so temperature and output bounds can differ between operations.
#[derive(Debug, Clone)]
pub struct LlmService {
    settings: AiSettings,
}

impl LlmService {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }
}

#[async_trait]
impl TextService for LlmService {
    async fn complete(&self, request: &ChatRequest) -> Result<String, EngineError> {
        let (backend, default_url) = map_backend(&self.settings.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .system(&request.system)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }
        if let Some(url) = self.settings.base_url.as_deref().or(default_url) {
            builder = builder.base_url(url);
        }

        let llm = builder
            .build()
            .map_err(|e| EngineError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(&request.user).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| EngineError::Chat(e.to_string()))?;

        completion_text(response.text())
    }
}

fn completion_text(text: Option<String>) -> Result<String, EngineError> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(EngineError::EmptyCompletion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_uses_openai_dialect() {
        let (backend, url) = map_backend("openrouter").unwrap();
        assert!(matches!(backend, LLMBackend::OpenAI));
        assert_eq!(url, Some(OPENROUTER_BASE_URL));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = map_backend("carrier-pigeon").expect_err("unknown provider");
        assert!(matches!(err, EngineError::UnknownProvider(p) if p == "carrier-pigeon"));
    }

    #[test]
    fn test_only_missing_or_zero_length_text_is_empty() {
        assert!(matches!(completion_text(None), Err(EngineError::EmptyCompletion)));
        assert!(matches!(
            completion_text(Some(String::new())),
            Err(EngineError::EmptyCompletion)
        ));
        assert_eq!(completion_text(Some(" \n".into())).unwrap(), " \n");
    }

    #[tokio::test]
    async fn test_unknown_provider_fails_before_any_request() {
        let service = LlmService::new(AiSettings {
            provider: "nope".into(),
            ..Default::default()
        });
        let request = ChatRequest {
            system: "s".into(),
            user: "u".into(),
            temperature: 0.0,
            max_tokens: 1,
        };
        let err = service.complete(&request).await.expect_err("should fail");
        assert!(matches!(err, EngineError::UnknownProvider(_)));
    }
}
