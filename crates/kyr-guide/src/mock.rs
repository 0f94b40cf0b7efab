use async_trait::async_trait;
use std::sync::Mutex;

use crate::engine::{ChatRequest, EngineError, TextService};

enum Script {
    Reply(String),
    Empty,
    Fail(String),
}

/// Answers every request the same way and records what was sent.
pub struct ScriptedService {
    script: Script,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedService {
    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    /// Fail every call. Errors other than `EmptyCompletion` surface as `Chat`
    /// carrying the original message.
    pub fn failing(error: EngineError) -> Self {
        match error {
            EngineError::EmptyCompletion => Self::new(Script::Empty),
            other => Self::new(Script::Fail(other.to_string())),
        }
    }

    fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextService for ScriptedService {
    async fn complete(&self, request: &ChatRequest) -> Result<String, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Empty => Err(EngineError::EmptyCompletion),
            Script::Fail(msg) => Err(EngineError::Chat(msg.clone())),
        }
    }
}
