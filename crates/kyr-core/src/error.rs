/// Errors raised by the core model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unsupported language code: {0} (expected \"en\" or \"es\")")]
    UnsupportedLanguage(String),
    #[error("encounter notes cannot be empty")]
    EmptyNotes,
    #[error("unknown subscription tier: {0}")]
    UnknownTier(String),
    #[error("could not resolve a home directory for settings")]
    NoHomeDir,
    #[error("failed to write settings: {0}")]
    SettingsWrite(std::io::Error),
    #[error("failed to serialize settings: {0}")]
    SettingsSerialization(serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
