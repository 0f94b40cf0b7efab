//! AI provider settings.
//!
//! Settings live in `~/.kyr/settings.json` and are resolved once at startup,
//! with environment variables taking precedence over the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

pub const DEFAULT_PROVIDER: &str = "openrouter";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Checked in order; the first non-empty value wins.
const API_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "OPENROUTER_API_KEY"];
const PROVIDER_VAR: &str = "KYR_PROVIDER";
const MODEL_VAR: &str = "KYR_MODEL";
const BASE_URL_VAR: &str = "KYR_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

impl AiSettings {
    /// Overlay values from `lookup` (normally the process environment).
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|name| non_empty(*name)) {
            self.api_key = key;
        }
        if let Some(provider) = non_empty(PROVIDER_VAR) {
            self.provider = provider;
        }
        if let Some(model) = non_empty(MODEL_VAR) {
            self.model = model;
        }
        if let Some(url) = non_empty(BASE_URL_VAR) {
            self.base_url = Some(url);
        }
        self
    }
}

/// Resolve the settings directory (~/.kyr/).
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kyr"))
}

fn settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("settings.json"))
}

/// Read settings from disk, falling back to defaults when missing or unreadable.
pub fn read_settings() -> AiSettings {
    match settings_path() {
        Some(path) => read_settings_from(&path),
        None => AiSettings::default(),
    }
}

pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            AiSettings::default()
        }
    }
}

pub fn write_settings(settings: &AiSettings) -> CoreResult<()> {
    let path = settings_path().ok_or(CoreError::NoHomeDir)?;
    write_settings_to(&path, settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> CoreResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(CoreError::SettingsWrite)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(CoreError::SettingsSerialization)?;
    fs::write(path, json).map_err(CoreError::SettingsWrite)
}

/// Settings from disk with the process environment applied on top.
pub fn resolve_settings() -> AiSettings {
    read_settings().with_env(|name| std::env::var(name).ok())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_target_openrouter() {
        let settings = AiSettings::default();
        assert_eq!(settings.provider, "openrouter");
        assert_eq!(settings.model, "google/gemini-2.0-flash-001");
        assert!(!ai_configured(&settings));
    }

    #[test]
    fn test_openai_key_takes_precedence() {
        let settings = AiSettings::default().with_env(env(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENROUTER_API_KEY", "sk-router"),
        ]));
        assert_eq!(settings.api_key, "sk-openai");
        assert!(ai_configured(&settings));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let settings = AiSettings::default().with_env(env(&[
            ("OPENAI_API_KEY", "  "),
            ("OPENROUTER_API_KEY", "sk-router"),
            ("KYR_MODEL", ""),
        ]));
        assert_eq!(settings.api_key, "sk-router");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_env_overrides_provider_model_and_url() {
        let settings = AiSettings::default().with_env(env(&[
            ("KYR_PROVIDER", "ollama"),
            ("KYR_MODEL", "llama3"),
            ("KYR_BASE_URL", "http://localhost:11434"),
        ]));
        assert_eq!(settings.provider, "ollama");
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:11434"));
        assert!(ai_configured(&settings));
    }

    #[test]
    fn test_settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AiSettings {
            provider: "openai".into(),
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            base_url: None,
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"apiKey":"sk-file"}"#).unwrap();
        let settings = read_settings_from(&path);
        assert_eq!(settings.api_key, "sk-file");
        assert_eq!(settings.provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(read_settings_from(&path), AiSettings::default());
    }
}
