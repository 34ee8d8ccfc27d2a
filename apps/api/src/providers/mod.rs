//! Text provider configuration — the typed view of `text_providers.yaml`.
//!
//! Every key in the document is optional. Missing keys resolve to the
//! built-in Gemini defaults at the point of use, one field at a time, so a
//! document that only overrides `model` still gets the default temperature
//! and token limit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::llm_client::GEMINI_PROVIDER_TYPE;

pub const DEFAULT_PROVIDER: &str = "google_gemini";
pub const DEFAULT_PROVIDER_TYPE: &str = GEMINI_PROVIDER_TYPE;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 65535;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read provider config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse provider config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level provider document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub active_provider: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

/// Settings for one named provider. `api_key` and `base_url` override the
/// environment credentials and the backend's public endpoint respectively.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub provider_type: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// The document used when no `text_providers.yaml` exists.
    pub fn builtin_default() -> Self {
        let settings = ProviderSettings {
            provider_type: Some(DEFAULT_PROVIDER_TYPE.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            api_key: None,
            base_url: None,
        };

        Self {
            active_provider: Some(DEFAULT_PROVIDER.to_string()),
            providers: HashMap::from([(DEFAULT_PROVIDER.to_string(), settings)]),
        }
    }

    pub fn active_provider(&self) -> &str {
        self.active_provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Settings of the active provider. An active provider with no entry in
    /// `providers` behaves like an entry with every key missing.
    pub fn active_settings(&self) -> ProviderSettings {
        self.providers
            .get(self.active_provider())
            .cloned()
            .unwrap_or_default()
    }
}

impl ProviderSettings {
    pub fn provider_type(&self) -> &str {
        self.provider_type.as_deref().unwrap_or(DEFAULT_PROVIDER_TYPE)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)
    }
}

/// Loads the provider document at `path`, or the built-in default when the
/// file does not exist. An empty document is treated as having no keys.
pub fn load_provider_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    if !path.exists() {
        info!(config_path = ?path, "Provider config not found, using built-in default");
        return Ok(ProviderConfig::builtin_default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| {
        error!(error = ?source, config_path = ?path, "Failed to read provider config");
        ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if content.trim().is_empty() {
        return Ok(ProviderConfig::default());
    }

    let parsed: Option<ProviderConfig> = serde_yaml::from_str(&content).map_err(|source| {
        error!(error = ?source, config_path = ?path, "Failed to parse provider config");
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let config = parsed.unwrap_or_default();
    info!(
        config_path = ?path,
        active_provider = config.active_provider(),
        providers = config.providers.len(),
        "Loaded provider config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_provider_config(&dir.path().join("text_providers.yaml")).unwrap();

        assert_eq!(config.active_provider(), "google_gemini");
        let settings = config.active_settings();
        assert_eq!(settings.provider_type(), "google_gemini");
        assert_eq!(settings.model(), "gemini-2.0-flash-exp");
        assert_eq!(settings.temperature(), 1.0);
        assert_eq!(settings.max_output_tokens(), 65535);
    }

    #[test]
    fn test_full_document_is_loaded() {
        let file = write_config(
            r#"
active_provider: my_openai
providers:
  my_openai:
    type: openai_compatible
    model: gpt-4o
    temperature: 0.7
    max_output_tokens: 8000
    base_url: https://llm.internal/v1
  google_gemini:
    type: google_gemini
    model: gemini-2.5-pro
"#,
        );

        let config = load_provider_config(file.path()).unwrap();
        assert_eq!(config.active_provider(), "my_openai");
        assert_eq!(config.providers.len(), 2);

        let settings = config.active_settings();
        assert_eq!(settings.provider_type(), "openai_compatible");
        assert_eq!(settings.model(), "gpt-4o");
        assert_eq!(settings.temperature(), 0.7);
        assert_eq!(settings.max_output_tokens(), 8000);
        assert_eq!(settings.base_url.as_deref(), Some("https://llm.internal/v1"));
    }

    #[test]
    fn test_partial_settings_fall_back_per_field() {
        let file = write_config(
            r#"
active_provider: google_gemini
providers:
  google_gemini:
    model: gemini-2.5-flash
"#,
        );

        let settings = load_provider_config(file.path()).unwrap().active_settings();
        assert_eq!(settings.model(), "gemini-2.5-flash");
        assert_eq!(settings.provider_type(), DEFAULT_PROVIDER_TYPE);
        assert_eq!(settings.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(settings.max_output_tokens(), DEFAULT_MAX_OUTPUT_TOKENS);
    }

    #[test]
    fn test_missing_active_provider_key_uses_default_name() {
        let file = write_config(
            r#"
providers:
  google_gemini:
    temperature: 0.2
"#,
        );

        let config = load_provider_config(file.path()).unwrap();
        assert_eq!(config.active_provider(), "google_gemini");
        assert_eq!(config.active_settings().temperature(), 0.2);
    }

    #[test]
    fn test_active_provider_without_entry_resolves_to_defaults() {
        let file = write_config("active_provider: nowhere\n");

        let settings = load_provider_config(file.path()).unwrap().active_settings();
        assert_eq!(settings, ProviderSettings::default());
        assert_eq!(settings.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_empty_document_has_no_keys() {
        let file = write_config("\n   \n");

        let config = load_provider_config(file.path()).unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.active_provider(), DEFAULT_PROVIDER);
    }

    #[test]
    fn test_integer_temperature_is_accepted() {
        let file = write_config(
            r#"
providers:
  google_gemini:
    temperature: 1
"#,
        );

        let settings = load_provider_config(file.path()).unwrap().active_settings();
        assert_eq!(settings.temperature(), 1.0);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let file = write_config("providers: [unclosed\n");

        let err = load_provider_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let file = write_config("providers: just-a-string\n");

        assert!(load_provider_config(file.path()).is_err());
    }
}
