use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::Credentials;

const DEFAULT_TEXT_PROVIDERS_PATH: &str = "text_providers.yaml";
const DEFAULT_OUTLINE_PROMPT_PATH: &str = "prompts/outline_prompt.txt";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Provider settings live in `text_providers.yaml` and are re-read by every
/// outline generator, so only paths and process-wide knobs are held here.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub text_providers_path: PathBuf,
    pub outline_prompt_path: PathBuf,
    pub credentials: Credentials,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            text_providers_path: path_env("TEXT_PROVIDERS_PATH", DEFAULT_TEXT_PROVIDERS_PATH),
            outline_prompt_path: path_env("OUTLINE_PROMPT_PATH", DEFAULT_OUTLINE_PROMPT_PATH),
            credentials: Credentials {
                gemini_api_key: optional_env("GEMINI_API_KEY"),
                openai_api_key: optional_env("OPENAI_API_KEY"),
            },
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn path_env(key: &str, default: &str) -> PathBuf {
    optional_env(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Treats empty values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("OUTLINE_API_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("OUTLINE_API_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("OUTLINE_API_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_env_ignores_blank_values() {
        std::env::set_var("OUTLINE_API_TEST_BLANK_KEY", "   ");
        assert!(optional_env("OUTLINE_API_TEST_BLANK_KEY").is_none());
    }
}
