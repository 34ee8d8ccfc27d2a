/// LLM Client — every text-generation provider call in the service goes through here.
///
/// Callers depend only on the `TextGenerationClient` trait. Concrete backends
/// are chosen by `build_client` from the provider `type` string, so adding a
/// provider means adding a module and a match arm, never touching callers.
///
/// Transport policy (timeouts on the shared `reqwest::Client`, retry on 429
/// and 5xx) is owned by this module and nowhere else.
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::warn;

use crate::providers::ProviderSettings;

pub mod gemini;
pub mod images;
pub mod openai;

pub use gemini::GeminiClient;
pub use images::ReferenceImage;
pub use openai::OpenAiCompatibleClient;

pub const GEMINI_PROVIDER_TYPE: &str = "google_gemini";
pub const OPENAI_PROVIDER_TYPE: &str = "openai_compatible";

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Unsupported provider type: {0}")]
    UnsupportedProvider(String),

    #[error("No API key configured for provider type '{0}'")]
    MissingApiKey(String),
}

/// Sampling parameters resolved from the active provider's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            model: settings.model().to_string(),
            temperature: settings.temperature(),
            max_output_tokens: settings.max_output_tokens(),
        }
    }
}

/// A text-generation backend. One call, one complete text.
#[async_trait]
pub trait TextGenerationClient: Send + Sync {
    async fn generate_text(
        &self,
        prompt: &str,
        params: &GenerationParams,
        images: &[ReferenceImage],
    ) -> Result<String, LlmError>;
}

/// Environment-level API keys. A key in the provider settings wins over these.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Builds the client for a provider's settings, keyed by its `type`.
pub fn build_client(
    settings: &ProviderSettings,
    credentials: &Credentials,
    http: reqwest::Client,
) -> Result<Box<dyn TextGenerationClient>, LlmError> {
    match settings.provider_type() {
        GEMINI_PROVIDER_TYPE => {
            let api_key = resolve_api_key(
                settings,
                credentials.gemini_api_key.as_deref(),
                GEMINI_PROVIDER_TYPE,
            )?;
            Ok(Box::new(GeminiClient::new(
                http,
                api_key,
                settings.base_url.clone(),
            )))
        }
        OPENAI_PROVIDER_TYPE => {
            let api_key = resolve_api_key(
                settings,
                credentials.openai_api_key.as_deref(),
                OPENAI_PROVIDER_TYPE,
            )?;
            Ok(Box::new(OpenAiCompatibleClient::new(
                http,
                api_key,
                settings.base_url.clone(),
            )))
        }
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}

fn resolve_api_key(
    settings: &ProviderSettings,
    fallback: Option<&str>,
    provider_type: &str,
) -> Result<String, LlmError> {
    let present = |key: &&str| !key.trim().is_empty();
    settings
        .api_key
        .as_deref()
        .filter(present)
        .or(fallback.filter(present))
        .map(str::to_string)
        .ok_or_else(|| LlmError::MissingApiKey(provider_type.to_string()))
}

/// Error envelope shared by the Gemini and OpenAI APIs: `{"error": {"message": ..}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sends the request produced by `build` and deserializes a JSON body.
/// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
pub(crate) async fn send_with_retry<T, F>(build: F) -> Result<T, LlmError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s
            let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let body = response.text().await?;
        return serde_json::from_str(&body).map_err(LlmError::Parse);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

/// Pulls `error.message` out of a JSON error body, or returns the body as-is.
fn error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
