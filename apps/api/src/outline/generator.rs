//! Outline Generation — turns a topic (plus optional reference images) into a
//! paged outline.
//!
//! Flow: load provider config → build client → load template →
//!       render prompt → one LLM call → parse pages → `OutlineResult`.
//!
//! A generator is built per request so edits to `text_providers.yaml` and the
//! prompt template take effect without a restart. Construction either fully
//! succeeds or returns the first error; there is no degraded instance.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::llm_client::{
    build_client, Credentials, GenerationParams, LlmError, ReferenceImage, TextGenerationClient,
};
use crate::outline::parser::{parse_outline, Page};
use crate::outline::prompts::{image_advisory, render_template, TemplateError};
use crate::providers::{load_provider_config, ConfigError, ProviderConfig};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Provider config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load prompt template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Text generation client error: {0}")]
    Client(#[from] LlmError),
}

/// Response of one outline generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineResult {
    pub success: bool,
    /// Raw provider text, before page splitting.
    pub outline: String,
    pub pages: Vec<Page>,
    pub has_images: bool,
}

pub struct OutlineGenerator {
    provider_config: ProviderConfig,
    client: Box<dyn TextGenerationClient>,
    prompt_template: String,
}

impl OutlineGenerator {
    /// Builds a generator from the service configuration.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Result<Self, GenerationError> {
        Self::load(
            &config.text_providers_path,
            &config.outline_prompt_path,
            &config.credentials,
            http,
        )
    }

    /// Loads provider config, obtains the active provider's client, then
    /// loads the prompt template, in that order.
    pub fn load(
        providers_path: &Path,
        prompt_path: &Path,
        credentials: &Credentials,
        http: reqwest::Client,
    ) -> Result<Self, GenerationError> {
        let provider_config = load_provider_config(providers_path)?;
        let settings = provider_config.active_settings();

        let client = build_client(&settings, credentials, http).map_err(|e| {
            error!(
                provider = provider_config.active_provider(),
                "Failed to build text generation client: {e}"
            );
            e
        })?;
        info!(
            provider = provider_config.active_provider(),
            provider_type = settings.provider_type(),
            "Text generation client ready"
        );

        let prompt_template = load_prompt_template(prompt_path)?;

        Ok(Self::with_client(provider_config, client, prompt_template))
    }

    /// Assembles a generator from already-loaded parts.
    pub fn with_client(
        provider_config: ProviderConfig,
        client: Box<dyn TextGenerationClient>,
        prompt_template: String,
    ) -> Self {
        Self {
            provider_config,
            client,
            prompt_template,
        }
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.provider_config
    }

    /// Renders the template for `topic` and appends the image advisory when
    /// `image_count > 0`.
    pub fn build_prompt(&self, topic: &str, image_count: usize) -> Result<String, GenerationError> {
        let mut prompt = render_template(&self.prompt_template, topic)?;
        if image_count > 0 {
            prompt.push_str(&image_advisory(image_count));
        }
        Ok(prompt)
    }

    /// Generates and parses an outline. Client failures are returned as-is;
    /// nothing is retried here.
    pub async fn generate(
        &self,
        topic: &str,
        images: &[ReferenceImage],
    ) -> Result<OutlineResult, GenerationError> {
        let prompt = self.build_prompt(topic, images.len())?;
        let params = GenerationParams::from_settings(&self.provider_config.active_settings());

        info!(
            provider = self.provider_config.active_provider(),
            model = %params.model,
            image_count = images.len(),
            "Generating outline"
        );

        let outline = self.client.generate_text(&prompt, &params, images).await?;
        let pages = parse_outline(&outline);

        info!(page_count = pages.len(), "Outline generated");

        Ok(OutlineResult {
            success: true,
            outline,
            pages,
            has_images: !images.is_empty(),
        })
    }
}

fn load_prompt_template(path: &Path) -> Result<String, GenerationError> {
    std::fs::read_to_string(path).map_err(|source| {
        error!(error = ?source, prompt_path = ?path, "Failed to load prompt template");
        GenerationError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        }
    })
}
