//! OpenAI-compatible Chat Completions backend. Also covers self-hosted
//! gateways that speak the same wire format via `base_url`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    send_with_retry, GenerationParams, LlmError, ReferenceImage, TextGenerationClient,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
    }
}

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleClient {
    pub fn new(http: reqwest::Client, api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_request<'a>(
    prompt: &'a str,
    params: &'a GenerationParams,
    images: &[ReferenceImage],
) -> ChatRequest<'a> {
    let mut content = vec![ContentPart::Text { text: prompt }];
    content.extend(images.iter().map(|image| ContentPart::ImageUrl {
        image_url: ImageUrl {
            url: image.data_url(),
        },
    }));

    ChatRequest {
        model: &params.model,
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
        temperature: params.temperature,
        max_tokens: params.max_output_tokens,
    }
}

#[async_trait]
impl TextGenerationClient for OpenAiCompatibleClient {
    async fn generate_text(
        &self,
        prompt: &str,
        params: &GenerationParams,
        images: &[ReferenceImage],
    ) -> Result<String, LlmError> {
        let body = build_request(prompt, params, images);
        let url = self.endpoint();

        let response: ChatResponse = send_with_retry(|| {
            self.http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Chat completion succeeded: input_tokens={}, output_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        response.text().ok_or(LlmError::EmptyContent)
    }
}
