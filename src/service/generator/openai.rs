use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{GenerationError, TextGenerator};
use crate::service::language::Language;

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 1500;

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    pub fn new(client: Client, config: OpenAiConfig) -> Self {
        info!("Initializing OpenAI generator with model {}", config.model);
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, messages: Vec<Value>) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let call = async {
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.config.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let completion: ChatCompletionResponse = response.json().await?;
            extract_content(completion)
        };

        let secs = self.config.timeout.as_secs();
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(Err(GenerationError::Timeout(_))) | Err(_) => Err(GenerationError::Timeout(secs)),
            Ok(result) => result,
        }
    }
}

fn system_message(system_prompt: &str, language: Language) -> Value {
    json!({
        "role": "system",
        "content": format!("{} {}", language.instruction(), system_prompt),
    })
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String, GenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| GenerationError::Malformed("no content in completion".to_string()))
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        language: Language,
    ) -> Result<String, GenerationError> {
        let messages = vec![
            system_message(system_prompt, language),
            json!({ "role": "user", "content": user_prompt }),
        ];
        self.complete(messages).await
    }

    async fn analyze_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &[u8],
        language: Language,
    ) -> Result<String, GenerationError> {
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));
        let messages = vec![
            system_message(system_prompt, language),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": user_prompt },
                    { "type": "image_url", "image_url": { "url": data_url } },
                ],
            }),
        ];
        self.complete(messages).await
    }
}
