use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::CompletionProvider;
use crate::providers::{error_for_status, transport_error};

const NAME: &str = "groq";
const BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Hosted backend speaking the OpenAI-shaped chat completions API with a
/// bearer key.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.1,
            "max_tokens": 500,
            "n": 1,
            "stream": false,
        })
    }

    fn parse_completion(body: &Value) -> ProviderResult<String> {
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: NAME.to_string(),
                message: "missing choices[0].message.content".to_string(),
            })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    #[tracing::instrument(name = "GroqProvider::complete", level = "debug", skip_all, err)]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system_prompt, user_prompt))
            .send()
            .await
            .map_err(|e| transport_error(NAME, &e))?;
        let response = error_for_status(NAME, response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse {
                provider: NAME.to_string(),
                message: e.to_string(),
            })?;
        Self::parse_completion(&body)
    }

    fn name(&self) -> &str {
        NAME
    }
}
