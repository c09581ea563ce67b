use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::CompletionProvider;
use crate::providers::{error_for_status, transport_error};

const NAME: &str = "ollama";

/// Local inference backend speaking the Ollama generate API. No auth.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// The generate endpoint has no separate system role; both prompts go
    /// into the single `prompt` field.
    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "model": self.model,
            "prompt": format!("{system_prompt}\n\n{user_prompt}"),
            "stream": false,
            "options": { "temperature": 0.1 },
        })
    }

    fn parse_completion(body: &Value) -> ProviderResult<String> {
        body.get("response")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: NAME.to_string(),
                message: "missing 'response' field".to_string(),
            })
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    #[tracing::instrument(name = "OllamaProvider::complete", level = "debug", skip_all, err)]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ProviderResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
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
