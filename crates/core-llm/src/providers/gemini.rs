use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::CompletionProvider;
use crate::providers::{error_for_status, transport_error};

const NAME: &str = "gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Hosted backend speaking the Gemini generateContent API. The key travels
/// as a query parameter, not a header.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// generateContent takes a flat list of parts; the system instruction is
    /// sent as the leading part of the single user turn.
    fn request_body(system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": format!("{system_prompt}\n\n{user_prompt}") }]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "maxOutputTokens": 500,
            },
        })
    }

    fn parse_completion(body: &Value) -> ProviderResult<String> {
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: NAME.to_string(),
                message: "missing candidates[0].content.parts[0].text".to_string(),
            })
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    #[tracing::instrument(name = "GeminiProvider::complete", level = "debug", skip_all, err)]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ProviderResult<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(system_prompt, user_prompt))
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
