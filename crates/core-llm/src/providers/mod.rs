pub mod gemini;
pub mod groq;
pub mod ollama;

use std::sync::Arc;
use std::time::Duration;

use snafu::ResultExt;

use crate::error::{self as llm_error, ProviderError, ProviderResult};
use crate::provider::{CompletionProvider, ProviderKind};

use gemini::GeminiProvider;
use groq::GroqProvider;
use ollama::OllamaProvider;

/// Static provider configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Generous upper bound on a single completion call; the model call is
    /// the dominant latency source of the whole pipeline.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "gemma:2b".to_string(),
            groq_api_key: None,
            groq_model: "llama3-8b-8192".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash-latest".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Pure mapping from [`ProviderKind`] to an adapter instance. Hosted
/// adapters exist only when their API key was configured; selecting an
/// unconfigured one fails instead of silently falling back to another
/// backend.
pub struct ProviderRegistry {
    ollama: Arc<dyn CompletionProvider>,
    groq: Option<Arc<dyn CompletionProvider>>,
    gemini: Option<Arc<dyn CompletionProvider>>,
}

impl ProviderRegistry {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context(llm_error::HttpClientSnafu)?;

        let ollama: Arc<dyn CompletionProvider> = Arc::new(OllamaProvider::new(
            client.clone(),
            &config.ollama_base_url,
            &config.ollama_model,
        ));
        let groq = config.groq_api_key.as_deref().map(|key| {
            Arc::new(GroqProvider::new(client.clone(), key, &config.groq_model))
                as Arc<dyn CompletionProvider>
        });
        let gemini = config.gemini_api_key.as_deref().map(|key| {
            Arc::new(GeminiProvider::new(client, key, &config.gemini_model))
                as Arc<dyn CompletionProvider>
        });

        Ok(Self {
            ollama,
            groq,
            gemini,
        })
    }

    /// Assemble a registry from already-built adapters. Lets callers (and
    /// tests) bring their own transport.
    #[must_use]
    pub fn from_adapters(
        ollama: Arc<dyn CompletionProvider>,
        groq: Option<Arc<dyn CompletionProvider>>,
        gemini: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            ollama,
            groq,
            gemini,
        }
    }

    pub fn select(&self, kind: ProviderKind) -> ProviderResult<Arc<dyn CompletionProvider>> {
        let provider = match kind {
            ProviderKind::Ollama => Some(self.ollama.clone()),
            ProviderKind::Groq => self.groq.clone(),
            ProviderKind::Gemini => self.gemini.clone(),
        };
        provider.ok_or_else(|| ProviderError::MissingCredentials {
            provider: kind.to_string(),
        })
    }
}

/// Map a non-success HTTP response to the provider error taxonomy.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(ProviderError::Auth {
            provider: provider.to_string(),
        }),
        429 => Err(ProviderError::RateLimited {
            provider: provider.to_string(),
        }),
        code => Err(ProviderError::RequestFailed {
            provider: provider.to_string(),
            status: code,
            message: response.text().await.unwrap_or_default(),
        }),
    }
}

/// Map a transport failure (connection refused, DNS, timeout) to
/// `Unavailable`.
pub(crate) fn transport_error(provider: &str, source: &reqwest::Error) -> ProviderError {
    ProviderError::Unavailable {
        provider: provider.to_string(),
        message: source.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn registry_always_has_the_local_backend() {
        let registry = ProviderRegistry::new(&ProviderConfig::default()).unwrap();
        let provider = registry.select(ProviderKind::Ollama).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn hosted_backend_without_key_is_missing_credentials() {
        let registry = ProviderRegistry::new(&ProviderConfig::default()).unwrap();
        let err = registry.select(ProviderKind::Groq).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
    }

    #[test]
    fn hosted_backend_with_key_resolves_to_its_own_adapter() {
        let config = ProviderConfig {
            groq_api_key: Some("gsk-test".to_string()),
            gemini_api_key: Some("gm-test".to_string()),
            ..ProviderConfig::default()
        };
        let registry = ProviderRegistry::new(&config).unwrap();
        assert_eq!(registry.select(ProviderKind::Groq).unwrap().name(), "groq");
        assert_eq!(registry.select(ProviderKind::Gemini).unwrap().name(), "gemini");
        assert_eq!(registry.select(ProviderKind::Ollama).unwrap().name(), "ollama");
    }
}
