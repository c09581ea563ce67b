use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;

/// Which LLM backend handles a request. `Ollama` is the local backend; the
/// other two are hosted APIs. Selection is explicit per request; there is no
/// automatic failover between variants.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Groq,
    Gemini,
}

/// The single capability every backend exposes: turn a system prompt and a
/// user prompt into a raw text completion. Adapters never retry internally;
/// retry policy, if any, belongs to the caller.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ProviderResult<String>;

    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_parses_lowercase_tags() {
        assert_eq!(ProviderKind::from_str("ollama").unwrap(), ProviderKind::Ollama);
        assert_eq!(ProviderKind::from_str("groq").unwrap(), ProviderKind::Groq);
        assert_eq!(ProviderKind::from_str("gemini").unwrap(), ProviderKind::Gemini);
        assert!(ProviderKind::from_str("claude").is_err());
    }

    #[test]
    fn kind_round_trips_through_display() {
        for kind in [ProviderKind::Ollama, ProviderKind::Groq, ProviderKind::Gemini] {
            assert_eq!(ProviderKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }
}
