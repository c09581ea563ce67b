use std::sync::Arc;

use async_trait::async_trait;

use core_llm::{ProviderKind, ProviderRegistry};
use core_store::{QueryResult, StoreService};

use crate::error::{AgentError, AgentResult};
use crate::prompt::{SYSTEM_PROMPT, build_user_prompt};
use crate::sql::{ensure_read_only, strip_code_fences};

/// Everything the boundary layer needs from one answered question.
#[derive(Debug)]
pub struct AskOutcome {
    pub sql: String,
    pub result: QueryResult,
    /// base64-encoded SVG, absent when the result shape is not chartable or
    /// rendering was disabled.
    pub chart: Option<String>,
}

#[async_trait]
pub trait AgentService: Send + Sync {
    /// Full pipeline: translate, execute, then attempt a chart.
    async fn ask(
        &self,
        question: &str,
        provider: Option<ProviderKind>,
        render_chart: bool,
    ) -> AgentResult<AskOutcome>;

    /// Translate the question into SQL and execute it, without the chart
    /// step. Returns the post-processed statement together with the rows.
    async fn translate_and_execute(
        &self,
        question: &str,
        provider: Option<ProviderKind>,
    ) -> AgentResult<(String, QueryResult)>;
}

pub struct CoreAgentService {
    store: Arc<StoreService>,
    providers: Arc<ProviderRegistry>,
    default_provider: ProviderKind,
    visualization_enabled: bool,
}

impl CoreAgentService {
    pub fn new(
        store: Arc<StoreService>,
        providers: Arc<ProviderRegistry>,
        default_provider: ProviderKind,
        visualization_enabled: bool,
    ) -> Self {
        Self {
            store,
            providers,
            default_provider,
            visualization_enabled,
        }
    }
}

#[async_trait]
impl AgentService for CoreAgentService {
    #[tracing::instrument(name = "AgentService::ask", level = "debug", skip(self), err)]
    async fn ask(
        &self,
        question: &str,
        provider: Option<ProviderKind>,
        render_chart: bool,
    ) -> AgentResult<AskOutcome> {
        let (sql, result) = self.translate_and_execute(question, provider).await?;
        let chart = if render_chart && self.visualization_enabled {
            core_viz::maybe_plot(&result)
        } else {
            None
        };
        Ok(AskOutcome { sql, result, chart })
    }

    #[tracing::instrument(
        name = "AgentService::translate_and_execute",
        level = "debug",
        skip(self),
        err
    )]
    async fn translate_and_execute(
        &self,
        question: &str,
        provider: Option<ProviderKind>,
    ) -> AgentResult<(String, QueryResult)> {
        let kind = provider.unwrap_or(self.default_provider);
        let adapter = self.providers.select(kind)?;

        let schema = self.store.describe_schema().await?;
        let user_prompt = build_user_prompt(&schema, question);
        let raw = adapter.complete(SYSTEM_PROMPT, &user_prompt).await?;

        let sql = strip_code_fences(&raw);
        if sql.is_empty() {
            return Err(AgentError::EmptyCompletion);
        }
        ensure_read_only(&sql)?;
        tracing::info!(provider = adapter.name(), sql, "executing generated SQL");

        let result = self.store.execute(&sql).await?;
        Ok((sql, result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use core_llm::providers::ProviderConfig;
    use core_llm::{CompletionProvider, ProviderError, ProviderResult};
    use core_store::StoreError;

    /// Canned backend: returns a fixed completion, or a fixed error.
    struct MockProvider {
        response: Result<String, fn() -> ProviderError>,
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> ProviderResult<String> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    async fn store_with_products() -> Arc<StoreService> {
        let store = StoreService::new();
        store
            .load_csv_bytes(
                "products",
                Bytes::from_static(b"name,sales\nWidget,1000\nGadget,2000\n"),
            )
            .await
            .unwrap();
        Arc::new(store)
    }

    fn agent_with(
        store: Arc<StoreService>,
        provider: MockProvider,
        visualization: bool,
    ) -> CoreAgentService {
        let registry = Arc::new(ProviderRegistry::from_adapters(
            Arc::new(provider),
            None,
            None,
        ));
        CoreAgentService::new(store, registry, ProviderKind::Ollama, visualization)
    }

    #[tokio::test]
    async fn translation_is_a_pass_through_once_sql_is_fixed() {
        let store = store_with_products().await;
        let direct = store.execute("SELECT name, sales FROM products").await.unwrap();

        let agent = agent_with(
            store,
            MockProvider {
                response: Ok("SELECT name, sales FROM products".to_string()),
            },
            false,
        );
        let (sql, result) = agent
            .translate_and_execute("show all products", None)
            .await
            .unwrap();
        assert_eq!(sql, "SELECT name, sales FROM products");
        assert_eq!(result, direct);
    }

    #[tokio::test]
    async fn fenced_completion_is_stripped_before_execution() {
        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Ok("```sql\nSELECT name FROM products\n```".to_string()),
            },
            false,
        );
        let (sql, result) = agent.translate_and_execute("names", None).await.unwrap();
        assert_eq!(sql, "SELECT name FROM products");
        assert_eq!(result.num_rows(), 2);
    }

    #[tokio::test]
    async fn mutating_completion_never_reaches_the_store() {
        let store = store_with_products().await;
        let agent = agent_with(
            store.clone(),
            MockProvider {
                response: Ok("DROP TABLE products".to_string()),
            },
            false,
        );
        let err = agent.translate_and_execute("drop it", None).await.unwrap_err();
        assert!(matches!(err, AgentError::StatementRejected { .. }));
        // The table must still be there.
        assert_eq!(store.execute("SELECT * FROM products").await.unwrap().num_rows(), 2);
    }

    #[tokio::test]
    async fn execution_error_carries_engine_message_and_no_rows() {
        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Ok("SELECT foo FROM products".to_string()),
            },
            false,
        );
        let err = agent.translate_and_execute("bad column", None).await.unwrap_err();
        match err {
            AgentError::Store {
                source: StoreError::DataFusionQuery { query, .. },
            } => assert_eq!(query, "SELECT foo FROM products"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn provider_auth_error_propagates_unchanged() {
        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Err(|| ProviderError::Auth {
                    provider: "groq".to_string(),
                }),
            },
            false,
        );
        let err = agent.translate_and_execute("anything", None).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Provider {
                source: ProviderError::Auth { .. }
            }
        ));
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Ok("``````".to_string()),
            },
            false,
        );
        let err = agent.translate_and_execute("anything", None).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyCompletion));
    }

    #[tokio::test]
    async fn chartable_result_gets_a_chart_when_enabled() {
        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Ok("SELECT name, sales FROM products".to_string()),
            },
            true,
        );
        let outcome = agent.ask("sales per product", None, true).await.unwrap();
        assert!(outcome.chart.is_some());

        let agent = agent_with(
            store_with_products().await,
            MockProvider {
                response: Ok("SELECT name, sales FROM products".to_string()),
            },
            true,
        );
        let outcome = agent.ask("sales per product", None, false).await.unwrap();
        assert!(outcome.chart.is_none());
    }

    #[tokio::test]
    async fn unconfigured_hosted_provider_is_not_silently_retried() {
        let store = store_with_products().await;
        let registry = Arc::new(ProviderRegistry::new(&ProviderConfig::default()).unwrap());
        let agent = CoreAgentService::new(store, registry, ProviderKind::Ollama, false);
        let err = agent
            .translate_and_execute("anything", Some(ProviderKind::Groq))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::Provider {
                source: ProviderError::MissingCredentials { .. }
            }
        ));
    }
}
