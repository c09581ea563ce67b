pub(crate) mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_ask::AppState;
use api_ask::router::create_router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use clap::Parser;
use core_agent::CoreAgentService;
use core_llm::{ProviderKind, ProviderRegistry};
use core_store::{StoreService, loader};
use dotenv::dotenv;
use tokio::signal;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::load_shed::LoadShedLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const TARGETS: [&str; 6] = [
    "shopqld",
    "api_ask",
    "core_agent",
    "core_llm",
    "core_store",
    "core_viz",
];

#[derive(OpenApi)]
#[openapi(
    paths(api_ask::handlers::ask, api_ask::handlers::upload, api_ask::handlers::tables),
    components(schemas(
        api_ask::schemas::AskRequest,
        api_ask::schemas::AskResponse,
        api_ask::schemas::UploadResponse,
        api_ask::schemas::TablesResponse,
        api_ask::schemas::ErrorResponse,
    )),
    servers((url = "/api"))
)]
struct ApiDoc;

#[tokio::main]
#[allow(clippy::expect_used)]
async fn main() {
    dotenv().ok();

    let opts = cli::CliOpts::parse();
    setup_tracing(&opts);

    let default_provider = opts
        .default_provider
        .parse::<ProviderKind>()
        .expect("Invalid default provider, expected one of: ollama, groq, gemini");

    let store = Arc::new(StoreService::new());
    if opts.csv_dir.is_dir() {
        let tables = loader::load_csv_dir(&store, &opts.csv_dir)
            .await
            .expect("Failed to load CSV directory");
        if tables.is_empty() {
            tracing::warn!(dir = %opts.csv_dir.display(), "no CSV files found, starting with an empty store");
        }
    } else {
        tracing::warn!(dir = %opts.csv_dir.display(), "CSV directory not found, starting with an empty store");
    }

    let providers =
        Arc::new(ProviderRegistry::new(&opts.provider_config()).expect("Failed to build providers"));
    let agent = Arc::new(CoreAgentService::new(
        store.clone(),
        providers,
        default_provider,
        opts.enable_visualization,
    ));

    let state = AppState { agent, store };

    let router = Router::new()
        .nest("/api", create_router().with_state(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health));
    let router = with_rate_limit(
        router,
        opts.rate_limit_calls,
        Duration::from_secs(opts.rate_limit_period_secs),
    )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(opts.request_timeout_secs)))
        .layer(CatchPanicLayer::new())
        .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", opts.host, opts.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to get local address");
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Boundary rate limit shared by every route. The load shed sits directly on
/// the rate limiter so an exhausted window surfaces as `Overloaded`, which
/// the buffer worker propagates to `handle_middleware_error` as an immediate
/// 429 instead of queueing the caller past the window.
fn with_rate_limit(router: Router, calls: u64, period: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(BufferLayer::new(1024))
            .layer(LoadShedLayer::new())
            .layer(RateLimitLayer::new(calls, period)),
    )
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::TOO_MANY_REQUESTS,
            "rate limit exceeded, try again later".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled middleware error: {error}"),
        )
    }
}

fn setup_tracing(opts: &cli::CliOpts) {
    let targets_with_level = |level: LevelFilter| -> Vec<(&str, LevelFilter)> {
        TARGETS.iter().map(|t| (*t, level)).collect()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(match std::env::var("RUST_LOG") {
                    Ok(val) => match val.parse::<Targets>() {
                        Ok(log_targets_from_env) => log_targets_from_env,
                        Err(err) => {
                            eprintln!("Failed to parse RUST_LOG: {err:?}");
                            Targets::default()
                                .with_targets(targets_with_level(opts.tracing_level.into()))
                                .with_default(LevelFilter::INFO)
                        }
                    },
                    _ => Targets::default()
                        .with_targets(targets_with_level(opts.tracing_level.into()))
                        .with_default(LevelFilter::INFO),
                }),
        )
        .init();
}

/// Wait for either Ctrl+C or SIGTERM before starting graceful shutdown.
///
/// # Panics
/// Panics if the signal handler cannot be installed.
#[allow(clippy::expect_used, clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::warn!("Ctrl+C received, starting graceful shutdown");
        },
        () = terminate => {
            tracing::warn!("SIGTERM received, starting graceful shutdown");
        },
    }
}
