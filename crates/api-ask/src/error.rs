use axum::{Json, http::StatusCode, response::IntoResponse};
use snafu::prelude::*;

use crate::schemas::ErrorResponse;
use core_agent::AgentError;
use core_llm::ProviderError;
use core_store::StoreError;
use datafusion::arrow::error::ArrowError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(transparent)]
    Agent { source: AgentError },

    #[snafu(transparent)]
    Store { source: StoreError },

    #[snafu(display("Unknown provider {name}, expected one of: {expected}"))]
    UnknownProvider { name: String, expected: String },

    #[snafu(display("Failed to serialize result rows: {source}"))]
    RowSerialize { source: ArrowError },

    #[snafu(display("Error encoding UTF8 string: {source}"))]
    Utf8 { source: std::string::FromUtf8Error },

    #[snafu(display("Failed to parse row JSON: {source}"))]
    RowParse { source: serde_json::Error },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            Self::Agent { source } => agent_status_code(source),
            Self::Store { source } => store_status_code(source),
            Self::UnknownProvider { .. } => StatusCode::BAD_REQUEST,
            Self::RowSerialize { .. } | Self::Utf8 { .. } | Self::RowParse { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorResponse {
            message: self.to_string(),
        });
        (status_code, body).into_response()
    }
}

fn agent_status_code(error: &AgentError) -> StatusCode {
    match error {
        AgentError::Provider { source } => match source {
            ProviderError::Auth { .. } => StatusCode::UNAUTHORIZED,
            ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ProviderError::MissingCredentials { .. } => StatusCode::BAD_REQUEST,
            ProviderError::Unavailable { .. }
            | ProviderError::RequestFailed { .. }
            | ProviderError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            ProviderError::HttpClient { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AgentError::Store { source } => store_status_code(source),
        AgentError::EmptyCompletion => StatusCode::BAD_GATEWAY,
        AgentError::SqlParse { .. } | AgentError::StatementRejected { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn store_status_code(error: &StoreError) -> StatusCode {
    match error {
        StoreError::DataFusionQuery { .. }
        | StoreError::InvalidTableName { .. }
        | StoreError::Arrow { .. } => StatusCode::BAD_REQUEST,
        StoreError::DataFusion { .. }
        | StoreError::CatalogNotFound { .. }
        | StoreError::CsvDirRead { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
