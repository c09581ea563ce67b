use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const fn default_true() -> bool {
    true
}

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
    /// Provider tag: `ollama`, `groq` or `gemini`. Falls back to the
    /// configured default when absent.
    pub provider: Option<String>,
    #[serde(default = "default_true")]
    pub render_chart: bool,
}

/// Response body for `POST /ask`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
    pub sql_query: String,
    pub result: Vec<serde_json::Value>,
    /// base64-encoded SVG, present only when the result shape was chartable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

/// Response body for `POST /upload/{table}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub table: String,
    pub rows_loaded: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Response body for `GET /tables`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TablesResponse {
    pub tables: Vec<TableInfo>,
}

/// Error body: a human-readable message, never a stack trace.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
