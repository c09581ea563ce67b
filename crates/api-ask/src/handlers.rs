use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use datafusion::arrow::record_batch::RecordBatch;
use snafu::ResultExt;
use strum::VariantNames;

use crate::error::{self as api_error, ApiError, ApiResult};
use crate::schemas::{
    AskRequest, AskResponse, ColumnInfo, ErrorResponse, TableInfo, TablesResponse, UploadResponse,
};
use crate::state::AppState;
use core_llm::ProviderKind;
use core_store::QueryResult;
use core_store::loader::table_name_from_stem;
use datafusion::arrow::json::WriterBuilder;
use datafusion::arrow::json::writer::JsonArray;

fn parse_provider(name: &str) -> ApiResult<ProviderKind> {
    name.parse().map_err(|_| ApiError::UnknownProvider {
        name: name.to_string(),
        expected: ProviderKind::VARIANTS.join(", "),
    })
}

/// Serialize result batches to JSON row objects, with explicit nulls so
/// every row carries every column.
fn records_to_rows(result: &QueryResult) -> ApiResult<Vec<serde_json::Value>> {
    if result.num_rows() == 0 {
        return Ok(Vec::new());
    }
    let buf = Vec::new();
    let write_builder = WriterBuilder::new().with_explicit_nulls(true);
    let mut writer = write_builder.build::<_, JsonArray>(buf);
    let record_refs: Vec<&RecordBatch> = result.records.iter().collect();
    writer
        .write_batches(&record_refs)
        .context(api_error::RowSerializeSnafu)?;
    writer.finish().context(api_error::RowSerializeSnafu)?;
    let json = String::from_utf8(writer.into_inner()).context(api_error::Utf8Snafu)?;
    serde_json::from_str(&json).context(api_error::RowParseSnafu)
}

/// Answer a natural language question about the loaded data.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, body = AskResponse),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 502, body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state, payload), err)]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let provider = payload
        .provider
        .as_deref()
        .map(parse_provider)
        .transpose()?;
    let outcome = state
        .agent
        .ask(&payload.question, provider, payload.render_chart)
        .await?;
    let result = records_to_rows(&outcome.result)?;
    Ok(Json(AskResponse {
        sql_query: outcome.sql,
        result,
        chart: outcome.chart,
    }))
}

/// Register the CSV request body as a new table.
#[utoipa::path(
    post,
    path = "/upload/{table}",
    request_body = String,
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state, body), err)]
pub async fn upload(
    State(state): State<AppState>,
    Path(table): Path<String>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let table = table_name_from_stem(&table)?;
    let rows_loaded = state.store.load_csv_bytes(&table, body).await?;
    Ok(Json(UploadResponse { table, rows_loaded }))
}

/// List registered tables with their columns.
#[utoipa::path(
    get,
    path = "/tables",
    responses((status = 200, body = TablesResponse))
)]
#[tracing::instrument(level = "debug", skip(state), err)]
pub async fn tables(State(state): State<AppState>) -> ApiResult<Json<TablesResponse>> {
    let description = state.store.describe_schema().await?;
    let tables = description
        .tables
        .into_iter()
        .map(|table| TableInfo {
            name: table.name,
            columns: table
                .columns
                .into_iter()
                .map(|column| ColumnInfo {
                    name: column.name,
                    data_type: column.data_type,
                    nullable: column.nullable,
                })
                .collect(),
        })
        .collect();
    Ok(Json(TablesResponse { tables }))
}
