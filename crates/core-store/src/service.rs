use std::sync::Arc;

use bytes::{Buf, Bytes};
use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::csv::ReaderBuilder;
use datafusion::arrow::csv::reader::Format;
use datafusion::catalog::{CatalogProvider, SchemaProvider};
use datafusion::datasource::MemTable;
use datafusion::prelude::{CsvReadOptions, SessionConfig, SessionContext};
use datafusion::common::TableReference;
use snafu::ResultExt;

use crate::error::{self as store_error, StoreError, StoreResult};
use crate::models::QueryResult;
use crate::schema::{ColumnDescription, SchemaDescription, TableDescription};

const INFORMATION_SCHEMA: &str = "information_schema";

/// Process-wide relational store backed by an in-process DataFusion session.
///
/// The context is internally synchronized, so a single instance is shared
/// across concurrent requests behind an `Arc` without external locking. The
/// query path never mutates registered tables; mutation happens only through
/// the explicit CSV loading entry points.
pub struct StoreService {
    ctx: SessionContext,
}

impl Default for StoreService {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreService {
    #[must_use]
    pub fn new() -> Self {
        let config = SessionConfig::new().with_information_schema(true);
        Self {
            ctx: SessionContext::new_with_config(config),
        }
    }

    /// Register a CSV file on disk as a table.
    #[tracing::instrument(name = "StoreService::register_csv_path", level = "debug", skip(self), err)]
    pub async fn register_csv_path(&self, table: &str, path: &str) -> StoreResult<()> {
        self.ctx
            .register_csv(table, path, CsvReadOptions::new())
            .await
            .context(store_error::DataFusionSnafu)
    }

    /// Register an in-memory CSV payload as a table, replacing any table
    /// already registered under the same name. Returns the number of rows
    /// loaded.
    #[tracing::instrument(
        name = "StoreService::load_csv_bytes",
        level = "debug",
        skip(self, data),
        err,
        ret
    )]
    pub async fn load_csv_bytes(&self, table: &str, data: Bytes) -> StoreResult<usize> {
        let format = Format::default().with_header(true);
        let (schema, _) = format
            .infer_schema(data.clone().reader(), None)
            .context(store_error::ArrowSnafu)?;
        let schema = Arc::new(schema);

        let csv = ReaderBuilder::new(schema.clone())
            .with_format(format)
            .build_buffered(data.reader())
            .context(store_error::ArrowSnafu)?;
        let batches: Result<Vec<_>, _> = csv.collect();
        let batches = batches.context(store_error::ArrowSnafu)?;

        let rows_loaded = batches.iter().map(RecordBatch::num_rows).sum();

        let table_ref = TableReference::bare(table.to_string());
        if self
            .ctx
            .table_exist(table_ref.clone())
            .context(store_error::DataFusionSnafu)?
        {
            self.ctx
                .deregister_table(table_ref.clone())
                .context(store_error::DataFusionSnafu)?;
        }
        let mem_table =
            MemTable::try_new(schema, vec![batches]).context(store_error::DataFusionSnafu)?;
        self.ctx
            .register_table(table_ref, Arc::new(mem_table))
            .context(store_error::DataFusionSnafu)?;

        Ok(rows_loaded)
    }

    /// Execute a single SQL statement and collect all result batches.
    #[tracing::instrument(name = "StoreService::execute", level = "debug", skip(self), err)]
    pub async fn execute(&self, query: &str) -> StoreResult<QueryResult> {
        let df = self
            .ctx
            .sql(query)
            .await
            .context(store_error::DataFusionQuerySnafu { query })?;
        let schema = Arc::new(df.schema().as_arrow().clone());
        let records = df
            .collect()
            .await
            .context(store_error::DataFusionQuerySnafu { query })?;
        Ok(QueryResult::new(records, schema))
    }

    /// Names of all user-registered tables.
    pub fn list_tables(&self) -> Vec<String> {
        let mut tables = Vec::new();
        for catalog_name in self.ctx.catalog_names() {
            let Some(catalog) = self.ctx.catalog(&catalog_name) else {
                continue;
            };
            for schema_name in catalog.schema_names() {
                if schema_name == INFORMATION_SCHEMA {
                    continue;
                }
                if let Some(schema) = catalog.schema(&schema_name) {
                    tables.extend(schema.table_names());
                }
            }
        }
        tables.sort();
        tables
    }

    /// Walk the catalog and produce the textual schema listing consumed by
    /// prompt construction. Regenerated on every call; nothing is cached.
    #[tracing::instrument(name = "StoreService::describe_schema", level = "debug", skip(self), err)]
    pub async fn describe_schema(&self) -> StoreResult<SchemaDescription> {
        let mut tables = Vec::new();
        for catalog_name in self.ctx.catalog_names() {
            let catalog = self
                .ctx
                .catalog(&catalog_name)
                .ok_or(StoreError::CatalogNotFound {
                    catalog: catalog_name.clone(),
                })?;
            for schema_name in catalog.schema_names() {
                if schema_name == INFORMATION_SCHEMA {
                    continue;
                }
                let Some(schema) = catalog.schema(&schema_name) else {
                    continue;
                };
                let mut table_names = schema.table_names();
                table_names.sort();
                for table_name in table_names {
                    let Some(provider) = schema
                        .table(&table_name)
                        .await
                        .context(store_error::DataFusionSnafu)?
                    else {
                        continue;
                    };
                    let columns = provider
                        .schema()
                        .fields()
                        .iter()
                        .map(|field| ColumnDescription {
                            name: field.name().clone(),
                            data_type: field.data_type().to_string(),
                            nullable: field.is_nullable(),
                        })
                        .collect();
                    tables.push(TableDescription {
                        name: table_name,
                        columns,
                    });
                }
            }
        }
        Ok(SchemaDescription { tables })
    }
}
