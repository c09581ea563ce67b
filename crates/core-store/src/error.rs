use datafusion::arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("DataFusion error: {source}"))]
    DataFusion { source: DataFusionError },

    #[snafu(display("DataFusion query error: {source}, query: {query}"))]
    DataFusionQuery {
        #[snafu(source(from(DataFusionError, Box::new)))]
        source: Box<DataFusionError>,
        query: String,
    },

    #[snafu(display("Arrow error: {source}"))]
    Arrow { source: ArrowError },

    #[snafu(display("Invalid table name: {name}"))]
    InvalidTableName { name: String },

    #[snafu(display("Catalog {catalog} not found"))]
    CatalogNotFound { catalog: String },

    #[snafu(display("Cannot read CSV directory {path}: {source}"))]
    CsvDirRead {
        path: String,
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
