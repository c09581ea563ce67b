use datafusion::sql::sqlparser::parser::ParserError;
use snafu::prelude::*;

use core_llm::ProviderError;
use core_store::StoreError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AgentError {
    #[snafu(transparent)]
    Provider { source: ProviderError },

    #[snafu(transparent)]
    Store { source: StoreError },

    #[snafu(display("Model returned an empty completion"))]
    EmptyCompletion,

    #[snafu(display("Generated text is not parseable SQL: {source}, statement: {statement}"))]
    SqlParse {
        source: ParserError,
        statement: String,
    },

    #[snafu(display("Only a single read-only SELECT statement may run, got: {statement}"))]
    StatementRejected { statement: String },
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;
