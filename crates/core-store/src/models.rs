use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::datatypes::Schema as ArrowSchema;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub records: Vec<RecordBatch>,
    /// The schema associated with the result.
    /// Required to serialize a response with column names even when
    /// `records` is empty.
    pub schema: Arc<ArrowSchema>,
}

impl QueryResult {
    #[must_use]
    pub const fn new(records: Vec<RecordBatch>, schema: Arc<ArrowSchema>) -> Self {
        Self { records, schema }
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.records.iter().map(RecordBatch::num_rows).sum()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }
}
