pub mod error;
pub mod render;
pub mod shape;

use core_store::QueryResult;

pub use error::VizError;
pub use shape::{ChartKind, ChartSpec};

/// Decide whether the result shape maps to a chart and render it as a
/// base64-encoded SVG. Ambiguous shapes produce no chart, and rendering
/// failures never propagate: the overall request degrades to "no chart".
#[must_use]
pub fn maybe_plot(result: &QueryResult) -> Option<String> {
    let spec = shape::classify(result)?;
    match render::render(&spec) {
        Ok(encoded) => Some(encoded),
        Err(error) => {
            tracing::warn!(%error, kind = ?spec.kind, "chart rendering failed, continuing without chart");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as engine_base64;
    use datafusion::arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
    use datafusion::arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn category_result(rows: &[(&str, i64)]) -> QueryResult {
        let schema = Arc::new(Schema::new(vec![
            Field::new("month", DataType::Utf8, true),
            Field::new("sales", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(
                    rows.iter().map(|(m, _)| *m).collect::<Vec<_>>(),
                )),
                Arc::new(Int64Array::from(
                    rows.iter().map(|(_, s)| *s).collect::<Vec<_>>(),
                )),
            ],
        )
        .unwrap();
        QueryResult::new(vec![batch], schema)
    }

    #[test]
    fn categorical_numeric_result_produces_a_chart() {
        let result = category_result(&[("Jan", 100), ("Feb", 150)]);
        let encoded = maybe_plot(&result).unwrap();
        let svg = engine_base64.decode(encoded).unwrap();
        let svg = String::from_utf8(svg).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn wide_result_produces_no_chart() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Int64, true),
            Field::new("c", DataType::Int64, true),
            Field::new("d", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(Int64Array::from(vec![2])),
                Arc::new(Int64Array::from(vec![3])),
                Arc::new(StringArray::from(vec!["x"])),
            ],
        )
        .unwrap();
        let result = QueryResult::new(vec![batch], schema);
        assert!(maybe_plot(&result).is_none());
    }

    #[test]
    fn empty_result_produces_no_chart() {
        let result = category_result(&[]);
        assert!(maybe_plot(&result).is_none());
    }

    #[test]
    fn non_finite_values_produce_no_chart() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("label", DataType::Utf8, true),
            Field::new("value", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Float64Array::from(vec![1.0, f64::NAN])),
            ],
        )
        .unwrap();
        let result = QueryResult::new(vec![batch], schema);
        assert!(maybe_plot(&result).is_none());
    }
}
