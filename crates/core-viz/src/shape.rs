use core_store::QueryResult;
use datafusion::arrow::array::{Array, Float64Array, StringArray};
use datafusion::arrow::compute::{cast, concat_batches};
use datafusion::arrow::datatypes::DataType;

/// Largest category count still readable as a pie chart.
const PIE_MAX_CATEGORIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// A fully extracted, render-ready chart: one label per data point.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_title: String,
    pub y_title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

enum XAxis {
    Categorical,
    Temporal,
    Ordinal,
}

fn x_axis(data_type: &DataType) -> Option<XAxis> {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(XAxis::Categorical),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Some(XAxis::Temporal),
        dt if dt.is_numeric() => Some(XAxis::Ordinal),
        _ => None,
    }
}

/// Inspect the result shape and decide whether/how to chart it.
///
/// Two columns with a label-like first column and a numeric second column
/// are chartable: temporal or ordinal x gives a line chart, categorical x
/// gives a pie chart when the category count is small and every value is
/// positive, and a bar chart otherwise. Everything else is not a chart;
/// ambiguity degrades to `None` rather than guessing.
#[must_use]
pub fn classify(result: &QueryResult) -> Option<ChartSpec> {
    if result.num_columns() != 2 || result.num_rows() == 0 {
        return None;
    }

    let x_field = result.schema.field(0);
    let y_field = result.schema.field(1);
    let axis = x_axis(x_field.data_type())?;
    if !y_field.data_type().is_numeric() {
        return None;
    }

    let batch = concat_batches(&result.schema, &result.records).ok()?;

    let labels = cast(batch.column(0), &DataType::Utf8).ok()?;
    let labels = labels.as_any().downcast_ref::<StringArray>()?;
    let values = cast(batch.column(1), &DataType::Float64).ok()?;
    let values = values.as_any().downcast_ref::<Float64Array>()?;
    if labels.null_count() > 0 || values.null_count() > 0 {
        return None;
    }

    let labels: Vec<String> = (0..labels.len()).map(|i| labels.value(i).to_string()).collect();
    let values: Vec<f64> = values.values().iter().copied().collect();
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let kind = match axis {
        XAxis::Temporal | XAxis::Ordinal => ChartKind::Line,
        XAxis::Categorical => {
            if labels.len() <= PIE_MAX_CATEGORIES && values.iter().all(|v| *v > 0.0) {
                ChartKind::Pie
            } else {
                ChartKind::Bar
            }
        }
    };

    Some(ChartSpec {
        kind,
        x_title: x_field.name().clone(),
        y_title: y_field.name().clone(),
        labels,
        values,
    })
}
