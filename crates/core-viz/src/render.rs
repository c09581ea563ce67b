use base64::Engine;
use base64::engine::general_purpose::STANDARD as engine_base64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::VizError;
use crate::shape::{ChartKind, ChartSpec};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

const PIE_PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// Render the chart to an SVG document and return it base64-encoded.
pub fn render(spec: &ChartSpec) -> Result<String, VizError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        let drawn = match spec.kind {
            ChartKind::Bar => draw_bar(&root, spec),
            ChartKind::Line => draw_line(&root, spec),
            ChartKind::Pie => draw_pie(&root, spec),
        };
        drawn.map_err(|e| VizError::Render {
            message: e.to_string(),
        })?;
        root.present().map_err(|e| VizError::Render {
            message: e.to_string(),
        })?;
    }
    Ok(engine_base64.encode(svg.as_bytes()))
}

fn y_range(values: &[f64]) -> (f64, f64) {
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let low = min.min(0.0);
    let high = if max > 0.0 { max * 1.1 } else { max.abs().max(1.0) };
    if (high - low).abs() < f64::EPSILON {
        (low, low + 1.0)
    } else {
        (low, high)
    }
}

fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (y_min, y_max) = y_range(&spec.values);
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(format!("{} by {}", spec.y_title, spec.x_title), ("sans-serif", 24))
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..spec.labels.len(), y_min..y_max)?;

    let labels = spec.labels.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(spec.labels.len().min(12))
        .x_label_formatter(&move |i| labels.get(*i).cloned().unwrap_or_default())
        .x_desc(spec.x_title.clone())
        .y_desc(spec.y_title.clone())
        .draw()?;

    chart.draw_series(spec.values.iter().enumerate().map(|(i, v)| {
        Rectangle::new([(i, 0.0), (i + 1, *v)], BLUE.mix(0.6).filled())
    }))?;
    Ok(())
}

fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (y_min, y_max) = y_range(&spec.values);
    let x_max = (spec.values.len().saturating_sub(1)).max(1) as f64;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(format!("{} over {}", spec.y_title, spec.x_title), ("sans-serif", 24))
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    let labels = spec.labels.clone();
    chart
        .configure_mesh()
        .x_labels(spec.labels.len().min(12))
        .x_label_formatter(&move |x| {
            let i = x.round() as usize;
            labels.get(i).cloned().unwrap_or_default()
        })
        .x_desc(spec.x_title.clone())
        .y_desc(spec.y_title.clone())
        .draw()?;

    chart.draw_series(LineSeries::new(
        spec.values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
        &BLUE,
    ))?;
    chart.draw_series(
        spec.values
            .iter()
            .enumerate()
            .map(|(i, v)| Circle::new((i as f64, *v), 3, BLUE.filled())),
    )?;
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("{} by {}", spec.y_title, spec.x_title),
        ("sans-serif", 24),
    )?;

    let center = (WIDTH as i32 / 2, HEIGHT as i32 / 2);
    let radius = f64::from(HEIGHT) / 3.0;
    let colors: Vec<RGBColor> = (0..spec.values.len())
        .map(|i| PIE_PALETTE[i % PIE_PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &spec.values, &colors, &spec.labels);
    pie.label_style(("sans-serif", 18).into_font());
    root.draw(&pie)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec(kind: ChartKind) -> ChartSpec {
        ChartSpec {
            kind,
            x_title: "month".to_string(),
            y_title: "sales".to_string(),
            labels: vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()],
            values: vec![100.0, 150.0, 120.0],
        }
    }

    #[test]
    fn every_chart_kind_renders_to_svg() {
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            let encoded = render(&spec(kind)).unwrap();
            let svg = engine_base64.decode(encoded).unwrap();
            assert!(String::from_utf8(svg).unwrap().contains("<svg"));
        }
    }

    #[test]
    fn flat_values_still_render() {
        let mut flat = spec(ChartKind::Line);
        flat.values = vec![0.0, 0.0, 0.0];
        assert!(render(&flat).is_ok());
    }
}
