//! Forecast charts
//!
//! Charts are written as PNG unless the path ends in `.svg`.

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::series::HourlySeries;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

/// One line on a chart
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<(NaiveDateTime, f64)>,
    pub color: RGBColor,
    pub dashed: bool,
}

impl ChartLine {
    pub fn solid(
        label: impl Into<String>,
        points: Vec<(NaiveDateTime, f64)>,
        color: RGBColor,
    ) -> Self {
        Self {
            label: label.into(),
            points,
            color,
            dashed: false,
        }
    }

    pub fn dashed(
        label: impl Into<String>,
        points: Vec<(NaiveDateTime, f64)>,
        color: RGBColor,
    ) -> Self {
        Self {
            dashed: true,
            ..Self::solid(label, points, color)
        }
    }
}

/// Title, axis labels and size of a chart
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Time".to_string(),
            y_label: "Price (c/kWh)".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

/// Draw `lines` into an image file, creating its directory if needed
pub fn draw_forecast_chart(path: &Path, spec: &ChartSpec, lines: &[ChartLine]) -> Result<()> {
    if lines.iter().all(|line| line.points.is_empty()) {
        return Err(ForecastError::PlotError("Nothing to plot".to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let svg = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if svg {
        let root = SVGBackend::new(path, (spec.width, spec.height)).into_drawing_area();
        render(&root, spec, lines)?;
        root.present().map_err(plot_error)?;
    } else {
        let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
        render(&root, spec, lines)?;
        root.present().map_err(plot_error)?;
    }

    info!("Saved chart to {}", path.display());
    Ok(())
}

/// Plot actual hours against a forecast, optionally preceded by training history
///
/// The forecast is drawn as a dashed red line.
pub fn draw_forecast_comparison(
    path: &Path,
    title: &str,
    history: Option<&HourlySeries>,
    actual: &HourlySeries,
    forecast: &ForecastResult,
) -> Result<()> {
    let mut lines = Vec::with_capacity(3);
    if let Some(history) = history {
        lines.push(ChartLine::solid("Training data", history.points(), BLUE));
    }
    lines.push(ChartLine::solid("Actual", actual.points(), RGBColor(0, 128, 0)));
    lines.push(ChartLine::dashed("Forecast", forecast.points(), RED));

    draw_forecast_chart(path, &ChartSpec::new(title), &lines)
}

fn render<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    lines: &[ChartLine],
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_error)?;

    let all_points = lines.iter().flat_map(|line| line.points.iter());
    let (mut first, mut last) = (NaiveDateTime::MAX, NaiveDateTime::MIN);
    let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);
    for (ts, value) in all_points {
        first = first.min(*ts);
        last = last.max(*ts);
        low = low.min(*value);
        high = high.max(*value);
    }
    if last <= first {
        last = first + Duration::hours(1);
    }
    let padding = ((high - low) * 0.05).max(0.5);

    let x_range: std::ops::Range<DateTime<Utc>> = first.and_utc()..last.and_utc();
    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, (low - padding)..(high + padding))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(10)
        .x_label_formatter(&|dt| dt.format("%d.%m. %H:%M").to_string())
        .draw()
        .map_err(plot_error)?;

    for line in lines {
        let color = line.color;
        let style = color.stroke_width(2);
        let points: Vec<(DateTime<Utc>, f64)> = line
            .points
            .iter()
            .map(|(ts, v)| (ts.and_utc(), *v))
            .collect();

        let series = if line.dashed {
            chart.draw_series(DashedLineSeries::new(points, 8, 5, style))
        } else {
            chart.draw_series(LineSeries::new(points, style))
        }
        .map_err(plot_error)?;

        series
            .label(line.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    Ok(())
}

fn plot_error<E: std::fmt::Display>(err: E) -> ForecastError {
    ForecastError::PlotError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn points(n: usize, offset: f64) -> Vec<(NaiveDateTime, f64)> {
        let start =
            NaiveDateTime::parse_from_str("2024-09-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        (0..n as i64)
            .map(|h| (start + Duration::hours(h), offset + (h as f64 * 0.2).sin()))
            .collect()
    }

    #[test]
    fn test_svg_chart_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("figures").join("chart.svg");

        draw_forecast_chart(
            &path,
            &ChartSpec::new("Test"),
            &[
                ChartLine::solid("Actual", points(48, 5.0), BLUE),
                ChartLine::dashed("Forecast", points(48, 5.5), RED),
            ],
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polyline") || svg.contains("<line"));
    }

    #[test]
    fn test_comparison_chart_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comparison.png");
        let (timestamps, values) = points(72, 4.0).into_iter().unzip();
        let series = HourlySeries::new(timestamps, values).unwrap();
        let (history, actual) = series.split_at(48);
        let forecast = ForecastResult::new(vec![4.0; 24], actual.timestamps().to_vec()).unwrap();

        draw_forecast_comparison(&path, "ARIMA(1,1,0)", Some(&history), &actual, &forecast)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_empty_chart_rejected() {
        let dir = tempdir().unwrap();
        let result =
            draw_forecast_chart(&dir.path().join("empty.svg"), &ChartSpec::new("Empty"), &[]);
        assert!(matches!(result, Err(ForecastError::PlotError(_))));
    }
}
