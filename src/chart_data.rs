//! Prepare chart series from an analysed session: observations, fitted curves, forecast.

use crate::error::AnalysisError;
use crate::forecast::Forecast;
use crate::models::ModelResult;
use crate::session::AnalysisSession;

/// Fraction of the y span added above and below the plotted data.
const Y_PADDING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    /// Observed samples, drawn as markers.
    Points,
    /// A fitted curve.
    Line,
    /// Forecast projection, drawn as markers joined by a line.
    Projection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

/// Axis ranges and titles.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_label: String,
    pub y_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    pub bounds: ChartBounds,
}

impl ChartData {
    /// Observations, every displayed model, and the best model's forecast.
    pub fn from_session(session: &AnalysisSession) -> Result<Self, AnalysisError> {
        let (Some(x_label), Some(y_label)) =
            (session.independent_variable(), session.dependent_variable())
        else {
            return Err(AnalysisError::InvalidInput(
                "choose both an independent and a dependent variable".to_string(),
            ));
        };
        let displayed: Vec<&ModelResult> = session
            .displayed()
            .iter()
            .filter_map(|kind| session.results().iter().find(|r| r.kind == *kind))
            .collect();
        let forecast = match session.best_model() {
            Some(_) => Some(session.forecast()?),
            None => None,
        };
        let (x, y) = session.samples();
        prepare_chart_data(x_label, y_label, x, y, &displayed, forecast.as_ref())
    }
}

/// Builds chart series and bounds. Non-finite points are dropped.
pub fn prepare_chart_data(
    x_label: &str,
    y_label: &str,
    x_values: &[f64],
    y_values: &[f64],
    models: &[&ModelResult],
    forecast: Option<&Forecast>,
) -> Result<ChartData, AnalysisError> {
    let mut series = Vec::with_capacity(models.len() + 2);

    series.push(ChartSeries {
        name: "Observed".to_string(),
        style: SeriesStyle::Points,
        points: finite_points(x_values.iter().copied().zip(y_values.iter().copied())),
    });
    for model in models {
        series.push(ChartSeries {
            name: model.name().to_string(),
            style: SeriesStyle::Line,
            points: finite_points(model.points.iter().copied()),
        });
    }
    if let Some(forecast) = forecast {
        let mut points = vec![(forecast.last_x, forecast.last_value)];
        points.extend(forecast.projections.iter().copied());
        series.push(ChartSeries {
            name: format!("Forecast ({})", forecast.model.name()),
            style: SeriesStyle::Projection,
            points: finite_points(points.into_iter()),
        });
    }

    let bounds = compute_bounds(&series, x_label, y_label).ok_or_else(|| {
        AnalysisError::InvalidInput("there are no finite points to chart".to_string())
    })?;

    Ok(ChartData { series, bounds })
}

fn finite_points(points: impl Iterator<Item = (f64, f64)>) -> Vec<(f64, f64)> {
    points
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn compute_bounds(series: &[ChartSeries], x_label: &str, y_label: &str) -> Option<ChartBounds> {
    let mut all = series.iter().flat_map(|s| s.points.iter()).peekable();
    all.peek()?;

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for &(x, y) in all {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let (x_min, x_max) = widen_if_flat(x_min, x_max);
    let (y_min, y_max) = widen_if_flat(y_min, y_max);
    let pad = (y_max - y_min) * Y_PADDING;

    Some(ChartBounds {
        x_min,
        x_max,
        y_min: y_min - pad,
        y_max: y_max + pad,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
    })
}

fn widen_if_flat(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
    }
}

/// Format an axis value for display: integer when whole, scientific when very large or small.
pub fn format_axis_label(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1e5 || abs < 1e-3 {
        format!("{:.2e}", v)
    } else if (v - v.round()).abs() < 1e-10 {
        format!("{:.0}", v)
    } else if abs >= 1.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.3}", v)
    }
}
