//! Best-model selection and forward projection.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::AnalysisError;
use crate::models::{x_range, ModelKind, ModelResult};

pub const DEFAULT_FORECAST_HORIZON: usize = 5;

/// Picks the result with the highest r². The first of several equal scores wins,
/// and a NaN score never beats a real one.
pub fn select_best(results: &[ModelResult]) -> Option<&ModelResult> {
    let mut best: Option<&ModelResult> = None;
    for result in results {
        best = match best {
            None => Some(result),
            Some(current) if beats(result.metrics.r_squared, current.metrics.r_squared) => {
                Some(result)
            }
            keep => keep,
        };
    }
    best
}

fn beats(candidate: f64, current: f64) -> bool {
    if candidate.is_nan() {
        return false;
    }
    current.is_nan() || candidate > current
}

/// Results ordered by descending r². Equal scores keep fit order; NaN sorts last.
pub fn rank_models(results: &[ModelResult]) -> Vec<&ModelResult> {
    let mut ranked: Vec<&ModelResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        let (ra, rb) = (a.metrics.r_squared, b.metrics.r_squared);
        match (ra.is_nan(), rb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => rb.partial_cmp(&ra).unwrap_or(Ordering::Equal),
        }
    });
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Sign of the model's trend metric.
    pub fn from_trend(trend: f64) -> Self {
        if trend > 0.0 {
            TrendDirection::Increasing
        } else if trend < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "Increasing",
            TrendDirection::Decreasing => "Decreasing",
            TrendDirection::Stable => "Stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Forecast summary derived from one fitted model. Never refits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub model: ModelKind,
    /// Largest observed x.
    pub last_x: f64,
    /// Observed y at `last_x` (the later row when x repeats).
    pub last_value: f64,
    pub next_x: f64,
    pub predicted_next: f64,
    pub trend: TrendDirection,
    /// r² × 100.
    pub confidence: f64,
    pub horizon: usize,
    /// (x, predicted y) for k = 1..=horizon steps past `last_x`.
    pub projections: Vec<(f64, f64)>,
}

/// Projects `result` forward from the observed samples.
///
/// The step is the mean spacing of the distinct observed x values, or 1.0 when fewer
/// than two distinct values exist.
pub fn forecast(
    result: &ModelResult,
    x_values: &[f64],
    y_values: &[f64],
    horizon: usize,
) -> Result<Forecast, AnalysisError> {
    if horizon == 0 {
        return Err(AnalysisError::InvalidInput(
            "forecast horizon must be at least 1".to_string(),
        ));
    }
    if x_values.is_empty() || x_values.len() != y_values.len() {
        return Err(AnalysisError::InvalidInput(
            "forecast needs equally sized, non-empty x and y values".to_string(),
        ));
    }

    let (_, last_x) = x_range(x_values);
    let last_value = x_values
        .iter()
        .zip(y_values)
        .rev()
        .find(|(&x, _)| x == last_x)
        .map(|(_, &y)| y)
        .unwrap_or(f64::NAN);

    let step = mean_step(x_values);
    let projections: Vec<(f64, f64)> = (1..=horizon)
        .map(|k| {
            let x = last_x + k as f64 * step;
            (x, result.predict(x))
        })
        .collect();
    let (next_x, predicted_next) = projections[0];

    Ok(Forecast {
        model: result.kind,
        last_x,
        last_value,
        next_x,
        predicted_next,
        trend: TrendDirection::from_trend(result.metrics.trend),
        confidence: result.metrics.r_squared * 100.0,
        horizon,
        projections,
    })
}

fn mean_step(x_values: &[f64]) -> f64 {
    let mut distinct: Vec<f64> = x_values.to_vec();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    distinct.dedup();
    match (distinct.first(), distinct.last()) {
        (Some(first), Some(last)) if distinct.len() >= 2 => {
            (last - first) / (distinct.len() - 1) as f64
        }
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fit, Coefficients, FitMetrics};

    fn result(kind: ModelKind, r_squared: f64) -> ModelResult {
        ModelResult {
            kind,
            coefficients: Coefficients::Linear {
                slope: 1.0,
                intercept: 0.0,
            },
            metrics: FitMetrics {
                r_squared,
                rmse: 0.0,
                aic: 0.0,
                trend: 0.0,
            },
            points: Vec::new(),
        }
    }

    #[test]
    fn best_is_first_of_ties() {
        let results = vec![
            result(ModelKind::Linear, 0.9),
            result(ModelKind::Power, 0.95),
            result(ModelKind::Exponential, 0.95),
        ];
        assert_eq!(select_best(&results).unwrap().kind, ModelKind::Power);
    }

    #[test]
    fn nan_never_wins() {
        let results = vec![
            result(ModelKind::Linear, f64::NAN),
            result(ModelKind::Power, -3.0),
        ];
        assert_eq!(select_best(&results).unwrap().kind, ModelKind::Power);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn ranking_is_stable_and_descending() {
        let results = vec![
            result(ModelKind::Linear, 0.5),
            result(ModelKind::Polynomial, f64::NAN),
            result(ModelKind::Exponential, 0.9),
            result(ModelKind::Power, 0.5),
        ];
        let order: Vec<ModelKind> = rank_models(&results).iter().map(|r| r.kind).collect();
        assert_eq!(
            order,
            vec![
                ModelKind::Exponential,
                ModelKind::Linear,
                ModelKind::Power,
                ModelKind::Polynomial
            ]
        );
    }

    #[test]
    fn direction_from_sign() {
        assert_eq!(TrendDirection::from_trend(3.0), TrendDirection::Increasing);
        assert_eq!(TrendDirection::from_trend(-0.1), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::from_trend(0.0), TrendDirection::Stable);
    }

    #[test]
    fn projects_linear_forward() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        let results = fit(&x, &y, &["linear"]).unwrap();
        let f = forecast(&results[0], &x, &y, 3).unwrap();
        assert_eq!(f.last_x, 4.0);
        assert_eq!(f.last_value, 9.0);
        assert!((f.next_x - 5.0).abs() < 1e-12);
        assert!((f.predicted_next - 11.0).abs() < 1e-9);
        assert_eq!(f.projections.len(), 3);
        assert!((f.projections[2].0 - 7.0).abs() < 1e-12);
        assert_eq!(f.trend, TrendDirection::Increasing);
        assert!((f.confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn single_distinct_x_uses_unit_step() {
        assert_eq!(mean_step(&[2.0, 2.0]), 1.0);
        assert_eq!(mean_step(&[0.0, 10.0, 4.0, 10.0]), 5.0);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let r = result(ModelKind::Linear, 1.0);
        assert!(forecast(&r, &[1.0], &[1.0], 0).is_err());
    }
}
