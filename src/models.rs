//! Curve fitting engine.
//!
//! Fits linear, quadratic, exponential, logarithmic, and power curves to an (x, y) sample,
//! scores each fit, and samples the fitted curve for rendering. A fitted model is plain
//! data: `Coefficients::predict` is the only evaluation path, so a `ModelResult` can be
//! cloned, serialised, and evaluated long after the fit.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, FitError};

/// Parameter count used in every AIC score, regardless of model kind.
pub const AIC_PARAMETER_COUNT: usize = 3;

/// Below this magnitude the prediction at min(x) is treated as zero and the trend is 0.
pub const TREND_EPSILON: f64 = 0.001;

/// Lower clamp for the linear fallback of exponential and power fits.
pub const FALLBACK_FLOOR: f64 = 0.01;

/// Default number of samples along a fitted curve.
pub const DEFAULT_POINT_COUNT: usize = 100;

/// Default padding on each side of the observed x range, as a fraction of the range.
pub const DEFAULT_EXTRAPOLATION_FACTOR: f64 = 0.2;

/// Closed set of supported curve families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Polynomial,
    Exponential,
    Logarithmic,
    Power,
}

impl ModelKind {
    pub const ALL: [Self; 5] = [
        Self::Linear,
        Self::Polynomial,
        Self::Exponential,
        Self::Logarithmic,
        Self::Power,
    ];

    /// Kinds requested when the caller has not chosen any.
    pub const DEFAULT_SELECTION: [Self; 3] = [Self::Linear, Self::Polynomial, Self::Exponential];

    pub fn id(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Polynomial => "polynomial",
            Self::Exponential => "exponential",
            Self::Logarithmic => "logarithmic",
            Self::Power => "power",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear Regression",
            Self::Polynomial => "Polynomial Regression",
            Self::Exponential => "Exponential Regression",
            Self::Logarithmic => "Logarithmic Regression",
            Self::Power => "Power Regression",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Linear => "Fits a straight line to the data (y = ax + b)",
            Self::Polynomial => "Fits a quadratic curve by least squares (y = a + bx + cx^2)",
            Self::Exponential => "Models exponential growth or decay (y = a*e^(bx))",
            Self::Logarithmic => "Models logarithmic relationships (y = a + b*ln(x))",
            Self::Power => "Models power relationships (y = a*x^b)",
        }
    }

    /// Case-insensitive lookup by id. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
            .ok_or_else(|| AnalysisError::InvalidInput(format!("unknown model '{}'", s)))
    }
}

/// Fitted parameters, tagged by the functional form they parameterise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Coefficients {
    /// y = slope·x + intercept
    Linear { slope: f64, intercept: f64 },
    /// y = a0 + a1·x + a2·x²
    Quadratic { a0: f64, a1: f64, a2: f64 },
    /// y = a·e^(b·x)
    Exponential { a: f64, b: f64 },
    /// y = a + b·ln(x); x ≤ 0 evaluates to a
    Logarithmic { a: f64, b: f64 },
    /// y = a·x^b; x ≤ 0 evaluates to 0
    Power { a: f64, b: f64 },
    /// y = max(FALLBACK_FLOOR, slope·x + intercept)
    ClampedLinear { slope: f64, intercept: f64 },
}

impl Coefficients {
    /// Evaluates the fitted curve at `x`. Pure and deterministic.
    pub fn predict(&self, x: f64) -> f64 {
        match *self {
            Coefficients::Linear { slope, intercept } => slope * x + intercept,
            Coefficients::Quadratic { a0, a1, a2 } => a0 + a1 * x + a2 * x * x,
            Coefficients::Exponential { a, b } => a * (b * x).exp(),
            Coefficients::Logarithmic { a, b } => {
                if x <= 0.0 {
                    a
                } else {
                    a + b * x.ln()
                }
            }
            Coefficients::Power { a, b } => {
                if x <= 0.0 {
                    0.0
                } else {
                    a * x.powf(b)
                }
            }
            Coefficients::ClampedLinear { slope, intercept } => {
                (slope * x + intercept).max(FALLBACK_FLOOR)
            }
        }
    }

    /// Human-readable equation.
    pub fn equation(&self) -> String {
        match *self {
            Coefficients::Linear { slope, intercept } => {
                format!("y = {:.4}x {}", slope, signed(intercept))
            }
            Coefficients::Quadratic { a0, a1, a2 } => {
                format!("y = {:.4}x^2 {}x {}", a2, signed(a1), signed(a0))
            }
            Coefficients::Exponential { a, b } => format!("y = {:.4}e^({:.4}x)", a, b),
            Coefficients::Logarithmic { a, b } => format!("y = {:.4} {}ln(x)", a, signed(b)),
            Coefficients::Power { a, b } => format!("y = {:.4}x^{:.4}", a, b),
            Coefficients::ClampedLinear { slope, intercept } => format!(
                "y = max({}, {:.4}x {})",
                FALLBACK_FLOOR,
                slope,
                signed(intercept)
            ),
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Coefficients::Linear { slope, intercept }
            | Coefficients::ClampedLinear { slope, intercept } => {
                slope.is_finite() && intercept.is_finite()
            }
            Coefficients::Quadratic { a0, a1, a2 } => {
                a0.is_finite() && a1.is_finite() && a2.is_finite()
            }
            Coefficients::Exponential { a, b }
            | Coefficients::Logarithmic { a, b }
            | Coefficients::Power { a, b } => a.is_finite() && b.is_finite(),
        }
    }
}

fn signed(v: f64) -> String {
    if v.is_sign_negative() {
        format!("- {:.4}", -v)
    } else {
        format!("+ {:.4}", v)
    }
}

/// Goodness-of-fit scores. Serialised with the camelCase names the dashboard used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitMetrics {
    /// 1 − SSR/SST. Negative when the model is worse than predicting the mean.
    pub r_squared: f64,
    pub rmse: f64,
    /// n·ln(SSR/n) + 2·AIC_PARAMETER_COUNT
    pub aic: f64,
    /// Percent change of the prediction from min(x) to max(x).
    pub trend: f64,
}

/// One fitted model: coefficients, scores, and a rendering-only sample of the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    #[serde(rename = "id")]
    pub kind: ModelKind,
    pub coefficients: Coefficients,
    pub metrics: FitMetrics,
    pub points: Vec<(f64, f64)>,
}

impl ModelResult {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.coefficients.predict(x)
    }

    /// (x, actual − predicted) for each observation.
    pub fn residuals(&self, x_values: &[f64], y_values: &[f64]) -> Vec<(f64, f64)> {
        x_values
            .iter()
            .zip(y_values)
            .map(|(&x, &y)| (x, y - self.predict(x)))
            .collect()
    }
}

/// Sampling settings for the rendered curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub point_count: usize,
    pub extrapolation_factor: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            extrapolation_factor: DEFAULT_EXTRAPOLATION_FACTOR,
        }
    }
}

/// Fits the requested models with default options.
///
/// Convenience wrapper around `fit_with_options`.
pub fn fit<S: AsRef<str>>(
    x_values: &[f64],
    y_values: &[f64],
    model_ids: &[S],
) -> Result<Vec<ModelResult>, AnalysisError> {
    fit_with_options(x_values, y_values, model_ids, &FitOptions::default())
}

/// Fits each requested model id, in request order.
///
/// Unknown ids are skipped. Repeated ids are fitted once. A model whose fit fails is
/// omitted without affecting the others.
pub fn fit_with_options<S: AsRef<str>>(
    x_values: &[f64],
    y_values: &[f64],
    model_ids: &[S],
    options: &FitOptions,
) -> Result<Vec<ModelResult>, AnalysisError> {
    let mut kinds: Vec<ModelKind> = Vec::with_capacity(model_ids.len());
    for id in model_ids {
        match ModelKind::from_id(id.as_ref()) {
            Some(kind) => kinds.push(kind),
            None => tracing::debug!(model = id.as_ref(), "skipping unknown model id"),
        }
    }
    fit_models(x_values, y_values, &kinds, options)
}

/// Fits each requested kind, in request order, skipping repeats.
pub fn fit_models(
    x_values: &[f64],
    y_values: &[f64],
    kinds: &[ModelKind],
    options: &FitOptions,
) -> Result<Vec<ModelResult>, AnalysisError> {
    validate_samples(x_values, y_values)?;

    let mut results: Vec<ModelResult> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if results.iter().any(|r| r.kind == kind) {
            continue;
        }
        match fit_coefficients(kind, x_values, y_values) {
            Ok(coefficients) => {
                let predict = |x: f64| coefficients.predict(x);
                let metrics = compute_metrics(x_values, y_values, predict);
                let points = generate_points(x_values, predict, options);
                results.push(ModelResult {
                    kind,
                    coefficients,
                    metrics,
                    points,
                });
            }
            Err(e) => {
                tracing::warn!(model = kind.id(), error = %e, "model fit failed; omitting");
            }
        }
    }
    Ok(results)
}

fn validate_samples(x_values: &[f64], y_values: &[f64]) -> Result<(), AnalysisError> {
    if x_values.is_empty() || y_values.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "x and y values must not be empty".to_string(),
        ));
    }
    if x_values.len() != y_values.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "x and y lengths differ ({} vs {})",
            x_values.len(),
            y_values.len()
        )));
    }
    if x_values
        .iter()
        .chain(y_values)
        .any(|v| !v.is_finite())
    {
        return Err(AnalysisError::InvalidInput(
            "x and y values must be finite numbers".to_string(),
        ));
    }
    Ok(())
}

fn fit_coefficients(kind: ModelKind, x: &[f64], y: &[f64]) -> Result<Coefficients, FitError> {
    let coefficients = match kind {
        ModelKind::Linear => {
            let (slope, intercept) = least_squares_line(x, y)?;
            Coefficients::Linear { slope, intercept }
        }
        ModelKind::Polynomial => {
            let [a0, a1, a2] = least_squares_quadratic(x, y)?;
            Coefficients::Quadratic { a0, a1, a2 }
        }
        ModelKind::Exponential => {
            let (tx, ty): (Vec<f64>, Vec<f64>) = x
                .iter()
                .zip(y)
                .filter(|(_, &yi)| yi > 0.0)
                .map(|(&xi, &yi)| (xi, yi.ln()))
                .unzip();
            if tx.len() < 2 {
                clamped_linear(x, y)?
            } else {
                let (b, ln_a) = least_squares_line(&tx, &ty)?;
                Coefficients::Exponential { a: ln_a.exp(), b }
            }
        }
        ModelKind::Logarithmic => {
            let (tx, ty): (Vec<f64>, Vec<f64>) = x
                .iter()
                .zip(y)
                .filter(|(&xi, _)| xi > 0.0)
                .map(|(&xi, &yi)| (xi.ln(), yi))
                .unzip();
            if tx.len() < 2 {
                let (slope, intercept) = least_squares_line(x, y)?;
                Coefficients::Linear { slope, intercept }
            } else {
                let (b, a) = least_squares_line(&tx, &ty)?;
                Coefficients::Logarithmic { a, b }
            }
        }
        ModelKind::Power => {
            let (tx, ty): (Vec<f64>, Vec<f64>) = x
                .iter()
                .zip(y)
                .filter(|(&xi, &yi)| xi > 0.0 && yi > 0.0)
                .map(|(&xi, &yi)| (xi.ln(), yi.ln()))
                .unzip();
            if tx.len() < 2 {
                clamped_linear(x, y)?
            } else {
                let (b, ln_a) = least_squares_line(&tx, &ty)?;
                Coefficients::Power { a: ln_a.exp(), b }
            }
        }
    };

    if coefficients.is_finite() {
        Ok(coefficients)
    } else {
        Err(FitError::NonFinite)
    }
}

fn clamped_linear(x: &[f64], y: &[f64]) -> Result<Coefficients, FitError> {
    let (slope, intercept) = least_squares_line(x, y)?;
    Ok(Coefficients::ClampedLinear { slope, intercept })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Closed-form ordinary least squares. Returns (slope, intercept).
fn least_squares_line(x: &[f64], y: &[f64]) -> Result<(f64, f64), FitError> {
    let x_mean = mean(x);
    let y_mean = mean(y);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        numerator += (xi - x_mean) * (yi - y_mean);
        denominator += (xi - x_mean) * (xi - x_mean);
    }
    if denominator == 0.0 {
        return Err(FitError::ZeroVariance);
    }

    let slope = numerator / denominator;
    Ok((slope, y_mean - slope * x_mean))
}

/// Degree-2 least squares through the normal equations.
///
/// x is centred and scaled to [-1, 1] before solving, then the coefficients are mapped
/// back to the raw x scale. Returns [a0, a1, a2] for y = a0 + a1·x + a2·x².
fn least_squares_quadratic(x: &[f64], y: &[f64]) -> Result<[f64; 3], FitError> {
    let mut distinct: Vec<f64> = x.to_vec();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(FitError::Singular);
    }

    let center = mean(x);
    let scale = x
        .iter()
        .map(|xi| (xi - center).abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 {
        return Err(FitError::ZeroVariance);
    }

    // Power sums of t and moments of y against t.
    let mut s = [0.0_f64; 5];
    let mut r = [0.0_f64; 3];
    for (&xi, &yi) in x.iter().zip(y) {
        let t = (xi - center) / scale;
        let mut tp = 1.0;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += tp;
            if k < 3 {
                r[k] += tp * yi;
            }
            tp *= t;
        }
    }

    let normal = Matrix3::new(
        s[0], s[1], s[2], //
        s[1], s[2], s[3], //
        s[2], s[3], s[4],
    );
    let inverse = normal.try_inverse().ok_or(FitError::Singular)?;
    let c = inverse * Vector3::new(r[0], r[1], r[2]);

    let (c0, c1, c2) = (c[0], c[1], c[2]);
    let s2 = scale * scale;
    Ok([
        c0 - c1 * center / scale + c2 * center * center / s2,
        c1 / scale - 2.0 * c2 * center / s2,
        c2 / s2,
    ])
}

/// Scores any prediction function against observed samples.
///
/// `x_values` and `y_values` must be non-empty and of equal length.
pub fn compute_metrics<F>(x_values: &[f64], y_values: &[f64], predict: F) -> FitMetrics
where
    F: Fn(f64) -> f64,
{
    let n = x_values.len() as f64;
    let y_mean = mean(y_values);

    let sst: f64 = y_values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ssr: f64 = x_values
        .iter()
        .zip(y_values)
        .map(|(&x, &y)| (y - predict(x)).powi(2))
        .sum();

    let r_squared = 1.0 - ssr / sst;
    let rmse = (ssr / n).sqrt();
    let aic = n * (ssr / n).ln() + 2.0 * AIC_PARAMETER_COUNT as f64;

    let (min_x, max_x) = x_range(x_values);
    let first = predict(min_x);
    let last = predict(max_x);
    let trend = if first.abs() > TREND_EPSILON {
        (last - first) / first.abs() * 100.0
    } else {
        0.0
    };

    FitMetrics {
        r_squared,
        rmse,
        aic,
        trend,
    }
}

/// Evenly spaced samples of `predict` across the observed x range padded on both sides.
pub fn generate_points<F>(x_values: &[f64], predict: F, options: &FitOptions) -> Vec<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    if x_values.is_empty() || options.point_count == 0 {
        return Vec::new();
    }
    let (min_x, max_x) = x_range(x_values);
    let pad = (max_x - min_x) * options.extrapolation_factor;
    let start = min_x - pad;
    let end = max_x + pad;
    let steps = options.point_count.saturating_sub(1).max(1) as f64;

    (0..options.point_count)
        .map(|i| {
            let x = start + (end - start) * (i as f64 / steps);
            (x, predict(x))
        })
        .collect()
}

pub(crate) fn x_range(x_values: &[f64]) -> (f64, f64) {
    x_values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
        (lo.min(x), hi.max(x))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn kind_ids_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(ModelKind::from_id(" LINEAR "), Some(ModelKind::Linear));
        assert_eq!(ModelKind::from_id("cubic"), None);
        assert!("cubic".parse::<ModelKind>().is_err());
    }

    #[test]
    fn line_fit_exact() {
        let (slope, intercept) =
            least_squares_line(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_eq!(slope, 2.0);
        assert_eq!(intercept, 0.0);
    }

    #[test]
    fn line_fit_zero_variance() {
        assert_eq!(
            least_squares_line(&[3.0, 3.0], &[1.0, 2.0]),
            Err(FitError::ZeroVariance)
        );
    }

    #[test]
    fn quadratic_recovers_coefficients() {
        let x: Vec<f64> = (-3..=3).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|x| 3.0 * x * x - 2.0 * x + 1.0).collect();
        let [a0, a1, a2] = least_squares_quadratic(&x, &y).unwrap();
        assert!(close(a0, 1.0, 1e-9));
        assert!(close(a1, -2.0, 1e-9));
        assert!(close(a2, 3.0, 1e-9));
    }

    #[test]
    fn quadratic_with_offset_x() {
        let x: Vec<f64> = (2000..2012).map(f64::from).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|x| 0.5 * (x - 2005.0).powi(2) + 10.0)
            .collect();
        let [a0, a1, a2] = least_squares_quadratic(&x, &y).unwrap();
        let c = Coefficients::Quadratic { a0, a1, a2 };
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!(close(c.predict(xi), yi, 1e-4));
        }
    }

    #[test]
    fn quadratic_needs_three_distinct_x() {
        assert_eq!(
            least_squares_quadratic(&[1.0, 1.0, 2.0, 2.0], &[1.0, 2.0, 3.0, 4.0]),
            Err(FitError::Singular)
        );
    }

    #[test]
    fn predict_domain_guards() {
        let log = Coefficients::Logarithmic { a: 2.0, b: 1.0 };
        assert_eq!(log.predict(0.0), 2.0);
        assert_eq!(log.predict(-5.0), 2.0);
        let pow = Coefficients::Power { a: 2.0, b: 2.0 };
        assert_eq!(pow.predict(-1.0), 0.0);
        assert_eq!(pow.predict(3.0), 18.0);
        let clamped = Coefficients::ClampedLinear {
            slope: -1.0,
            intercept: 0.0,
        };
        assert_eq!(clamped.predict(10.0), FALLBACK_FLOOR);
    }

    #[test]
    fn exponential_falls_back_when_y_not_positive() {
        let c = fit_coefficients(
            ModelKind::Exponential,
            &[1.0, 2.0, 3.0],
            &[-1.0, -2.0, 4.0],
        )
        .unwrap();
        assert!(matches!(c, Coefficients::ClampedLinear { .. }));
    }

    #[test]
    fn logarithmic_falls_back_to_plain_line() {
        let c = fit_coefficients(
            ModelKind::Logarithmic,
            &[-2.0, -1.0, 0.0],
            &[1.0, 2.0, 3.0],
        )
        .unwrap();
        assert_eq!(
            c,
            Coefficients::Linear {
                slope: 1.0,
                intercept: 3.0
            }
        );
    }

    #[test]
    fn metrics_trend_and_aic() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 5.0, 7.0, 9.0, 12.0];
        let m = compute_metrics(&x, &y, |x| 2.0 * x + 1.0);
        // predictions 3..11, trend = (11 - 3) / 3 * 100
        assert!(close(m.trend, 800.0 / 3.0, 1e-9));
        let ssr = 1.0;
        assert!(close(m.rmse, (ssr / 5.0_f64).sqrt(), 1e-12));
        assert!(close(m.aic, 5.0 * (ssr / 5.0_f64).ln() + 6.0, 1e-12));
    }

    #[test]
    fn trend_is_zero_near_zero_start() {
        let m = compute_metrics(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0], |x| 2.0 * x);
        assert_eq!(m.trend, 0.0);
    }

    #[test]
    fn points_span_padded_range() {
        let opts = FitOptions::default();
        let pts = generate_points(&[0.0, 10.0], |x| x, &opts);
        assert_eq!(pts.len(), DEFAULT_POINT_COUNT);
        assert!(close(pts[0].0, -2.0, 1e-12));
        assert!(close(pts[DEFAULT_POINT_COUNT - 1].0, 12.0, 1e-12));
    }

    #[test]
    fn single_point_option() {
        let opts = FitOptions {
            point_count: 1,
            extrapolation_factor: 0.0,
        };
        let pts = generate_points(&[1.0, 3.0], |x| x, &opts);
        assert_eq!(pts, vec![(1.0, 1.0)]);
    }

    #[test]
    fn duplicate_ids_fit_once() {
        let x = [1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0];
        let results = fit(&x, &y, &["linear", "LINEAR", "linear"]).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn non_finite_samples_rejected() {
        let err = fit(&[1.0, f64::NAN], &[1.0, 2.0], &["linear"]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn failed_model_is_omitted() {
        // two distinct x values: quadratic is singular, linear is fine
        let results = fit(
            &[1.0, 2.0, 1.0, 2.0],
            &[1.0, 2.0, 1.5, 2.5],
            &["polynomial", "linear"],
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ModelKind::Linear);
    }

    #[test]
    fn residuals_are_actual_minus_predicted() {
        let r = ModelResult {
            kind: ModelKind::Linear,
            coefficients: Coefficients::Linear {
                slope: 1.0,
                intercept: 0.0,
            },
            metrics: compute_metrics(&[1.0, 2.0], &[1.0, 2.0], |x| x),
            points: Vec::new(),
        };
        assert_eq!(
            r.residuals(&[1.0, 2.0], &[1.5, 1.0]),
            vec![(1.0, 0.5), (2.0, -1.0)]
        );
    }

    #[test]
    fn equation_formatting() {
        let c = Coefficients::Linear {
            slope: 2.0,
            intercept: -1.0,
        };
        assert_eq!(c.equation(), "y = 2.0000x - 1.0000");
    }
}
