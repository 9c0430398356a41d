//! Analysis report: one serialisable snapshot of a finished run.

use serde::Serialize;
use std::fmt;

use crate::dataset::{summarize, DatasetSummary};
use crate::error::AnalysisError;
use crate::forecast::{rank_models, Forecast};
use crate::models::{ModelKind, ModelResult};
use crate::session::AnalysisSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub summary: DatasetSummary,
    pub independent_variable: String,
    pub dependent_variable: String,
    pub sample_count: usize,
    /// Ranked by descending r².
    pub models: Vec<ModelResult>,
    pub best_model: Option<ModelKind>,
    pub forecast: Option<Forecast>,
}

impl AnalysisReport {
    /// Snapshot of a session after `run_analysis`.
    pub fn from_session(
        session: &AnalysisSession,
        source: Option<&str>,
    ) -> Result<Self, AnalysisError> {
        let dataset = session
            .dataset()
            .ok_or_else(|| AnalysisError::InvalidInput("no dataset loaded".to_string()))?;
        let (Some(x), Some(y)) = (session.independent_variable(), session.dependent_variable())
        else {
            return Err(AnalysisError::InvalidInput(
                "choose both an independent and a dependent variable".to_string(),
            ));
        };

        let forecast = match session.best_model() {
            Some(_) => Some(session.forecast()?),
            None => None,
        };

        Ok(Self {
            source: source.map(str::to_string),
            summary: summarize(dataset),
            independent_variable: x.to_string(),
            dependent_variable: y.to_string(),
            sample_count: session.samples().0.len(),
            models: rank_models(session.results()).into_iter().cloned().collect(),
            best_model: session.best_model_id(),
            forecast,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            writeln!(f, "Source: {}", source)?;
        }
        writeln!(
            f,
            "Rows: {}  Columns: {}  Missing cells: {}",
            self.summary.row_count, self.summary.column_count, self.summary.missing_values
        )?;
        let types: Vec<String> = self
            .summary
            .column_types
            .iter()
            .map(|(name, ty)| format!("{} ({})", name, ty))
            .collect();
        writeln!(f, "Column types: {}", types.join(", "))?;
        writeln!(
            f,
            "Analysis: {} vs {} ({} samples)",
            self.dependent_variable, self.independent_variable, self.sample_count
        )?;
        writeln!(f)?;

        if self.models.is_empty() {
            return writeln!(f, "No model could be fitted to the selected columns.");
        }

        writeln!(
            f,
            "{:<26} {:>10} {:>12} {:>12} {:>10}",
            "Model", "R^2", "RMSE", "AIC", "Trend %"
        )?;
        for model in &self.models {
            let marker = if Some(model.kind) == self.best_model {
                " *"
            } else {
                ""
            };
            writeln!(
                f,
                "{:<26} {:>10.4} {:>12.4} {:>12.4} {:>10.2}",
                format!("{}{}", model.name(), marker),
                model.metrics.r_squared,
                model.metrics.rmse,
                model.metrics.aic,
                model.metrics.trend
            )?;
            writeln!(f, "    {}", model.coefficients.equation())?;
        }

        if let Some(forecast) = &self.forecast {
            writeln!(f)?;
            writeln!(
                f,
                "Forecast ({}, horizon {})",
                forecast.model.name(),
                forecast.horizon
            )?;
            writeln!(
                f,
                "  Last data point:  x = {:.2}, y = {:.2}",
                forecast.last_x, forecast.last_value
            )?;
            writeln!(
                f,
                "  Predicted next:   x = {:.2}, y = {:.2}",
                forecast.next_x, forecast.predicted_next
            )?;
            writeln!(f, "  Trend direction:  {}", forecast.trend)?;
            writeln!(f, "  Confidence:       {:.1}%", forecast.confidence)?;
            let projected: Vec<String> = forecast
                .projections
                .iter()
                .map(|(x, y)| format!("({:.2}, {:.2})", x, y))
                .collect();
            writeln!(f, "  Projections:      {}", projected.join(" "))?;
        }
        Ok(())
    }
}
