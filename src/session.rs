//! Analysis session state.
//!
//! `AnalysisSession` is the single owner of everything an interactive front end tracks
//! between user actions: the dataset and its history, the chosen columns and models, the
//! last set of fitted results, and the display set. Fitted results are replaced
//! wholesale whenever an input they depend on changes.

use crate::cleaning::{self, MissingValueStrategy, DEFAULT_IQR_MULTIPLIER};
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::forecast::{self, Forecast, DEFAULT_FORECAST_HORIZON};
use crate::ingest::{self, IngestOptions};
use crate::models::{self, FitOptions, ModelKind, ModelResult};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    dataset: Option<Dataset>,
    undo_stack: Vec<Dataset>,
    redo_stack: Vec<Dataset>,
    independent: Option<String>,
    dependent: Option<String>,
    models: Vec<ModelKind>,
    results: Vec<ModelResult>,
    /// Samples the current results were fitted on.
    samples: (Vec<f64>, Vec<f64>),
    best: Option<ModelKind>,
    display: Vec<ModelKind>,
    horizon: usize,
    ingest_options: IngestOptions,
    fit_options: FitOptions,
    iqr_multiplier: f64,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self {
            dataset: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            independent: None,
            dependent: None,
            models: ModelKind::DEFAULT_SELECTION.to_vec(),
            results: Vec::new(),
            samples: (Vec::new(), Vec::new()),
            best: None,
            display: Vec::new(),
            horizon: DEFAULT_FORECAST_HORIZON,
            ingest_options: IngestOptions::default(),
            fit_options: FitOptions::default(),
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ingest_options(mut self, options: IngestOptions) -> Self {
        self.ingest_options = options;
        self
    }

    pub fn with_fit_options(mut self, options: FitOptions) -> Self {
        self.fit_options = options;
        self
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        self.dataset.as_ref().map(|d| d.columns()).unwrap_or(&[])
    }

    pub fn independent_variable(&self) -> Option<&str> {
        self.independent.as_deref()
    }

    pub fn dependent_variable(&self) -> Option<&str> {
        self.dependent.as_deref()
    }

    pub fn models(&self) -> &[ModelKind] {
        &self.models
    }

    pub fn results(&self) -> &[ModelResult] {
        &self.results
    }

    /// (x, y) samples of the last successful run.
    pub fn samples(&self) -> (&[f64], &[f64]) {
        (&self.samples.0, &self.samples.1)
    }

    pub fn best_model(&self) -> Option<&ModelResult> {
        let best = self.best?;
        self.results.iter().find(|r| r.kind == best)
    }

    pub fn best_model_id(&self) -> Option<ModelKind> {
        self.best
    }

    pub fn displayed(&self) -> &[ModelKind] {
        &self.display
    }

    pub fn forecast_horizon(&self) -> usize {
        self.horizon
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Parses CSV text and makes it the current dataset. History is cleared and any
    /// chosen variable that no longer exists is unset.
    pub fn load_csv(&mut self, text: &str) -> Result<&Dataset, AnalysisError> {
        self.load_bytes(text.as_bytes())
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&Dataset, AnalysisError> {
        let dataset = ingest::parse_csv_bytes(bytes, &self.ingest_options)?;
        Ok(self.load_dataset(dataset))
    }

    pub fn load_dataset(&mut self, dataset: Dataset) -> &Dataset {
        if self
            .independent
            .as_deref()
            .is_some_and(|c| !dataset.has_column(c))
        {
            self.independent = None;
        }
        if self
            .dependent
            .as_deref()
            .is_some_and(|c| !dataset.has_column(c))
        {
            self.dependent = None;
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clear_results();
        self.dataset.insert(dataset)
    }

    /// Chooses the independent (x) and dependent (y) columns.
    pub fn set_variables(&mut self, independent: &str, dependent: &str) -> Result<(), AnalysisError> {
        let dataset = self.require_dataset()?;
        for column in [independent, dependent] {
            if !dataset.has_column(column) {
                return Err(AnalysisError::InvalidInput(format!(
                    "unknown column '{}'",
                    column
                )));
            }
        }
        if self.independent.as_deref() != Some(independent)
            || self.dependent.as_deref() != Some(dependent)
        {
            self.independent = Some(independent.to_string());
            self.dependent = Some(dependent.to_string());
            self.clear_results();
        }
        Ok(())
    }

    /// Replaces the requested model kinds. Repeats are dropped, order is kept.
    pub fn set_models(&mut self, kinds: &[ModelKind]) {
        let mut models: Vec<ModelKind> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if !models.contains(&kind) {
                models.push(kind);
            }
        }
        if models != self.models {
            self.models = models;
            self.clear_results();
        }
    }

    /// Adds or removes one requested model kind. Returns whether it is now requested.
    pub fn toggle_model(&mut self, kind: ModelKind) -> bool {
        let requested = if let Some(pos) = self.models.iter().position(|k| *k == kind) {
            self.models.remove(pos);
            false
        } else {
            self.models.push(kind);
            true
        };
        self.clear_results();
        requested
    }

    /// Fits every requested model and selects the best one. The display set is reset
    /// to the best model alone.
    pub fn run_analysis(&mut self) -> Result<&[ModelResult], AnalysisError> {
        let dataset = self.require_dataset()?;
        let (Some(x_col), Some(y_col)) = (self.independent.as_deref(), self.dependent.as_deref())
        else {
            return Err(AnalysisError::InvalidInput(
                "choose both an independent and a dependent variable".to_string(),
            ));
        };
        if self.models.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "choose at least one model".to_string(),
            ));
        }

        let (x, y) = dataset.numeric_pairs(x_col, y_col)?;
        let results = models::fit_models(&x, &y, &self.models, &self.fit_options)?;
        let best = forecast::select_best(&results).map(|r| r.kind);

        tracing::debug!(
            samples = x.len(),
            fitted = results.len(),
            best = best.map(ModelKind::id),
            "analysis complete"
        );

        self.results = results;
        self.samples = (x, y);
        self.best = best;
        self.display = best.into_iter().collect();
        Ok(&self.results)
    }

    /// Applies a missing-value strategy to the current dataset.
    pub fn handle_missing_values(
        &mut self,
        strategy: MissingValueStrategy,
    ) -> Result<&Dataset, AnalysisError> {
        let cleaned = cleaning::handle_missing_values(self.require_dataset()?, strategy);
        Ok(self.replace_dataset(cleaned))
    }

    /// Drops rows whose dependent-variable value is an IQR outlier.
    pub fn remove_outliers(&mut self) -> Result<&Dataset, AnalysisError> {
        let column = self.dependent.as_deref().ok_or_else(|| {
            AnalysisError::InvalidInput("choose a dependent variable first".to_string())
        })?;
        let cleaned = cleaning::remove_outliers_with_multiplier(
            self.require_dataset()?,
            column,
            self.iqr_multiplier,
        )?;
        Ok(self.replace_dataset(cleaned))
    }

    /// Shows or hides a fitted model. Returns whether it is now displayed; kinds with
    /// no fitted result are never displayed.
    pub fn toggle_display(&mut self, kind: ModelKind) -> bool {
        if let Some(pos) = self.display.iter().position(|k| *k == kind) {
            self.display.remove(pos);
            return false;
        }
        if self.results.iter().any(|r| r.kind == kind) {
            self.display.push(kind);
            return true;
        }
        false
    }

    /// Sets the forecast horizon. Fitted results are left untouched.
    pub fn set_forecast_horizon(&mut self, horizon: usize) -> Result<(), AnalysisError> {
        if horizon == 0 {
            return Err(AnalysisError::InvalidInput(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        self.horizon = horizon;
        Ok(())
    }

    /// Forecast from the best model of the last run.
    pub fn forecast(&self) -> Result<Forecast, AnalysisError> {
        let best = self.best_model().ok_or_else(|| {
            AnalysisError::InvalidInput("no fitted model to forecast from".to_string())
        })?;
        forecast::forecast(best, &self.samples.0, &self.samples.1, self.horizon)
    }

    /// Writes the current (possibly cleaned) dataset as CSV, using the session delimiter.
    pub fn export_csv(&self, path: &Path) -> color_eyre::Result<()> {
        let dataset = self.require_dataset()?;
        ingest::export_csv(dataset, path, &self.ingest_options)
    }

    /// Restores the dataset from before the last cleaning step.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.dataset.replace(previous) {
            self.redo_stack.push(current);
        }
        self.clear_results();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.dataset.replace(next) {
            self.undo_stack.push(current);
        }
        self.clear_results();
        true
    }

    fn require_dataset(&self) -> Result<&Dataset, AnalysisError> {
        self.dataset
            .as_ref()
            .ok_or_else(|| AnalysisError::InvalidInput("no dataset loaded".to_string()))
    }

    fn replace_dataset(&mut self, dataset: Dataset) -> &Dataset {
        if let Some(previous) = self.dataset.take() {
            self.undo_stack.push(previous);
        }
        self.redo_stack.clear();
        self.clear_results();
        self.dataset.insert(dataset)
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.samples = (Vec::new(), Vec::new());
        self.best = None;
        self.display.clear();
    }
}
