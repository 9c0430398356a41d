//! Trend analysis over two columns of a CSV file.
//!
//! The pipeline runs strictly forward: [`ingest`] parses CSV into a [`Dataset`],
//! [`cleaning`] optionally replaces it with a cleaned copy, [`models`] fits curve
//! families to an (x, y) pair, and [`forecast`] picks the best fit and projects it.
//! [`AnalysisSession`] ties the stages together for interactive use.

pub mod chart_data;
pub mod chart_export;
pub mod cleaning;
pub mod config;
pub mod dataset;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod report;
pub mod session;
pub mod source;

pub use chart_data::{ChartData, ChartSeries, SeriesStyle};
pub use chart_export::{export_chart, ChartExportFormat};
pub use cleaning::{handle_missing_values, remove_outliers, MissingValueStrategy};
pub use config::{AppConfig, ConfigManager};
pub use dataset::{summarize, ColumnType, Dataset, DatasetSummary, Value};
pub use error::AnalysisError;
pub use forecast::{forecast, rank_models, select_best, Forecast, TrendDirection};
pub use ingest::{export_csv, parse_csv, parse_csv_bytes, write_csv, IngestOptions};
pub use models::{
    fit, fit_models, fit_with_options, Coefficients, FitMetrics, FitOptions, ModelKind,
    ModelResult,
};
pub use report::AnalysisReport;
pub use session::AnalysisSession;

/// Re-export CLI definitions shared with the build script and docs generator
pub use trendlens_cli::{Args, ChartFormatArg, CompressionFormat, MissingStrategyArg};

/// Application name used for the config directory
pub const APP_NAME: &str = "trendlens";

impl From<MissingStrategyArg> for MissingValueStrategy {
    fn from(arg: MissingStrategyArg) -> Self {
        match arg {
            MissingStrategyArg::Drop => MissingValueStrategy::Drop,
            MissingStrategyArg::Mean => MissingValueStrategy::Mean,
            MissingStrategyArg::Zero => MissingValueStrategy::Zero,
        }
    }
}

impl From<ChartFormatArg> for ChartExportFormat {
    fn from(arg: ChartFormatArg) -> Self {
        match arg {
            ChartFormatArg::Png => ChartExportFormat::Png,
            ChartFormatArg::Eps => ChartExportFormat::Eps,
        }
    }
}
