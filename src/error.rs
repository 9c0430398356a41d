//! Pipeline error taxonomy and user-facing messages.
//!
//! Only two conditions escape the pipeline: a file that cannot be ingested and a request
//! that cannot be analysed with the current selections. Per-model fit failures stay inside
//! the fitting engine.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Malformed or empty CSV. Unrecoverable for that file.
    #[error("parse error: {0}")]
    Parse(String),

    /// Mismatched or empty x/y arrays, unknown column references, or an invalid setting.
    /// Recoverable by changing the selections.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Parse(detail) => format!("Cannot use this file: {}", detail),
            AnalysisError::InvalidInput(detail) => format!(
                "Cannot run this analysis with current selections: {}",
                detail
            ),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, AnalysisError::Parse(_))
    }
}

/// Maps a polars CSV reader failure to a parse error with a readable detail.
pub(crate) fn parse_error_from_polars(err: &PolarsError) -> AnalysisError {
    use polars::prelude::PolarsError as PE;

    let detail = match err {
        PE::NoData(msg) => format!("no data: {}", msg),
        PE::ComputeError(msg) => msg.to_string(),
        PE::SchemaMismatch(msg) => format!("schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("row shape mismatch: {}", msg),
        PE::Duplicate(msg) => format!("duplicate column: {}", msg),
        PE::IO { error, .. } => format!("I/O error: {}", error),
        PE::Context { error, msg } => {
            let inner = parse_error_from_polars(error);
            let inner = match inner {
                AnalysisError::Parse(s) | AnalysisError::InvalidInput(s) => s,
            };
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    };
    AnalysisError::Parse(detail)
}

/// Failure to fit one model kind. Never surfaced: the model is omitted from the results.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum FitError {
    #[error("x values have zero variance")]
    ZeroVariance,

    #[error("normal equations are singular")]
    Singular,

    #[error("fit produced non-finite coefficients")]
    NonFinite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_name_the_recovery() {
        let parse = AnalysisError::Parse("empty".into());
        assert!(parse.user_message().starts_with("Cannot use this file"));
        assert!(parse.is_parse());

        let input = AnalysisError::InvalidInput("unknown column 'q'".into());
        assert!(input
            .user_message()
            .starts_with("Cannot run this analysis with current selections"));
        assert!(!input.is_parse());
    }

    #[test]
    fn polars_no_data_maps_to_parse() {
        let err = PolarsError::NoData("empty CSV".into());
        let mapped = parse_error_from_polars(&err);
        assert_eq!(mapped, AnalysisError::Parse("no data: empty CSV".into()));
    }
}
