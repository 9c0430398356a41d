mod common;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use common::SALES_CSV;
use trendlens::{
    parse_csv_bytes, AnalysisError, AnalysisReport, AnalysisSession, IngestOptions,
    MissingValueStrategy, ModelKind, TrendDirection, Value,
};

fn sales_session() -> Result<AnalysisSession> {
    let mut session = AnalysisSession::new();
    session.load_csv(SALES_CSV)?;
    session.set_variables("month", "sales")?;
    Ok(session)
}

#[test]
fn test_default_models_and_horizon() {
    let session = AnalysisSession::new();
    assert_eq!(
        session.models(),
        &[
            ModelKind::Linear,
            ModelKind::Polynomial,
            ModelKind::Exponential
        ]
    );
    assert_eq!(session.forecast_horizon(), 5);
}

#[test]
fn test_unknown_column_is_invalid_input() -> Result<()> {
    let mut session = AnalysisSession::new();
    session.load_csv(SALES_CSV)?;
    let err = session.set_variables("month", "profit").unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
    assert!(err
        .user_message()
        .starts_with("Cannot run this analysis with current selections"));
    Ok(())
}

#[test]
fn test_best_model_has_highest_r_squared() -> Result<()> {
    let mut session = sales_session()?;
    session.set_models(&ModelKind::ALL);
    session.run_analysis()?;
    let best = session.best_model().ok_or_else(|| eyre!("no best model"))?;
    assert!(session
        .results()
        .iter()
        .all(|r| r.metrics.r_squared <= best.metrics.r_squared));
    assert_eq!(session.displayed(), &[best.kind]);
    Ok(())
}

#[test]
fn test_forecast_after_cleaning() -> Result<()> {
    let mut session = sales_session()?;
    session.remove_outliers()?;
    session.set_models(&[ModelKind::Exponential]);
    session.set_forecast_horizon(3)?;
    session.run_analysis()?;

    let forecast = session.forecast()?;
    assert_eq!(forecast.model, ModelKind::Exponential);
    assert_eq!(forecast.last_x, 7.0);
    assert_eq!(forecast.last_value, 177.0);
    assert_eq!(forecast.trend, TrendDirection::Increasing);
    assert!(forecast.predicted_next > 177.0);
    assert_eq!(forecast.projections.len(), 3);
    assert!(forecast.confidence > 99.0);
    Ok(())
}

#[test]
fn test_cleaning_discards_results_and_undo_restores() -> Result<()> {
    let mut session = sales_session()?;
    session.run_analysis()?;
    assert!(!session.results().is_empty());

    session.handle_missing_values(MissingValueStrategy::Drop)?;
    assert!(session.results().is_empty());
    assert!(session.can_undo());

    session.remove_outliers()?;
    assert_eq!(session.dataset().map(|d| d.len()), Some(7));
    assert!(session.undo());
    assert_eq!(session.dataset().map(|d| d.len()), Some(8));
    assert!(session.undo());
    assert!(!session.undo());
    assert!(session.redo());
    assert!(session.redo());
    assert_eq!(session.dataset().map(|d| d.len()), Some(7));
    Ok(())
}

#[test]
fn test_forecast_without_run_is_invalid() -> Result<()> {
    let session = sales_session()?;
    assert!(matches!(
        session.forecast(),
        Err(AnalysisError::InvalidInput(_))
    ));
    Ok(())
}

#[test]
fn test_cleaned_dataset_exports_as_csv() -> Result<()> {
    let options = IngestOptions::default().with_delimiter(b';');
    let mut session = AnalysisSession::new().with_ingest_options(options);
    session.load_csv("x;y;note\n1;2;a\n2;;\"b;c\"\n3;6;d\n")?;
    session.handle_missing_values(MissingValueStrategy::Mean)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("clean.csv");
    session.export_csv(&path)?;

    let written = std::fs::read(&path)?;
    let reread = parse_csv_bytes(&written, &options)?;
    assert_eq!(Some(&reread), session.dataset());
    assert_eq!(reread.value(1, "y"), Some(&Value::Number(4.0)));
    assert_eq!(reread.value(1, "note"), Some(&Value::Number(0.0)));
    Ok(())
}

#[test]
fn test_export_without_dataset_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let session = AnalysisSession::new();
    assert!(session.export_csv(&dir.path().join("out.csv")).is_err());
}

#[test]
fn test_report_json_round_trip_fields() -> Result<()> {
    let mut session = sales_session()?;
    session.run_analysis()?;
    let report = AnalysisReport::from_session(&session, Some("sales.csv"))?;

    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
    assert_eq!(json["source"], "sales.csv");
    assert_eq!(json["dependentVariable"], "sales");
    assert_eq!(json["summary"]["columnCount"], 3);
    assert_eq!(json["models"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["bestModel"], json["models"][0]["id"]);
    assert_eq!(json["forecast"]["horizon"], 5);
    assert_eq!(
        json["models"][0]["points"].as_array().map(Vec::len),
        Some(100)
    );
    Ok(())
}
