use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use trendlens::{
    source, AnalysisError, AnalysisReport, AnalysisSession, AppConfig, Args, ChartData,
    ConfigManager, IngestOptions, ModelKind, APP_NAME,
};

/// Stdout is reserved for the JSON report when `--json` is given, so no subscriber is set.
fn init_logging(args: &Args, config: &AppConfig) {
    if args.json {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Configuration written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

/// Requested model kinds: `--models` when given (unknown names ignored), else config.
fn requested_models(args: &Args, config: &AppConfig) -> Vec<ModelKind> {
    if args.models.is_empty() {
        return config.analysis.default_models.clone();
    }
    args.models
        .iter()
        .filter_map(|id| {
            let kind = ModelKind::from_id(id);
            if kind.is_none() {
                tracing::warn!(model = id.as_str(), "ignoring unknown model");
            }
            kind
        })
        .collect()
}

fn analysis_error(err: AnalysisError) -> color_eyre::Report {
    eyre!(err.user_message())
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("a CSV file path is required"))?;
    let (Some(x), Some(y)) = (args.x.as_deref(), args.y.as_deref()) else {
        return Err(eyre!("both --x and --y are required"));
    };

    let mut ingest = IngestOptions::default();
    if let Some(delimiter) = args.delimiter.or(config.file_loading.delimiter) {
        ingest = ingest.with_delimiter(delimiter);
    }

    let mut session = AnalysisSession::new()
        .with_ingest_options(ingest)
        .with_fit_options(config.fit_options())
        .with_iqr_multiplier(config.cleaning.iqr_multiplier);

    let bytes = source::read_source(path, args.compression)?;
    session.load_bytes(&bytes).map_err(analysis_error)?;
    session.set_variables(x, y).map_err(analysis_error)?;
    session.set_models(&requested_models(args, config));

    if let Some(strategy) = args.missing {
        session
            .handle_missing_values(strategy.into())
            .map_err(analysis_error)?;
    }
    if args.remove_outliers {
        session.remove_outliers().map_err(analysis_error)?;
    }

    if let Some(output) = &args.output {
        session.export_csv(output)?;
        if !args.json {
            println!("Cleaned data written to {}", output.display());
        }
    }

    let horizon = args
        .horizon
        .map(|h| h as usize)
        .unwrap_or(config.analysis.forecast_horizon);
    session
        .set_forecast_horizon(horizon)
        .map_err(analysis_error)?;

    session.run_analysis().map_err(analysis_error)?;

    let source_name = path.display().to_string();
    let report =
        AnalysisReport::from_session(&session, Some(&source_name)).map_err(analysis_error)?;
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }

    if let Some(chart_path) = &args.chart {
        let data = ChartData::from_session(&session).map_err(analysis_error)?;
        trendlens::export_chart(
            chart_path,
            args.resolved_chart_format().into(),
            &data,
            (config.chart.width, config.chart.height),
        )?;
        if !args.json {
            println!("\nChart written to {}", chart_path.display());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let config = AppConfig::load(APP_NAME)?;
    init_logging(&args, &config);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
