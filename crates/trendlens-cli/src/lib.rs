//! Command-line surface of trendlens, kept in its own crate so the build script
//! can render the man page and `gen_docs` can print the options reference.

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Compression wrapped around an input CSV
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// gzip (.gz)
    Gzip,
    /// Zstandard (.zst)
    Zstd,
    /// bzip2 (.bz2)
    Bzip2,
    /// xz / LZMA (.xz)
    Xz,
}

impl CompressionFormat {
    /// Compression implied by the last extension of `path`.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "gz" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

/// How to treat missing cells before fitting
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MissingStrategyArg {
    /// Remove every row that has an empty cell
    Drop,
    /// Fill gaps with the column mean
    Mean,
    /// Fill gaps with 0
    Zero,
}

/// Image format for --chart
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartFormatArg {
    /// Portable Network Graphics
    Png,
    /// Encapsulated PostScript
    Eps,
}

impl ChartFormatArg {
    /// Format implied by a file extension, if any.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "eps" | "ps" => Some(Self::Eps),
            _ => None,
        }
    }
}

/// Command-line arguments for trendlens
#[derive(Clone, Parser, Debug)]
#[command(
    name = "trendlens",
    version,
    about = "Fit trend models to CSV columns and forecast ahead",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the CSV file to analyse (not required with --generate-config)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Independent variable (x) column
    #[arg(short = 'x', long = "x", value_name = "COL", required_unless_present = "generate_config")]
    pub x: Option<String>,

    /// Dependent variable (y) column
    #[arg(short = 'y', long = "y", value_name = "COL", required_unless_present = "generate_config")]
    pub y: Option<String>,

    /// Comma-separated models to fit (linear, polynomial, exponential, logarithmic, power).
    /// Unknown names are ignored. Defaults to config [analysis] default_models.
    #[arg(short = 'm', long = "models", value_name = "MODELS", value_delimiter = ',')]
    pub models: Vec<String>,

    /// Handle missing values before fitting
    #[arg(long = "missing", value_enum, value_name = "STRATEGY")]
    pub missing: Option<MissingStrategyArg>,

    /// Drop rows whose y value is an IQR outlier before fitting
    #[arg(long = "remove-outliers", action)]
    pub remove_outliers: bool,

    /// Number of steps to forecast past the last observation (default: 5)
    #[arg(long = "horizon", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub horizon: Option<u32>,

    /// Print the report as JSON instead of a table
    #[arg(long = "json", action)]
    pub json: bool,

    /// Write a chart of the data, fitted curves and forecast to this file
    #[arg(long = "chart", value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Write the dataset, after any cleaning, to this CSV file
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Chart image format. By default it is taken from the --chart extension, falling back to png
    #[arg(long = "chart-format", value_enum, requires = "chart")]
    pub chart_format: Option<ChartFormatArg>,

    /// Compression of the input file. Detected from the extension when omitted
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Field separator as a byte value (e.g. 59 for ';'). Defaults to comma
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Log filter (e.g. warn, debug, trendlens=trace). RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write a commented default config to ~/.config/trendlens/config.toml and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing config file (with --generate-config)
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// Chart format from --chart-format, else the --chart extension, else png.
    pub fn resolved_chart_format(&self) -> ChartFormatArg {
        self.chart_format
            .or_else(|| self.chart.as_deref().and_then(ChartFormatArg::from_extension))
            .unwrap_or(ChartFormatArg::Png)
    }
}

fn table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_names(arg: &clap::Arg) -> Option<String> {
    let names = arg.get_value_names()?;
    Some(
        names
            .iter()
            .map(|n| format!("<{}>", n.as_str()))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Flag spelling as shown in the docs, e.g. `-x, --x <COL>`.
fn flag_spelling(arg: &clap::Arg) -> String {
    let mut spelling = [
        arg.get_short().map(|s| format!("-{s}")),
        arg.get_long().map(|l| format!("--{l}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    if arg.get_action().takes_values() {
        if let Some(names) = value_names(arg) {
            spelling.push(' ');
            spelling.push_str(&names);
        }
    }
    spelling
}

/// Accepted values for enum-valued options, comma separated.
fn accepted_values(arg: &clap::Arg) -> String {
    if !arg.get_action().takes_values() {
        return "-".to_string();
    }
    let values: Vec<String> = arg
        .get_possible_values()
        .iter()
        .filter(|v| !v.is_hide_set())
        .map(|v| format!("`{}`", v.get_name()))
        .collect();
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Markdown reference for the command line: usage, positional arguments, then options.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");
    out.push_str(&format!("```\n{}\n```\n\n", cmd.render_usage()));

    let help_of = |arg: &clap::Arg| {
        arg.get_help()
            .map(|h| table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string())
    };

    out.push_str("## Arguments\n\n| Argument | Description |\n|----------|-------------|\n");
    for arg in cmd.get_positionals() {
        let name = value_names(arg).unwrap_or_else(|| arg.get_id().to_string());
        out.push_str(&format!("| `{}` | {} |\n", name, help_of(arg)));
    }

    out.push_str("\n## Options\n\n| Option | Values | Description |\n|--------|--------|-------------|\n");
    for arg in cmd.get_opts().chain(
        cmd.get_arguments()
            .filter(|a| !a.is_positional() && !a.get_action().takes_values()),
    ) {
        if matches!(arg.get_id().as_str(), "help" | "version") {
            continue;
        }
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            flag_spelling(arg),
            accepted_values(arg),
            help_of(arg)
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("file.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("file.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("file.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("file.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("file.csv")), None);
        assert_eq!(CompressionFormat::from_extension(Path::new("file")), None);
    }

    #[test]
    fn test_args_verify() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "trendlens",
            "sales.csv",
            "--x",
            "month",
            "--y",
            "revenue",
            "--models",
            "linear,power",
            "--missing",
            "mean",
            "--horizon",
            "3",
            "-o",
            "clean.csv",
            "--chart",
            "out.eps",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("sales.csv")));
        assert_eq!(args.models, vec!["linear", "power"]);
        assert_eq!(args.missing, Some(MissingStrategyArg::Mean));
        assert_eq!(args.horizon, Some(3));
        assert_eq!(args.output, Some(PathBuf::from("clean.csv")));
        assert_eq!(args.resolved_chart_format(), ChartFormatArg::Eps);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result =
            Args::try_parse_from(["trendlens", "a.csv", "-x", "a", "-y", "b", "--horizon", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_config_needs_no_path() {
        let args = Args::try_parse_from(["trendlens", "--generate-config", "--force"]).unwrap();
        assert!(args.generate_config && args.force);
        assert!(args.path.is_none());
    }

    #[test]
    fn test_markdown_lists_options() {
        let md = render_options_markdown();
        assert!(md.contains("`--remove-outliers`"));
        assert!(md.contains("`-x, --x <COL>`"));
        assert!(md.contains("`drop`, `mean`, `zero`"));
        assert!(md.contains("| `<PATH>` |"));
    }
}
