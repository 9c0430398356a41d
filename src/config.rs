use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::cleaning::DEFAULT_IQR_MULTIPLIER;
use crate::forecast::DEFAULT_FORECAST_HORIZON;
use crate::models::{FitOptions, ModelKind, DEFAULT_EXTRAPOLATION_FACTOR, DEFAULT_POINT_COUNT};

const CONFIG_FILE: &str = "config.toml";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration as TOML with every field commented out, so defaults apply
    /// until a user uncomments a line.
    pub fn generate_default_config(&self) -> Result<String> {
        let toml_str = toml::to_string(&AppConfig::default())
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        Ok(comment_all_fields(&toml_str, &collect_all_comments()))
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config()?)?;

        Ok(config_path)
    }

    /// Reads and parses the config file in this directory. A missing file yields defaults.
    pub fn load_file(&self) -> Result<AppConfig> {
        let config_path = self.config_path(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

fn collect_all_comments() -> HashMap<String, String> {
    let mut comments = HashMap::new();

    for (field, comment) in APP_COMMENTS {
        comments.insert(field.to_string(), comment.to_string());
    }
    let sections: [(&str, &[(&str, &str)]); 5] = [
        ("file_loading", FILE_LOADING_COMMENTS),
        ("analysis", ANALYSIS_COMMENTS),
        ("cleaning", CLEANING_COMMENTS),
        ("chart", CHART_COMMENTS),
        ("logging", LOGGING_COMMENTS),
    ];
    for (section, fields) in sections {
        for (field, comment) in fields {
            comments.insert(format!("{}.{}", section, field), comment.to_string());
        }
    }

    comments
}

/// Comments out every field and section header, adding field and section comments.
/// Option fields left out by serialisation are appended as `# field = null`.
fn comment_all_fields(toml: &str, comments: &HashMap<String, String>) -> String {
    let mut result = String::new();
    result.push_str("# trendlens configuration file\n");
    result.push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
    result.push('\n');

    let mut current_section = String::new();
    let mut seen_fields: HashSet<String> = HashSet::new();
    let mut seen_sections: HashSet<String> = HashSet::new();

    for line in toml.lines() {
        if let Some(section) = extract_section_name(line) {
            if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                result.push_str(header);
                result.push('\n');
            }
            result.push_str("# ");
            result.push_str(line);
            result.push('\n');
            current_section = section;
            push_missing_option_fields(&mut result, &current_section, comments, &seen_fields);
            seen_sections.insert(current_section.clone());
            continue;
        }

        if let Some(field_path) = extract_field_path(line, &current_section) {
            if let Some(comment) = comments.get(&field_path) {
                for comment_line in comment.lines() {
                    result.push_str("# ");
                    result.push_str(comment_line);
                    result.push('\n');
                }
            }
            seen_fields.insert(field_path);
            result.push_str("# ");
            result.push_str(line);
            result.push('\n');
        } else {
            result.push_str(line);
            result.push('\n');
        }
    }

    // Sections holding only unset options are not serialised at all.
    for field_path in OPTION_FIELDS {
        if let Some((section, _)) = field_path.split_once('.') {
            if seen_sections.insert(section.to_string()) {
                result.push_str(&format!("\n# [{}]\n", section));
                push_missing_option_fields(&mut result, section, comments, &seen_fields);
            }
        }
    }

    result
}

/// Option fields that should appear in the template even when None.
const OPTION_FIELDS: &[&str] = &["file_loading.delimiter"];

fn push_missing_option_fields(
    result: &mut String,
    section: &str,
    comments: &HashMap<String, String>,
    seen_fields: &HashSet<String>,
) {
    for field_path in OPTION_FIELDS {
        let Some((field_section, field_name)) = field_path.split_once('.') else {
            continue;
        };
        if field_section != section || seen_fields.contains(*field_path) {
            continue;
        }
        if let Some(comment) = comments.get(*field_path) {
            for comment_line in comment.lines() {
                result.push_str("# ");
                result.push_str(comment_line);
                result.push('\n');
            }
        }
        result.push_str(&format!("# {} = null\n", field_name));
    }
}

/// Section name from a TOML header line like "[analysis]"
fn extract_section_name(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        Some(trimmed[1..trimmed.len() - 1].to_string())
    } else {
        None
    }
}

fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
        return None;
    }

    let (field_name, _) = trimmed.split_once('=')?;
    let field_name = field_name.trim();
    if current_section.is_empty() {
        Some(field_name.to_string())
    } else {
        Some(format!("{}.{}", current_section, field_name))
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub analysis: AnalysisConfig,
    pub cleaning: CleaningConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "file_loading",
        "# ============================================================================\n# File Loading Defaults\n# ============================================================================",
    ),
    (
        "analysis",
        "# ============================================================================\n# Model Fitting & Forecast\n# ============================================================================",
    ),
    (
        "cleaning",
        "# ============================================================================\n# Data Cleaning\n# ============================================================================",
    ),
    (
        "chart",
        "# ============================================================================\n# Chart Export\n# ============================================================================",
    ),
    (
        "logging",
        "# ============================================================================\n# Logging\n# ============================================================================",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    /// Field separator as a byte value; unset means comma
    pub delimiter: Option<u8>,
}

const FILE_LOADING_COMMENTS: &[(&str, &str)] = &[(
    "delimiter",
    "Field separator as a byte value (e.g. 59 for ';', 9 for tab). Default: comma",
)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub default_models: Vec<ModelKind>,
    pub forecast_horizon: usize,
    pub point_count: usize,
    pub extrapolation_factor: f64,
}

const ANALYSIS_COMMENTS: &[(&str, &str)] = &[
    (
        "default_models",
        "Models fitted when --models is not given.\nOptions: \"linear\", \"polynomial\", \"exponential\", \"logarithmic\", \"power\"",
    ),
    (
        "forecast_horizon",
        "Number of steps projected past the last observation (must be at least 1)",
    ),
    (
        "point_count",
        "Samples drawn along each fitted curve for charts (must be at least 2)",
    ),
    (
        "extrapolation_factor",
        "Padding on each side of the observed x range, as a fraction of the range",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub iqr_multiplier: f64,
}

const CLEANING_COMMENTS: &[(&str, &str)] = &[(
    "iqr_multiplier",
    "Outlier fences sit this many IQRs below Q1 and above Q3",
)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

const CHART_COMMENTS: &[(&str, &str)] = &[
    ("width", "Exported chart width in pixels"),
    ("height", "Exported chart height in pixels"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

const LOGGING_COMMENTS: &[(&str, &str)] = &[(
    "level",
    "Log filter used when RUST_LOG and --log-level are not set.\nExamples: \"warn\", \"debug\", \"trendlens=trace\"",
)];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            analysis: AnalysisConfig::default(),
            cleaning: CleaningConfig::default(),
            chart: ChartConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_models: ModelKind::DEFAULT_SELECTION.to_vec(),
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            point_count: DEFAULT_POINT_COUNT,
            extrapolation_factor: DEFAULT_EXTRAPOLATION_FACTOR,
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load configuration using the given config directory
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(manager.load_file()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.analysis.merge(other.analysis);
        self.cleaning.merge(other.cleaning);
        self.chart.merge(other.chart);
        self.logging.merge(other.logging);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.analysis.default_models.is_empty() {
            return Err(eyre!("default_models must name at least one model"));
        }
        if self.analysis.forecast_horizon == 0 {
            return Err(eyre!("forecast_horizon must be at least 1"));
        }
        if self.analysis.point_count < 2 {
            return Err(eyre!("point_count must be at least 2"));
        }
        if !self.analysis.extrapolation_factor.is_finite() || self.analysis.extrapolation_factor < 0.0
        {
            return Err(eyre!("extrapolation_factor must be a non-negative number"));
        }

        if !self.cleaning.iqr_multiplier.is_finite() || self.cleaning.iqr_multiplier <= 0.0 {
            return Err(eyre!("iqr_multiplier must be greater than 0"));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!("chart width and height must be greater than 0"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(eyre!("logging level must not be empty"));
        }

        Ok(())
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            point_count: self.analysis.point_count,
            extrapolation_factor: self.analysis.extrapolation_factor,
        }
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
    }
}

impl AnalysisConfig {
    pub fn merge(&mut self, other: Self) {
        let default = AnalysisConfig::default();
        if other.default_models != default.default_models {
            self.default_models = other.default_models;
        }
        if other.forecast_horizon != default.forecast_horizon {
            self.forecast_horizon = other.forecast_horizon;
        }
        if other.point_count != default.point_count {
            self.point_count = other.point_count;
        }
        if other.extrapolation_factor != default.extrapolation_factor {
            self.extrapolation_factor = other.extrapolation_factor;
        }
    }
}

impl CleaningConfig {
    pub fn merge(&mut self, other: Self) {
        if other.iqr_multiplier != CleaningConfig::default().iqr_multiplier {
            self.iqr_multiplier = other.iqr_multiplier;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }
}
