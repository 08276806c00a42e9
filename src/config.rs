use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::notify::MailConfig;

fn default_portfolio_file() -> PathBuf {
    PathBuf::from("balancesheet.json")
}

fn default_ledger_file() -> PathBuf {
    PathBuf::from("balancesheet.csv")
}

fn default_chart_file() -> PathBuf {
    PathBuf::from("balancesheet-chart.json")
}

fn default_primary_group() -> String {
    "assets".to_string()
}

fn default_secondary_group() -> String {
    "liabilities".to_string()
}

/// Valuation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Pseudo-symbol the oracle resolves to the native/foreign FX rate.
    pub fx_symbol: String,

    /// Substrings (case-sensitive) that mark a category as investment-like.
    pub investment_categories: Vec<String>,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            fx_symbol: crate::oracle::DEFAULT_FX_SYMBOL.to_string(),
            investment_categories: vec!["Investment".to_string()],
        }
    }
}

/// Scheduled-run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local time of day (`HH:MM`) one reporting cycle runs at.
    pub at: String,

    /// Seconds the poll loop sleeps between checks.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: "20:00".to_string(),
            poll_interval_secs: 30,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Portfolio definition file, relative to the data directory.
    #[serde(default = "default_portfolio_file")]
    pub portfolio_file: PathBuf,

    /// CSV ledger file, relative to the data directory.
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,

    /// Optional summary-format ledger produced by the older tool, relative to
    /// the data directory. When set, its net values feed the chart history.
    pub legacy_ledger_file: Option<PathBuf>,

    /// Chart output file, relative to the data directory.
    #[serde(default = "default_chart_file")]
    pub chart_file: PathBuf,

    /// Name of the definition group summed positive (e.g. "assets").
    #[serde(default = "default_primary_group")]
    pub primary_group: String,

    /// Name of the definition group summed negative (e.g. "liabilities").
    #[serde(default = "default_secondary_group")]
    pub secondary_group: String,

    /// Valuation settings.
    #[serde(default)]
    pub valuation: ValuationConfig,

    /// Mail delivery settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Scheduled-run settings.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            portfolio_file: default_portfolio_file(),
            ledger_file: default_ledger_file(),
            legacy_ledger_file: None,
            chart_file: default_chart_file(),
            primary_group: default_primary_group(),
            secondary_group: default_secondary_group(),
            valuation: ValuationConfig::default(),
            mail: MailConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }
}

/// Loaded configuration with resolved paths and parsed schedule time.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub portfolio_file: PathBuf,
    pub ledger_file: PathBuf,
    pub legacy_ledger_file: Option<PathBuf>,
    pub chart_file: PathBuf,
    pub primary_group: String,
    pub secondary_group: String,
    pub fx_symbol: String,
    pub investment_categories: Vec<String>,
    pub mail: MailConfig,
    pub schedule_at: NaiveTime,
    pub poll_interval: Duration,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./balancebook.toml` if it exists in current directory
/// 2. `~/.local/share/balancebook/balancebook.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("balancebook.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("balancebook").join("balancebook.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent
    /// directory; the data files are resolved relative to the data directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        Self::resolve(config, config_dir)
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            let config_path = if config_path.is_relative() {
                std::env::current_dir()
                    .context("Failed to get current directory")?
                    .join(config_path)
            } else {
                config_path.to_path_buf()
            };

            let config_dir = config_path
                .parent()
                .context("Config path has no parent directory")?;

            Self::resolve(Config::default(), config_dir)
        }
    }

    fn resolve(config: Config, config_dir: &Path) -> Result<Self> {
        let data_dir = config.resolve_data_dir(config_dir);

        let schedule_at = NaiveTime::parse_from_str(&config.schedule.at, "%H:%M")
            .with_context(|| format!("Invalid schedule time: {}", config.schedule.at))?;

        Ok(Self {
            portfolio_file: resolve_path(&data_dir, &config.portfolio_file),
            ledger_file: resolve_path(&data_dir, &config.ledger_file),
            legacy_ledger_file: config
                .legacy_ledger_file
                .as_ref()
                .map(|path| resolve_path(&data_dir, path)),
            chart_file: resolve_path(&data_dir, &config.chart_file),
            data_dir,
            primary_group: config.primary_group,
            secondary_group: config.secondary_group,
            fx_symbol: config.valuation.fx_symbol,
            investment_categories: config.valuation.investment_categories,
            mail: config.mail,
            schedule_at,
            poll_interval: Duration::from_secs(config.schedule.poll_interval_secs),
        })
    }
}

fn resolve_path(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
