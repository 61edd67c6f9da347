// ABOUTME: Configuration management for applytrack
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::market::DEFAULT_HALF_LIFE_DAYS;
use crate::report::ReportOptions;
use crate::template::TemplateContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub default_output_dir: Option<PathBuf>,

    #[serde(default)]
    pub variables: IndexMap<String, String>,

    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub half_life_days: f64,
    pub top_configs: usize,
    pub top_clusters: usize,
    pub top_ats: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            default_output_dir: None,
            variables: IndexMap::new(),
            market: MarketConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        let report = ReportOptions::default();
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            top_configs: report.top_configs,
            top_clusters: report.top_clusters,
            top_ats: report.top_ats,
        }
    }
}

impl MarketConfig {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_configs: self.top_configs,
            top_clusters: self.top_clusters,
            top_ats: self.top_ats,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.is_some();
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else if explicit {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        // An empty file is a valid, default configuration
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = vec![
            PathBuf::from("applytrack.yaml"),
            PathBuf::from("applytrack.yml"),
            PathBuf::from(".applytrack.yaml"),
            PathBuf::from(".applytrack.yml"),
        ];

        // Check current directory
        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".applytrack").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Return default path (may not exist)
        PathBuf::from("applytrack.yaml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an environment lookup
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Logging configuration
        if let Some(level) = lookup("APPLYTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("APPLYTRACK_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(strict) = lookup("APPLYTRACK_STRICT") {
            self.strict = parse_flag(&strict)
                .with_context(|| format!("Invalid APPLYTRACK_STRICT value '{}'", strict))?;
        }

        if let Some(half_life) = lookup("APPLYTRACK_HALF_LIFE_DAYS") {
            self.market.half_life_days = half_life.trim().parse().with_context(|| {
                format!("Invalid APPLYTRACK_HALF_LIFE_DAYS value '{}'", half_life)
            })?;
        }

        Ok(())
    }

    /// Default placeholder values from the configuration file
    pub fn default_variables(&self) -> TemplateContext {
        self.variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{}'", other),
    }
}
