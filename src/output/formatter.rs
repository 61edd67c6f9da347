// ABOUTME: Output formatters for scan and lint results (text, JSON, YAML)
// ABOUTME: Handles serialization and presentation of placeholder reports

use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

use super::error::{OutputError, Result};
use crate::lint::LintReport;
use crate::template::ScanReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(OutputError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

pub trait OutputFormatter: Send + Sync {
    fn format_scan(&self, report: &ScanReport) -> Result<String>;

    fn format_lint(&self, report: &LintReport) -> Result<String>;
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct YamlFormatter;

pub struct TextFormatter;

/// Formatter for the requested output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new_pretty()),
        OutputFormat::Yaml => Box::new(YamlFormatter),
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn new_pretty() -> Self {
        Self { pretty: true }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value).map_err(OutputError::SerializationError)
        } else {
            serde_json::to_string(value).map_err(OutputError::SerializationError)
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_lint(&self, report: &LintReport) -> Result<String> {
        self.to_json(report)
    }
}

impl OutputFormatter for YamlFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        serde_yaml::to_string(report).map_err(OutputError::YamlSerializationError)
    }

    fn format_lint(&self, report: &LintReport) -> Result<String> {
        serde_yaml::to_string(report).map_err(OutputError::YamlSerializationError)
    }
}

impl OutputFormatter for TextFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{} ({}): {} placeholders, {} distinct",
            report.source, report.syntax, report.total, report.distinct
        )
        .ok();

        for placeholder in &report.placeholders {
            writeln!(
                output,
                "  {:>4}:{:<3} {}",
                placeholder.line, placeholder.column, placeholder.name
            )
            .ok();
        }

        Ok(output)
    }

    fn format_lint(&self, report: &LintReport) -> Result<String> {
        let mut output = String::new();

        if report.issues.is_empty() {
            writeln!(
                output,
                "✓ {} ({}): {} placeholders, no issues",
                report.source, report.syntax, report.placeholders
            )
            .ok();
            return Ok(output);
        }

        let marker = if report.is_clean() { "!" } else { "✗" };
        writeln!(
            output,
            "{} {} ({}): {} errors, {} warnings",
            marker,
            report.source,
            report.syntax,
            report.errors(),
            report.warnings()
        )
        .ok();

        for issue in &report.issues {
            writeln!(
                output,
                "  {:<7} line {:>4}: {}",
                issue.severity, issue.line, issue.message
            )
            .ok();
        }

        Ok(output)
    }
}
