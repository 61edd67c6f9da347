// ABOUTME: Output handler module for command result formatting and persistence
// ABOUTME: Formats scan/lint reports and writes documents to stdout or files

pub mod error;
pub mod formatter;
pub mod writer;

use self::error::Result;
use self::formatter::{formatter_for, OutputFormat};
use self::writer::{writer_for, OutputDestination};
use crate::lint::LintReport;
use crate::template::ScanReport;

pub use formatter::OutputFormatter;
pub use writer::OutputWriter;

/// Formats command results and writes them to a destination
pub struct OutputHandler {
    format: OutputFormat,
    destination: OutputDestination,
}

impl OutputHandler {
    pub fn new(format: OutputFormat, destination: OutputDestination) -> Self {
        Self {
            format,
            destination,
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, OutputDestination::Stdout)
    }

    /// Write already-rendered text as is
    pub async fn write_text(&self, content: &str) -> Result<()> {
        writer_for(&self.destination).write(content).await
    }

    pub async fn write_scan(&self, report: &ScanReport) -> Result<()> {
        let content = formatter_for(self.format).format_scan(report)?;
        self.write_text(&terminate_line(content)).await
    }

    pub async fn write_lint(&self, report: &LintReport) -> Result<()> {
        let content = formatter_for(self.format).format_lint(report)?;
        self.write_text(&terminate_line(content)).await
    }
}

/// Formatted reports end with a newline; JSON serializers omit it
fn terminate_line(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::stdout(OutputFormat::Text)
    }
}
