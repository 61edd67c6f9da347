// ABOUTME: Output writers for rendered documents and reports (stdout, files)
// ABOUTME: Writes content byte for byte to the selected destination

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::{OutputError, Result};

/// Where command output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(FileTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub path: PathBuf,
    pub create_dirs: bool,
}

impl OutputDestination {
    /// A file destination when a path is given, stdout otherwise
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::file(path),
            None => Self::Stdout,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileTarget {
            path: path.into(),
            create_dirs: true,
        })
    }
}

#[async_trait]
pub trait OutputWriter: Send + Sync {
    async fn write(&self, content: &str) -> Result<()>;
}

pub struct StdoutWriter;

pub struct FileWriter {
    target: FileTarget,
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputWriter for StdoutWriter {
    async fn write(&self, content: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(content.as_bytes()).await?;
        stdout.flush().await?;

        debug!("Output written to stdout ({} chars)", content.len());
        Ok(())
    }
}

impl FileWriter {
    pub fn new(target: FileTarget) -> Self {
        Self { target }
    }

    fn path(&self) -> &Path {
        &self.target.path
    }
}

#[async_trait]
impl OutputWriter for FileWriter {
    async fn write(&self, content: &str) -> Result<()> {
        let output_path = self.path();

        // Create parent directories if needed
        if self.target.create_dirs {
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| OutputError::WriteError {
                        message: format!("Failed to create directory {}: {}", parent.display(), e),
                    })?;
            }
        }

        fs::write(output_path, content)
            .await
            .map_err(|e| OutputError::WriteError {
                message: format!("Failed to write file {}: {}", output_path.display(), e),
            })?;

        info!(
            "Output written to file: {} ({} bytes)",
            output_path.display(),
            content.len()
        );
        Ok(())
    }
}

/// Writer for a destination
pub fn writer_for(destination: &OutputDestination) -> Box<dyn OutputWriter> {
    match destination {
        OutputDestination::Stdout => Box::new(StdoutWriter::new()),
        OutputDestination::File(target) => Box::new(FileWriter::new(target.clone())),
    }
}
