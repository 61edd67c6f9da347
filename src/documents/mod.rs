// ABOUTME: Built-in weekly report and résumé templates shipped with the binary
// ABOUTME: Resolves template sources given as file paths or builtin:<name> references

use std::fmt;
use std::path::PathBuf;
use tokio::fs;

use crate::template::{Syntax, SyntaxChoice};

const WEEKLY_REPORT: &str = include_str!("../../templates/weekly_report.md");
const RESUME: &str = include_str!("../../templates/resume.md");

const BUILTIN_PREFIX: &str = "builtin:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    WeeklyReport,
    Resume,
}

impl Document {
    pub fn all() -> &'static [Document] {
        &[Document::WeeklyReport, Document::Resume]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "weekly-report" | "weekly_report" | "report" => Some(Document::WeeklyReport),
            "resume" | "résumé" => Some(Document::Resume),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Document::WeeklyReport => "weekly-report",
            Document::Resume => "resume",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Document::WeeklyReport => "Weekly job-application outcome report",
            Document::Resume => "Baseline résumé for a compliance/security professional",
        }
    }

    pub fn syntax(&self) -> Syntax {
        match self {
            Document::WeeklyReport => Syntax::Mustache,
            Document::Resume => Syntax::Bracket,
        }
    }

    pub fn content(&self) -> &'static str {
        match self {
            Document::WeeklyReport => WEEKLY_REPORT,
            Document::Resume => RESUME,
        }
    }

    pub fn available() -> String {
        Self::all()
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a template's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(Document),
    File(PathBuf),
}

/// A template's text together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub source: String,
    pub content: String,
    pub syntax: SyntaxChoice,
}

impl TemplateSource {
    /// Parse `builtin:<name>` or a filesystem path
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        match input.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => Document::from_name(name)
                .map(TemplateSource::Builtin)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown built-in template '{}'. Available: {}",
                        name,
                        Document::available()
                    )
                }),
            None => Ok(TemplateSource::File(PathBuf::from(input))),
        }
    }

    /// Read the template text; built-ins carry their own syntax
    pub async fn load(&self) -> anyhow::Result<LoadedTemplate> {
        match self {
            TemplateSource::Builtin(document) => Ok(LoadedTemplate {
                source: format!("{}{}", BUILTIN_PREFIX, document.name()),
                content: document.content().to_string(),
                syntax: document.syntax().into(),
            }),
            TemplateSource::File(path) => {
                let content = fs::read_to_string(path).await.map_err(|e| {
                    anyhow::anyhow!("Failed to read template '{}': {}", path.display(), e)
                })?;
                Ok(LoadedTemplate {
                    source: path.display().to_string(),
                    content,
                    syntax: SyntaxChoice::Auto,
                })
            }
        }
    }
}
