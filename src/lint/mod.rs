// ABOUTME: Structural lint checks for placeholder templates
// ABOUTME: Reports duplicate, malformed, asymmetric, and non-round-tripping placeholders

pub mod tables;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::template::{
    distinct_names, Placeholder, Syntax, SyntaxChoice, TemplateContext, TemplateEngine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicatePlaceholder,
    AsymmetricRow,
    MixedRowIndex,
    DuplicateRowIndex,
    Malformed,
    RoundTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub source: String,
    pub syntax: Syntax,
    pub placeholders: usize,
    pub distinct: usize,
    pub issues: Vec<LintIssue>,
}

/// Runs every structural check over a template
#[derive(Debug, Clone, Default)]
pub struct Linter {
    syntax: SyntaxChoice,
}

impl LintIssue {
    pub fn new(kind: IssueKind, severity: Severity, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.pad("warning"),
            Severity::Error => f.pad("error"),
        }
    }
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// No errors; warnings allowed
    pub fn is_clean(&self) -> bool {
        self.errors() == 0
    }

    /// No issues of any severity
    pub fn is_strictly_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_syntax(mut self, syntax: impl Into<SyntaxChoice>) -> Self {
        self.syntax = syntax.into();
        self
    }

    pub fn lint(&self, source: &str, text: &str) -> LintReport {
        let syntax = self.syntax.resolve(text);
        let placeholders = syntax.scan(text);

        let mut issues = Vec::new();
        issues.extend(check_duplicates(&placeholders));
        if syntax == Syntax::Mustache {
            issues.extend(check_malformed(text));
        }
        issues.extend(tables::check_symmetry(text, &placeholders));
        issues.extend(check_round_trip(text, syntax, &placeholders));
        issues.sort_by_key(|issue| issue.line);

        debug!(
            "Linted {}: {} placeholders, {} issues",
            source,
            placeholders.len(),
            issues.len()
        );

        LintReport {
            source: source.to_string(),
            syntax,
            placeholders: placeholders.len(),
            distinct: distinct_names(&placeholders).len(),
            issues,
        }
    }
}

/// Every name should be defined exactly once
fn check_duplicates(placeholders: &[Placeholder]) -> Vec<LintIssue> {
    let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
    for placeholder in placeholders {
        occurrences
            .entry(placeholder.name.as_str())
            .or_default()
            .push(placeholder.line);
    }

    let mut issues = Vec::new();
    for name in distinct_names(placeholders) {
        let lines = &occurrences[name.as_str()];
        if lines.len() > 1 {
            let listed: Vec<_> = lines.iter().map(|l| l.to_string()).collect();
            issues.push(LintIssue::new(
                IssueKind::DuplicatePlaceholder,
                Severity::Warning,
                lines[1],
                format!(
                    "'{}' appears {} times (lines {})",
                    name,
                    lines.len(),
                    listed.join(", ")
                ),
            ));
        }
    }
    issues
}

/// Every `{{` must open a well-formed token
fn check_malformed(text: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let valid_starts: Vec<usize> = Syntax::Mustache
            .scan(line)
            .into_iter()
            .map(|p| p.start)
            .collect();

        for (offset, _) in line.match_indices("{{") {
            if valid_starts.contains(&offset) {
                continue;
            }

            let rest = &line[offset + 2..];
            let message = match rest.find("}}") {
                None => "unclosed placeholder '{{'".to_string(),
                Some(close) => format!("invalid placeholder name '{}'", rest[..close].trim()),
            };
            issues.push(LintIssue::new(
                IssueKind::Malformed,
                Severity::Error,
                index + 1,
                message,
            ));
        }
    }

    issues
}

/// Substituting distinct sentinels must leave no placeholder syntax behind
fn check_round_trip(text: &str, syntax: Syntax, placeholders: &[Placeholder]) -> Vec<LintIssue> {
    let context: TemplateContext = distinct_names(placeholders)
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, format!("SENTINEL-{:04}", i)))
        .collect();

    let engine = TemplateEngine::new().with_syntax(syntax);
    let rendered = match engine.render(text, &context) {
        Ok(rendered) => rendered,
        Err(e) => {
            return vec![LintIssue::new(
                IssueKind::RoundTrip,
                Severity::Error,
                0,
                format!("sentinel rendering failed: {}", e),
            )]
        }
    };

    syntax
        .scan(&rendered.text)
        .into_iter()
        .map(|leftover| {
            LintIssue::new(
                IssueKind::RoundTrip,
                Severity::Error,
                leftover.line,
                format!("'{}' remains after substituting every placeholder", leftover.raw),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_template() {
        let report = Linter::new().lint("inline", "Date: {{ report_date }}\nCount: {{ total }}\n");

        assert_eq!(report.syntax, Syntax::Mustache);
        assert_eq!(report.placeholders, 2);
        assert!(report.is_strictly_clean());
    }

    #[test]
    fn test_duplicate_is_warning() {
        let report = Linter::new().lint("inline", "{{ a }}\n{{ b }}\n{{ a }}\n");

        assert_eq!(report.warnings(), 1);
        assert!(report.is_clean());
        assert!(!report.is_strictly_clean());

        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::DuplicatePlaceholder);
        assert_eq!(issue.line, 3);
        assert!(issue.message.contains("lines 1, 3"));
    }

    #[test]
    fn test_malformed_tokens() {
        let report = Linter::new()
            .with_syntax(Syntax::Mustache)
            .lint("inline", "{{ ok }}\n{{ not valid }}\n{{ open\n");

        let malformed: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::Malformed)
            .map(|i| (i.line, i.message.as_str()))
            .collect();

        assert_eq!(
            malformed,
            vec![
                (2, "invalid placeholder name 'not valid'"),
                (3, "unclosed placeholder '{{'"),
            ]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_round_trip_catches_nested_brackets() {
        let report = Linter::new()
            .with_syntax(Syntax::Bracket)
            .lint("inline", "Name: [[Your Name Here]]\n");

        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::RoundTrip && i.line == 1));
    }

    #[test]
    fn test_round_trip_clean_for_plain_brackets() {
        let report = Linter::new().lint("inline", "# [Your Name Here]\n[Email Address]\n");

        assert_eq!(report.syntax, Syntax::Bracket);
        assert!(report.is_strictly_clean());
    }
}
