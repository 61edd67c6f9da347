// ABOUTME: Placeholder token syntaxes and the scanner that locates them in template text
// ABOUTME: Supports {{ name }} tokens for reports and [Bracketed Text] tokens for résumés

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TemplateError;

static MUSTACHE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("mustache pattern is valid")
});

static BRACKET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]+)\]").expect("bracket pattern is valid"));

/// A concrete placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `{{ name }}`
    Mustache,
    /// `[Bracketed Text]`
    Bracket,
}

/// Syntax selection, where `Auto` defers to the template content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxChoice {
    #[default]
    Auto,
    Mustache,
    Bracket,
}

/// A single placeholder occurrence in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub name: String,
    pub raw: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
}

/// Placeholders found in one template, ready for formatting
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub source: String,
    pub syntax: Syntax,
    pub total: usize,
    pub distinct: usize,
    pub placeholders: Vec<Placeholder>,
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Mustache => "mustache",
            Syntax::Bracket => "bracket",
        }
    }

    /// Find every placeholder in source order
    pub fn scan(&self, text: &str) -> Vec<Placeholder> {
        let locator = LineLocator::new(text);

        match self {
            Syntax::Mustache => MUSTACHE_PATTERN
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let name = caps.get(1)?.as_str();
                    Some(locator.placeholder(text, name, whole.start(), whole.end()))
                })
                .collect(),
            Syntax::Bracket => BRACKET_PATTERN
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let inner = caps.get(1)?.as_str();
                    if !is_bracket_placeholder(text, inner, whole.start(), whole.end()) {
                        return None;
                    }
                    Some(locator.placeholder(text, inner.trim(), whole.start(), whole.end()))
                })
                .collect(),
        }
    }

    /// A token that renders as this placeholder with the given name
    pub fn token(&self, name: &str) -> String {
        match self {
            Syntax::Mustache => format!("{{{{ {} }}}}", name),
            Syntax::Bracket => format!("[{}]", name),
        }
    }

    /// Whether `name` could be written as a well-formed token of this syntax
    pub fn is_valid_name(&self, name: &str) -> bool {
        match self {
            Syntax::Mustache => {
                let mut chars = name.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            Syntax::Bracket => {
                !name.trim().is_empty() && !name.contains(['[', ']', '\n']) && !is_checkbox(name)
            }
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyntaxChoice {
    /// Pick the concrete syntax for a template
    ///
    /// `Auto` decides from `text` alone, so rendered output can resolve
    /// differently than its template did. Pin `Rendered::syntax` when
    /// rendering output again.
    pub fn resolve(&self, text: &str) -> Syntax {
        match self {
            SyntaxChoice::Mustache => Syntax::Mustache,
            SyntaxChoice::Bracket => Syntax::Bracket,
            SyntaxChoice::Auto => {
                if MUSTACHE_PATTERN.is_match(text) {
                    Syntax::Mustache
                } else {
                    Syntax::Bracket
                }
            }
        }
    }
}

impl FromStr for SyntaxChoice {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SyntaxChoice::Auto),
            "mustache" => Ok(SyntaxChoice::Mustache),
            "bracket" => Ok(SyntaxChoice::Bracket),
            other => Err(TemplateError::UnknownSyntax(other.to_string())),
        }
    }
}

impl From<Syntax> for SyntaxChoice {
    fn from(syntax: Syntax) -> Self {
        match syntax {
            Syntax::Mustache => SyntaxChoice::Mustache,
            Syntax::Bracket => SyntaxChoice::Bracket,
        }
    }
}

impl ScanReport {
    pub fn new(source: impl Into<String>, syntax: Syntax, placeholders: Vec<Placeholder>) -> Self {
        let distinct = distinct_names(&placeholders).len();
        Self {
            source: source.into(),
            syntax,
            total: placeholders.len(),
            distinct,
            placeholders,
        }
    }
}

/// Distinct placeholder names in first-seen order
pub fn distinct_names(placeholders: &[Placeholder]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    placeholders
        .iter()
        .filter(|p| seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
        .collect()
}

fn is_checkbox(inner: &str) -> bool {
    matches!(inner, " " | "x" | "X")
}

/// Markdown links, reference links, images, and task-list boxes are not placeholders
fn is_bracket_placeholder(text: &str, inner: &str, start: usize, end: usize) -> bool {
    if inner.trim().is_empty() || is_checkbox(inner) {
        return false;
    }

    let preceding = text[..start].chars().next_back();
    if matches!(preceding, Some('!') | Some(']')) {
        return false;
    }

    let following = text[end..].chars().next();
    !matches!(following, Some('(') | Some('[') | Some(':'))
}

/// Maps byte offsets to 1-based line and column numbers
struct LineLocator {
    line_starts: Vec<usize>,
}

impl LineLocator {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    fn locate(&self, text: &str, offset: usize) -> (usize, usize) {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line_index];
        let column = text[line_start..offset].chars().count() + 1;
        (line_index + 1, column)
    }

    fn placeholder(&self, text: &str, name: &str, start: usize, end: usize) -> Placeholder {
        let (line, column) = self.locate(text, start);
        Placeholder {
            name: name.to_string(),
            raw: text[start..end].to_string(),
            line,
            column,
            start,
            end,
        }
    }
}
