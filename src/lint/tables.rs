// ABOUTME: Markdown table detection and row-symmetry checks for indexed placeholders
// ABOUTME: Verifies that rows like config_id_1/config_id_2 carry the same field stems

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use super::{IssueKind, LintIssue, Severity};
use crate::template::Placeholder;

static INDEXED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_(\d+)$").expect("indexed name pattern is valid"));

static SEPARATOR_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").expect("separator pattern is valid")
});

/// A contiguous block of `|`-prefixed lines
#[derive(Debug, Clone)]
pub struct Table {
    /// 1-based line numbers of the rows, separator excluded
    pub rows: Vec<usize>,
}

/// Locate Markdown tables in `text`
pub fn find_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Option<Table> = None;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('|') {
            let table = current.get_or_insert_with(|| Table { rows: Vec::new() });
            if !SEPARATOR_ROW.is_match(trimmed) {
                table.rows.push(index + 1);
            }
        } else if let Some(table) = current.take() {
            tables.push(table);
        }
    }

    if let Some(table) = current {
        tables.push(table);
    }

    tables
}

/// Split `recruiter_screen_rate_2` into (`recruiter_screen_rate`, 2)
pub fn split_indexed(name: &str) -> Option<(&str, u32)> {
    let caps = INDEXED_NAME.captures(name)?;
    let stem = caps.get(1)?.as_str();
    let index = caps.get(2)?.as_str().parse().ok()?;
    Some((stem, index))
}

/// Check that every indexed row of every table uses one index and the same stems
pub fn check_symmetry(text: &str, placeholders: &[Placeholder]) -> Vec<LintIssue> {
    let mut by_line: HashMap<usize, Vec<&Placeholder>> = HashMap::new();
    for placeholder in placeholders {
        by_line.entry(placeholder.line).or_default().push(placeholder);
    }

    let mut issues = Vec::new();

    for table in find_tables(text) {
        let mut reference: Option<(usize, BTreeSet<String>)> = None;
        let mut seen_indices: HashMap<u32, usize> = HashMap::new();

        for line in table.rows {
            let Some(row) = by_line.get(&line) else {
                continue;
            };

            let indexed: Vec<(&str, u32)> =
                row.iter().filter_map(|p| split_indexed(&p.name)).collect();
            if indexed.is_empty() {
                continue;
            }

            let indices: BTreeSet<u32> = indexed.iter().map(|(_, i)| *i).collect();
            if indices.len() > 1 {
                issues.push(LintIssue::new(
                    IssueKind::MixedRowIndex,
                    Severity::Error,
                    line,
                    format!("row mixes placeholder indices {:?}", indices),
                ));
                continue;
            }

            let index = indexed[0].1;
            if let Some(first_line) = seen_indices.insert(index, line) {
                issues.push(LintIssue::new(
                    IssueKind::DuplicateRowIndex,
                    Severity::Error,
                    line,
                    format!("index {} already used by the row on line {}", index, first_line),
                ));
            }

            let stems: BTreeSet<String> = indexed.iter().map(|(s, _)| s.to_string()).collect();
            match &reference {
                None => reference = Some((line, stems)),
                Some((reference_line, expected)) => {
                    let missing: Vec<_> = expected.difference(&stems).cloned().collect();
                    let extra: Vec<_> = stems.difference(expected).cloned().collect();
                    if !missing.is_empty() || !extra.is_empty() {
                        issues.push(LintIssue::new(
                            IssueKind::AsymmetricRow,
                            Severity::Error,
                            line,
                            asymmetry_message(*reference_line, index, &missing, &extra),
                        ));
                    }
                }
            }
        }
    }

    issues
}

fn asymmetry_message(reference_line: usize, index: u32, missing: &[String], extra: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|s| format!("{}_{}", s, index)).collect();
        parts.push(format!("missing {}", names.join(", ")));
    }
    if !extra.is_empty() {
        let names: Vec<_> = extra.iter().map(|s| format!("{}_{}", s, index)).collect();
        parts.push(format!("unexpected {}", names.join(", ")));
    }
    format!(
        "row does not match the row on line {}: {}",
        reference_line,
        parts.join("; ")
    )
}
