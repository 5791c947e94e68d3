//! Inline suppression of diagnostics via comments in the unit source.
//!
//! Supports:
//! - `// NOLINT` or `// NOLINT(check-glob, ...)` on the diagnostic's line
//! - `// NOLINTNEXTLINE` or `// NOLINTNEXTLINE(check-glob, ...)` on the line before
//!
//! Block comments (`/* NOLINT */`) are accepted too.

use globset::Glob;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Diagnostic;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Check name globs; empty means every check
    #[serde(default)]
    pub checks: Vec<String>,
    /// Unit containing the suppression
    pub unit: String,
    /// 1-indexed line of the comment
    pub line: usize,
    pub suppression_type: SuppressionType,
}

/// A diagnostic that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: Diagnostic,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    static ref NOLINT: Regex =
        Regex::new(r"(?://|/\*)\s*NOLINT(NEXTLINE)?\b(?:\(([^)]*)\))?").unwrap();
}

/// Parse suppression directives from a unit's source text.
pub fn parse_suppressions(unit: &str, source: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let Some(caps) = NOLINT.captures(line) else {
            continue;
        };
        let suppression_type = if caps.get(1).is_some() {
            SuppressionType::NextLine
        } else {
            SuppressionType::Line
        };
        let checks = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        suppressions.push(Suppression {
            checks,
            unit: unit.to_string(),
            line: line_num + 1,
            suppression_type,
        });
    }

    suppressions
}

/// Check if a diagnostic matches a suppression.
pub fn matches_suppression(diagnostic: &Diagnostic, suppression: &Suppression) -> bool {
    if diagnostic.unit != suppression.unit {
        return false;
    }

    let Some(line) = diagnostic.line() else {
        return false;
    };
    let target = match suppression.suppression_type {
        SuppressionType::Line => suppression.line,
        SuppressionType::NextLine => suppression.line + 1,
    };
    if line != target {
        return false;
    }

    suppression.checks.is_empty()
        || suppression.checks.iter().any(|pattern| {
            Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&diagnostic.check))
                .unwrap_or(false)
        })
}

/// Separate diagnostics into active and suppressed based on suppressions.
pub fn filter_suppressed(
    diagnostics: Vec<Diagnostic>,
    suppressions: &[Suppression],
) -> (Vec<Diagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&diagnostic, s))
        {
            Some(suppression) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                suppression: suppression.clone(),
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}
