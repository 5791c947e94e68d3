//! Diagnostics, edits and lint results.

use serde::{Deserialize, Serialize};

use crate::ast::{Location, Span, Unit};

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "note" => Ok(Severity::Note),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insert,
    Remove,
    Replace,
}

/// A single suggested text change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub kind: EditKind,
    pub span: Span,
    #[serde(default)]
    pub text: String,
}

impl Edit {
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            span: Span::point(offset),
            text: text.into(),
        }
    }

    pub fn remove(span: Span) -> Self {
        Self {
            kind: EditKind::Remove,
            span,
            text: String::new(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            span,
            text: text.into(),
        }
    }

    /// Whether applying both edits would touch the same text.
    pub fn overlaps(&self, other: &Edit) -> bool {
        let (a, b) = (self.span, other.span);
        match (a.is_empty(), b.is_empty()) {
            (true, true) => a.start == b.start,
            (true, false) => b.start < a.start && a.start < b.end,
            (false, true) => a.start < b.start && b.start < a.end,
            (false, false) => a.start < b.end && b.start < a.end,
        }
    }
}

/// Secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub span: Span,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A finding reported by one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub check: String,
    pub unit: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub severity: Severity,
    /// Message with `%0`, `%1`, ... placeholders.
    pub template: String,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<Edit>,
}

impl Diagnostic {
    /// The template with its placeholders substituted.
    pub fn message(&self) -> String {
        render(&self.template, &self.args)
    }

    pub fn line(&self) -> Option<usize> {
        self.location.map(|l| l.line)
    }

    /// Create a unique key for this diagnostic (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!("{}|{}|{}|{}", self.check, self.unit, self.span, self.message())
    }
}

/// Substitute `%N` with `args[N]`. Unknown indices are left as written.
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        match after[..digits].parse::<usize>().ok().and_then(|i| args.get(i)) {
            Some(arg) => out.push_str(arg),
            None => out.push_str(&rest[pos..pos + 1 + digits]),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticError {
    #[error("edits at {first} and {second} overlap")]
    OverlappingEdits { first: Span, second: Span },
    #[error("edit at {span} lies outside the unit source ({len} bytes)")]
    EditOutOfBounds { span: Span, len: usize },
}

/// Assembles a [`Diagnostic`]; [`finish`](Self::finish) enforces that edits
/// do not overlap.
pub struct DiagnosticBuilder<'u> {
    unit: &'u Unit,
    diagnostic: Diagnostic,
}

impl<'u> DiagnosticBuilder<'u> {
    pub fn new(unit: &'u Unit, check: &str, span: Span, template: &str) -> Self {
        Self {
            unit,
            diagnostic: Diagnostic {
                check: check.to_string(),
                unit: unit.name().to_string(),
                span,
                location: unit.location(span.start),
                severity: Severity::Warning,
                template: template.to_string(),
                args: Vec::new(),
                notes: Vec::new(),
                edits: Vec::new(),
            },
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.diagnostic.severity = severity;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.diagnostic.args.push(arg.into());
        self
    }

    pub fn note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.diagnostic.notes.push(Note {
            span,
            message: message.into(),
            location: self.unit.location(span.start),
        });
        self
    }

    pub fn edit(mut self, edit: Edit) -> Self {
        self.diagnostic.edits.push(edit);
        self
    }

    pub fn finish(self) -> Result<Diagnostic, DiagnosticError> {
        let edits = &self.diagnostic.edits;
        if let Some(source) = self.unit.source() {
            if let Some(e) = edits.iter().find(|e| e.span.end as usize > source.len()) {
                return Err(DiagnosticError::EditOutOfBounds {
                    span: e.span,
                    len: source.len(),
                });
            }
        }
        for (i, a) in edits.iter().enumerate() {
            if let Some(b) = edits[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(DiagnosticError::OverlappingEdits {
                    first: a.span,
                    second: b.span,
                });
            }
        }
        Ok(self.diagnostic)
    }
}

/// A check that aborted on one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check: String,
    pub unit: String,
    pub error: String,
}

/// A unit file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub path: String,
    pub error: String,
}

/// Results of a lint run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics that were suppressed by inline comments
    #[serde(default)]
    pub suppressed: Vec<super::SuppressedDiagnostic>,
    #[serde(default)]
    pub failures: Vec<CheckFailure>,
    #[serde(default)]
    pub load_failures: Vec<LoadFailure>,
    /// Number of units scanned
    pub scanned: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.suppressed.extend(other.suppressed);
        self.failures.extend(other.failures);
        self.load_failures.extend(other.load_failures);
        self.scanned += other.scanned;
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Check if there are any error-severity diagnostics.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Whether any check aborted or any unit failed to load.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.load_failures.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && !self.has_failures()
    }
}
