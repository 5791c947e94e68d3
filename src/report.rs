//! Output formatting for lint results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::ast::{Location, Span};
use crate::detect::{Diagnostic, Edit, LintResult, Severity, SuppressedDiagnostic};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub units_scanned: usize,
    pub clean: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressed>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<JsonFailure>,
}

/// One diagnostic with its rendered message.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub check: String,
    pub severity: String,
    pub unit: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub message: String,
    pub template: String,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<JsonNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<Edit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonNote {
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressed {
    pub diagnostic: JsonDiagnostic,
    /// Line of the suppressing comment.
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: String,
}

/// A check that aborted or a unit that could not be loaded.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    pub unit: String,
    pub error: String,
}

/// Build the JSON report for a lint run over `path`.
pub fn json_report(path: &str, result: &LintResult) -> JsonReport {
    let failures = result
        .failures
        .iter()
        .map(|f| JsonFailure {
            check: Some(f.check.clone()),
            unit: f.unit.clone(),
            error: f.error.clone(),
        })
        .chain(result.load_failures.iter().map(|f| JsonFailure {
            check: None,
            unit: f.path.clone(),
            error: f.error.clone(),
        }))
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        units_scanned: result.scanned,
        clean: result.is_clean(),
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        suppressed: result.suppressed.iter().map(suppressed_to_json).collect(),
        suppressed_count: result.suppressed_count(),
        failures,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, result: &LintResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, result))?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        check: d.check.clone(),
        severity: d.severity.to_string(),
        unit: d.unit.clone(),
        span: d.span,
        location: d.location,
        message: d.message(),
        template: d.template.clone(),
        args: d.args.clone(),
        notes: d
            .notes
            .iter()
            .map(|n| JsonNote {
                span: n.span,
                location: n.location,
                message: n.message.clone(),
            })
            .collect(),
        edits: d.edits.clone(),
    }
}

fn suppressed_to_json(sd: &SuppressedDiagnostic) -> JsonSuppressed {
    JsonSuppressed {
        diagnostic: diagnostic_to_json(&sd.diagnostic),
        line: sd.suppression.line,
        suppression_type: format!("{:?}", sd.suppression.suppression_type).to_lowercase(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, result: &LintResult, show_suppressed: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "evolint".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{} ({} units)", path, result.scanned);
    println!();

    if !result.diagnostics.is_empty() {
        write_diagnostics(&result.diagnostics);
        println!();
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }

    if result.has_failures() {
        write_failures(result);
        println!();
    }

    write_final_status(result);
    println!();
}

/// `unit:line:col`, or `unit@start..end` without source text.
fn position(unit: &str, span: Span, location: Option<Location>) -> String {
    match location {
        Some(loc) => format!("{}:{}:{}", unit, loc.line, loc.column),
        None => format!("{}@{}", unit, span),
    }
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        write_severity_tag(&d.severity);
        print!("{}", position(&d.unit, d.span, d.location).blue());
        println!("  {}", d.check.dimmed());

        // Message on next line, indented
        println!("            {}", d.message());
        for note in &d.notes {
            println!(
                "            {} {} {}",
                "note:".cyan(),
                note.message,
                format!("({})", position(&d.unit, note.span, note.location)).dimmed()
            );
        }
        for edit in &d.edits {
            println!(
                "            {} {:?} {} {}",
                "fix:".green(),
                edit.kind,
                edit.span,
                format!("{:?}", edit.text).dimmed()
            );
        }
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Note => print!("    {} ", "NOTE ".blue()),
    }
}

fn write_failures(result: &LintResult) {
    let count = result.failures.len() + result.load_failures.len();
    println!("  {} ({}):", "Failures".red().bold(), count);
    for f in &result.failures {
        println!("    {} {}: {}", f.unit.blue(), f.check.dimmed(), f.error);
    }
    for f in &result.load_failures {
        println!("    {} {}", f.path.blue(), f.error);
    }
}

fn write_final_status(result: &LintResult) {
    if result.is_clean() {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ ISSUES".red());
    }
    print!("  Diagnostics: {}", result.diagnostics.len());
    if result.suppressed_count() > 0 {
        print!(
            "  {}",
            format!("({} suppressed)", result.suppressed_count()).dimmed()
        );
    }
    println!();
}

fn write_suppressed_summary(suppressed: &[SuppressedDiagnostic], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for sd in suppressed {
        let d = &sd.diagnostic;
        print!("    {:<44}", d.check.dimmed());
        println!("{}", position(&d.unit, d.span, d.location).blue());
    }
}
