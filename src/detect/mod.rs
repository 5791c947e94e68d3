//! Diagnostics, suppression, and the runner that drives checks over units.

mod runner;
mod suppress;
mod types;

pub use runner::Runner;
pub use suppress::{
    filter_suppressed, matches_suppression, parse_suppressions, SuppressedDiagnostic, Suppression,
    SuppressionType,
};
pub use types::{
    render, CheckFailure, Diagnostic, DiagnosticBuilder, DiagnosticError, Edit, EditKind,
    LintResult, LoadFailure, Note, Severity,
};
