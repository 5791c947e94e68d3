//! Evolint - static analysis for C/C++ code-evolution hazards.
//!
//! Evolint runs a small set of checks over translation units exported by a
//! compiler front end. The headline check verifies that every user-written
//! assignment operator assigns each data member of its class, either
//! directly or through a helper it calls.
//!
//! # Architecture
//!
//! - `ast`: Immutable node/symbol arena and the JSON unit loader
//! - `matchers`: Composable node predicates with named captures
//! - `checks`: The check table and each check's matchers and analysis
//! - `detect`: Diagnostics, inline suppression and the runner
//! - `config`: YAML config schema and check selection
//! - `report`: Output formatting (text, JSON)
//!
//! # Adding a New Check
//!
//! Add a module under `src/checks/`, give it a `NAME`, `matchers` and
//! `check`, then add a `Check` variant and a row in `CHECKS`.

pub mod ast;
pub mod checks;
pub mod cli;
pub mod config;
pub mod detect;
pub mod matchers;
pub mod report;

pub use ast::{load_unit, parse_unit, Unit, UnitBuilder};
pub use checks::{Check, CheckRegistry};
pub use config::Config;
pub use detect::{Diagnostic, LintResult, Runner};
