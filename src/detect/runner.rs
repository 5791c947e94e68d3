//! Lint runner that drives the enabled checks over units.

use std::ops::ControlFlow;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::ast::{load_unit, Unit};
use crate::checks::{CheckError, CheckRegistry};
use crate::config::Config;
use crate::matchers::MatchContext;

use super::{filter_suppressed, parse_suppressions, CheckFailure, LintResult, LoadFailure};

/// Executes a table of checks against units.
pub struct Runner {
    registry: CheckRegistry,
    parallel: bool,
}

impl Runner {
    /// Create a runner over an explicit check table.
    pub fn new(registry: CheckRegistry) -> Self {
        Self {
            registry,
            parallel: true,
        }
    }

    /// Create a runner with the checks and options selected by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(CheckRegistry::from_config(config)?).parallel(config.parallel))
    }

    /// Set whether units are analyzed on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Run every check over one unit and apply its inline suppressions.
    pub fn lint_unit(&self, unit: &Unit) -> LintResult {
        let mut result = LintResult::new();
        result.scanned = 1;

        let finder = self.registry.finder(unit.lang());
        debug!(unit = unit.name(), matchers = finder.len(), "linting unit");
        if finder.is_empty() {
            return result;
        }

        let cx = MatchContext::new(unit);
        let mut diagnostics = Vec::new();
        finder.run(&cx, unit.root(), |&index, event| {
            let Some(check) = self.registry.get(index) else {
                return ControlFlow::Break(());
            };
            let outcome = event
                .map_err(CheckError::from)
                .and_then(|m| check.check(&cx, &m));
            match outcome {
                Ok(Some(diagnostic)) => {
                    debug!(check = check.name(), span = %diagnostic.span, "diagnostic");
                    diagnostics.push(diagnostic);
                    ControlFlow::Continue(())
                }
                Ok(None) => ControlFlow::Continue(()),
                Err(e) => {
                    warn!(check = check.name(), unit = unit.name(), "check aborted: {}", e);
                    result.failures.push(CheckFailure {
                        check: check.name().to_string(),
                        unit: unit.name().to_string(),
                        error: e.to_string(),
                    });
                    ControlFlow::Break(())
                }
            }
        });

        match unit.source() {
            Some(source) => {
                let suppressions = parse_suppressions(unit.name(), source);
                let (active, suppressed) = filter_suppressed(diagnostics, &suppressions);
                result.diagnostics = active;
                result.suppressed = suppressed;
            }
            None => result.diagnostics = diagnostics,
        }

        result
    }

    /// Lint several units; results are merged in input order.
    pub fn lint_units(&self, units: &[Unit]) -> LintResult {
        let per_unit: Vec<LintResult> = if self.parallel {
            units.par_iter().map(|u| self.lint_unit(u)).collect()
        } else {
            units.iter().map(|u| self.lint_unit(u)).collect()
        };

        let mut result = LintResult::new();
        for r in per_unit {
            result.merge(r);
        }
        result
    }

    /// Load and lint unit files. Unreadable files are reported, not fatal.
    pub fn run_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> LintResult {
        let lint_path = |path: &P| -> LintResult {
            let path = path.as_ref();
            match load_unit(path) {
                Ok(unit) => self.lint_unit(&unit),
                Err(e) => {
                    warn!(path = %path.display(), "skipping unit: {:#}", e);
                    LintResult {
                        load_failures: vec![LoadFailure {
                            path: path.display().to_string(),
                            error: format!("{:#}", e),
                        }],
                        ..LintResult::default()
                    }
                }
            }
        };

        let per_file: Vec<LintResult> = if self.parallel {
            paths.par_iter().map(lint_path).collect()
        } else {
            paths.iter().map(lint_path).collect()
        };

        let mut result = LintResult::new();
        for r in per_file {
            result.merge(r);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, Node, NodeKind, QualType, RecordTag, UnitBuilder};
    use crate::checks::{AssertUsage, Check, SymbolNonCopyingConstructor};
    use tempfile::TempDir;

    fn assert_macro(b: &mut UnitBuilder, start: u32, text: &str) -> crate::ast::NodeId {
        let lit_end = start + 7 + text.len() as u32 + 2;
        let lit = b.add(
            Node::new(NodeKind::StringLiteral)
                .spanning(start + 7, lit_end)
                .with_literal(Literal::Str(text.into())),
        );
        b.add(
            Node::new(NodeKind::MacroExpansion)
                .named("Assert")
                .spanning(start, lit_end + 1)
                .with_name_span(start, start + 6)
                .with_children([lit]),
        )
    }

    /// Two flagged asserts; the first carries `// NOLINT`.
    fn suppressed_unit(name: &str) -> Unit {
        let source = "Assert(\"a\"); // NOLINT\nAssert(\"b\");\n";
        let mut b = UnitBuilder::new(name).with_source(source);
        let first = assert_macro(&mut b, 0, "a");
        let second = assert_macro(&mut b, 23, "b");
        let root = b.add(Node::new(NodeKind::TranslationUnit).with_children([first, second]));
        b.build(root).unwrap()
    }

    fn assert_runner() -> Runner {
        Runner::new(CheckRegistry::new(vec![Check::AssertUsage(AssertUsage::default())]))
    }

    #[test]
    fn test_lint_unit_applies_suppressions() {
        let result = assert_runner().lint_unit(&suppressed_unit("a.cpp"));
        assert_eq!(result.scanned, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line(), Some(2));
        assert_eq!(result.suppressed_count(), 1);
        assert_eq!(result.suppressed[0].diagnostic.line(), Some(1));
        assert!(!result.is_clean());
    }

    #[test]
    fn test_check_failure_is_isolated() {
        // the literal's span runs past the end of the source, so the
        // symbol check's insertion edit is rejected
        let mut b = UnitBuilder::new("f.cpp").with_source("Assert(\"a\");\n");
        let assert = assert_macro(&mut b, 0, "a");
        let symbol = b.declare_record("Symbol", RecordTag::Class);
        let lit = b.add(Node::new(NodeKind::StringLiteral).spanning(40, 46));
        let construct = b.add(
            Node::new(NodeKind::Construct)
                .typed(QualType::record(symbol))
                .spanning(30, 47)
                .with_children([lit]),
        );
        let root = b.add(Node::new(NodeKind::TranslationUnit).with_children([assert, construct]));
        let unit = b.build(root).unwrap();

        let runner = Runner::new(CheckRegistry::new(vec![
            Check::SymbolNonCopyingConstructor(SymbolNonCopyingConstructor),
            Check::AssertUsage(AssertUsage::default()),
        ]));
        let result = runner.lint_unit(&unit);

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].check, SymbolNonCopyingConstructor::NAME);
        assert_eq!(result.failures[0].unit, "f.cpp");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].check, AssertUsage::NAME);
        assert!(result.has_failures());
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let units: Vec<Unit> = (0..8).map(|i| suppressed_unit(&format!("u{}.cpp", i))).collect();
        let parallel = assert_runner().parallel(true).lint_units(&units);
        let sequential = assert_runner().parallel(false).lint_units(&units);

        assert_eq!(parallel.scanned, 8);
        assert_eq!(parallel.diagnostics, sequential.diagnostics);
        let names: Vec<&str> = parallel.diagnostics.iter().map(|d| d.unit.as_str()).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("u{}.cpp", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_empty_registry() {
        let runner = Runner::new(CheckRegistry::default());
        let result = runner.lint_unit(&suppressed_unit("a.cpp"));
        assert!(result.is_clean());
        assert_eq!(result.scanned, 1);
    }

    #[test]
    fn test_run_files_reports_unloadable_units() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.json");
        std::fs::write(
            &good,
            r#"{
                "name": "good.cpp",
                "source": "Assert(\"x\");\n",
                "root": {"kind": "translation_unit", "span": {"start": 0, "end": 12}, "children": [
                    {"kind": "macro_expansion", "name": "Assert",
                     "span": {"start": 0, "end": 11}, "name_span": {"start": 0, "end": 6},
                     "children": [
                        {"kind": "string_literal", "span": {"start": 7, "end": 10},
                         "literal": {"kind": "str", "value": "x"}}
                     ]}
                ]}
            }"#,
        )
        .unwrap();
        let bad = temp.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();

        let result = assert_runner().run_files(&[good, bad.clone()]);
        assert_eq!(result.scanned, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].unit, "good.cpp");
        assert_eq!(result.load_failures.len(), 1);
        assert_eq!(result.load_failures[0].path, bad.display().to_string());
        assert!(!result.is_clean());
    }
}
