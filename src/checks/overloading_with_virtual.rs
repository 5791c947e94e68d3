//! `evolution-overloading-with-virtual`: a new virtual method that hides a
//! non-virtual base method with the same signature.

use std::collections::BTreeSet;

use crate::ast::{CallableInfo, LangOptions, SymbolId, SymbolKind, Unit};
use crate::detect::{Diagnostic, DiagnosticBuilder};
use crate::matchers::dsl::*;
use crate::matchers::{Match, MatchContext, Matcher};

use super::{bound, CheckError};

#[derive(Debug, Clone, Default)]
pub struct OverloadingWithVirtual;

impl OverloadingWithVirtual {
    pub const NAME: &'static str = "evolution-overloading-with-virtual";

    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        if !lang.cplusplus {
            return Vec::new();
        }
        vec![method_decl()
            .with(is_virtual())
            .with(unless(any_of([is_defaulted(), is_override()])))
            .with(has_parent(record_decl().with(is_derived())))
            .bind("method")]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let node = bound(m, "method")?;
        let Some(method) = unit.symbol_of(node) else {
            return Ok(None);
        };
        let (Some(record), Some(signature)) = (method.parent, method.callable.as_ref()) else {
            return Ok(None);
        };
        if !is_plain_identifier(&method.name) {
            return Ok(None);
        }

        let hidden = hidden_methods(unit, record, &method.name, signature);
        if hidden.is_empty() {
            return Ok(None);
        }

        let bases: BTreeSet<&str> = hidden
            .iter()
            .filter_map(|&h| unit.parent_record(h))
            .map(|r| r.name.as_str())
            .collect();
        let anchor = unit.node(node).span;
        let mut builder = DiagnosticBuilder::new(
            unit,
            Self::NAME,
            anchor,
            "method '%0' hides non-virtual method from base class %1",
        )
        .arg(method.name.as_str())
        .arg(bases.into_iter().collect::<Vec<_>>().join(", "));
        for h in hidden {
            let span = unit
                .symbol(h)
                .decl
                .map(|d| unit.node(d).span)
                .unwrap_or(anchor);
            builder = builder.note(span, "hidden method declared here");
        }
        Ok(Some(builder.finish()?))
    }
}

/// Non-virtual methods named `name` in any transitive base of `record` whose
/// parameter and return types equal `signature`'s.
fn hidden_methods(unit: &Unit, record: SymbolId, name: &str, signature: &CallableInfo) -> Vec<SymbolId> {
    let mut hidden = Vec::new();
    for base in unit.transitive_bases(record) {
        for candidate in unit.lookup(base, name) {
            if candidate.kind != SymbolKind::Method {
                continue;
            }
            let Some(c) = candidate.callable.as_ref() else {
                continue;
            };
            if c.is_virtual || c.params.len() != signature.params.len() {
                continue;
            }
            let same_params = c.params.iter().zip(&signature.params).all(|(a, b)| a == b);
            if same_params && c.return_type == signature.return_type {
                hidden.push(candidate.id);
            }
        }
    }
    hidden
}

/// Operators and destructors are not plain identifiers; `operatorCount` is.
fn is_plain_identifier(name: &str) -> bool {
    if name.is_empty() || name.starts_with('~') {
        return false;
    }
    match name.strip_prefix("operator") {
        Some(rest) => rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeId, NodeKind, QualType, RecordTag, UnitBuilder};
    use crate::matchers::find_all;

    fn int() -> QualType {
        QualType::builtin("int")
    }

    fn float() -> QualType {
        QualType::builtin("float")
    }

    fn method(params: Vec<QualType>, is_virtual: bool) -> CallableInfo {
        CallableInfo {
            params,
            is_virtual,
            ..CallableInfo::default()
        }
    }

    /// Wraps each record's method declarations in a `RecordDecl` node.
    struct Records {
        b: UnitBuilder,
        decls: Vec<NodeId>,
    }

    impl Records {
        fn new() -> Self {
            Self {
                b: UnitBuilder::new("v.cpp"),
                decls: Vec::new(),
            }
        }

        fn record(&mut self, name: &str, bases: &[SymbolId], methods: &[(&str, CallableInfo)]) -> SymbolId {
            let rec = self.b.declare_record(name, RecordTag::Class);
            for &base in bases {
                self.b.add_base(rec, base);
            }
            let mut children = Vec::new();
            for (name, callable) in methods {
                let m = self.b.declare_method(rec, name, callable.clone());
                let at = self.decls.len() as u32 * 10;
                children.push(self.b.add(Node::new(NodeKind::MethodDecl).with_symbol(m).spanning(at, at + 5)));
            }
            let decl = self.b.add(Node::new(NodeKind::RecordDecl).with_symbol(rec).with_children(children));
            self.decls.push(decl);
            rec
        }

        fn run(mut self) -> Vec<Diagnostic> {
            let root = self.b.add(Node::new(NodeKind::TranslationUnit).with_children(self.decls.clone()));
            let unit = self.b.build(root).unwrap();
            let cx = MatchContext::new(&unit);
            let check = OverloadingWithVirtual;
            let mut out = Vec::new();
            for matcher in check.matchers(unit.lang()) {
                for m in find_all(&cx, unit.root(), &matcher) {
                    out.extend(check.check(&cx, &m.unwrap()).unwrap());
                }
            }
            out
        }
    }

    #[test]
    fn test_hiding_virtual_is_flagged() {
        let mut r = Records::new();
        let base = r.record("Shape", &[], &[("draw", method(vec![int()], false))]);
        r.record("Circle", &[base], &[("draw", method(vec![int()], true))]);
        let diagnostics = r.run();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "method 'draw' hides non-virtual method from base class Shape"
        );
        assert_eq!(diagnostics[0].notes.len(), 1);
        assert_eq!(diagnostics[0].notes[0].message, "hidden method declared here");
    }

    #[test]
    fn test_operator_prefixed_identifier_is_checked() {
        let mut r = Records::new();
        let base = r.record(
            "Base",
            &[],
            &[
                ("operatorCount", method(vec![], false)),
                ("operator==", method(vec![int()], false)),
            ],
        );
        r.record(
            "Derived",
            &[base],
            &[
                ("operatorCount", method(vec![], true)),
                ("operator==", method(vec![int()], true)),
            ],
        );
        let diagnostics = r.run();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["operatorCount", "Base"]);
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("draw"));
        assert!(is_plain_identifier("operator_id"));
        assert!(is_plain_identifier("operators"));
        assert!(!is_plain_identifier("operator"));
        assert!(!is_plain_identifier("operator()"));
        assert!(!is_plain_identifier("operator new"));
        assert!(!is_plain_identifier("~Shape"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn test_signature_must_match_exactly() {
        let mut r = Records::new();
        let base = r.record(
            "Base",
            &[],
            &[
                ("a", method(vec![int(), float()], false)),
                ("b", method(vec![int()], false)),
                ("c", method(vec![], true)),
            ],
        );
        let mut returns_int = method(vec![int()], true);
        returns_int.return_type = int();
        r.record(
            "Derived",
            &[base],
            &[
                // same types, swapped positions
                ("a", method(vec![float(), int()], true)),
                ("b", returns_int),
                ("c", method(vec![], true)),
            ],
        );
        assert!(r.run().is_empty());
    }

    #[test]
    fn test_override_and_defaulted_are_skipped() {
        let mut r = Records::new();
        let base = r.record("Base", &[], &[("f", method(vec![], false))]);
        let mut overriding = method(vec![], true);
        overriding.is_override = true;
        r.record("Derived", &[base], &[("f", overriding)]);
        assert!(r.run().is_empty());
    }

    #[test]
    fn test_underived_records_never_match() {
        let mut r = Records::new();
        r.record("Alone", &[], &[("f", method(vec![], true))]);
        assert!(r.run().is_empty());
    }

    #[test]
    fn test_diamond_reports_once() {
        let mut r = Records::new();
        let top = r.record("Top", &[], &[("draw", method(vec![int()], false))]);
        let left = r.record("Left", &[top], &[]);
        let right = r.record("Right", &[top], &[]);
        r.record("Bottom", &[left, right], &[("draw", method(vec![int()], true))]);
        let diagnostics = r.run();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["draw", "Top"]);
        assert_eq!(diagnostics[0].notes.len(), 1);
    }
}
