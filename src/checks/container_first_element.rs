//! `evolution-container-first-element-access`: `&c[0]` on a container that
//! exposes `data()`.

use crate::ast::{Access, LangOptions, Literal, QualType, SymbolId, SymbolKind, Unit};
use crate::detect::{Diagnostic, DiagnosticBuilder};
use crate::matchers::dsl::*;
use crate::matchers::{Match, MatchContext, Matcher};

use super::{bound, CheckError};

#[derive(Debug, Clone, Default)]
pub struct ContainerFirstElementAccess;

impl ContainerFirstElementAccess {
    pub const NAME: &'static str = "evolution-container-first-element-access";

    pub fn matchers(&self, _lang: &LangOptions) -> Vec<Matcher> {
        vec![operator_call()
            .with(operator_is("[]"))
            .with(has_argument(0, has_type(is_container)))
            .with(has_argument(1, integer_literal().with(literal_equals(Literal::Int(0)))))
            .with(has_parent(unary_operator().with(operator_is("&"))))
            .bind("subscript")]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let span = unit.node(bound(m, "subscript")?).span;
        let diagnostic = DiagnosticBuilder::new(
            unit,
            Self::NAME,
            span,
            "the 'data' method should be used to access address of first element of the container",
        )
        .finish()?;
        Ok(Some(diagnostic))
    }
}

/// The record named by `ty`, through one reference or pointer, declares (or
/// inherits) both `operator[]` and a public `data()` returning a pointer.
fn is_container(unit: &Unit, ty: &QualType) -> bool {
    let ty = ty.non_reference();
    let Some(record) = ty.pointee().unwrap_or(ty).as_record() else {
        return false;
    };
    std::iter::once(record)
        .chain(unit.transitive_bases(record))
        .any(|r| declares_container_api(unit, r))
}

fn declares_container_api(unit: &Unit, record: SymbolId) -> bool {
    let has_subscript = unit
        .lookup(record, "operator[]")
        .any(|m| m.kind == SymbolKind::Method);
    let has_data = unit.lookup(record, "data").any(|m| {
        m.access == Access::Public
            && m.callable
                .as_ref()
                .is_some_and(|c| c.params.is_empty() && c.return_type.is_pointer())
    });
    has_subscript && has_data
}
