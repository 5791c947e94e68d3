//! `evolution-zero-vector-init`: `Vector` values copied from `ZERO_VECTOR`
//! or built from zero float literals, where the default constructor already
//! yields the zero vector.

use crate::ast::{LangOptions, Literal, NodeCategory, NodeId, NodeKind, Span, Unit};
use crate::detect::{Diagnostic, DiagnosticBuilder, Edit};
use crate::matchers::dsl::*;
use crate::matchers::{Match, MatchContext, Matcher};

use super::{bound, CheckError};

const VECTOR: &str = "Vector";
const ZERO_VECTOR: &str = "ZERO_VECTOR";

const COPY_MESSAGE: &str = "Use default constructor instead of copying ZERO_VECTOR";
const FLOATS_MESSAGE: &str = "Use default constructor instead of initializing with 0.f arguments";

#[derive(Debug, Clone, Default)]
pub struct ZeroVectorInit;

fn vector_construction() -> Matcher {
    construct_expr().with(any_of([name_is(VECTOR), has_record_type_named(VECTOR)]))
}

fn zero_vector_ref() -> Matcher {
    decl_ref()
        .with(has_record_type_named(VECTOR))
        .with(name_is(ZERO_VECTOR))
}

fn zero_float_args(count: usize) -> Matcher {
    let zero = || float_literal().with(literal_equals(Literal::Float(0.0)));
    all_of(
        std::iter::once(argument_count_is(count))
            .chain((0..count).map(|i| has_argument(i, zero()))),
    )
}

impl ZeroVectorInit {
    pub const NAME: &'static str = "evolution-zero-vector-init";

    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        if !lang.cplusplus {
            return Vec::new();
        }
        let copied = vector_construction()
            .with(has_argument(0, ignoring_implicit(zero_vector_ref().bind("zero_vector"))))
            .with(unless(has_ancestor(ctor_initializer())))
            .bind("copy");
        let zero_floats = vector_construction()
            .with(any_of([zero_float_args(1), zero_float_args(3), zero_float_args(4)]))
            .bind("zero_floats");
        let assigned = operator_call()
            .with(operator_is("="))
            .with(has_argument(0, has_record_type_named(VECTOR)))
            .with(has_argument(1, ignoring_implicit(zero_vector_ref().bind("assigned_zero"))));
        vec![copied, zero_floats, assigned]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let diagnostic = if m.get("copy").is_some() {
            copied(unit, bound(m, "copy")?, bound(m, "zero_vector")?)
        } else if m.get("zero_floats").is_some() {
            zero_floats(unit, bound(m, "zero_floats")?)
        } else {
            let zero = unit.node(bound(m, "assigned_zero")?).span;
            DiagnosticBuilder::new(unit, Self::NAME, zero, COPY_MESSAGE)
                .edit(Edit::replace(zero, "Vector()"))
        };
        Ok(Some(diagnostic.finish()?))
    }
}

/// Everything after the declared name of a variable, up to its end.
fn initializer_of(unit: &Unit, construct: NodeId) -> Option<Span> {
    let var = unit.node(unit.parent(construct)?);
    if var.kind != NodeKind::VarDecl {
        return None;
    }
    let name = var.name_span?;
    Some(Span::new(name.end, var.span.end))
}

fn copied(unit: &Unit, construct: NodeId, zero: NodeId) -> DiagnosticBuilder<'_> {
    let zero = unit.node(zero).span;
    let builder = DiagnosticBuilder::new(unit, ZeroVectorInit::NAME, zero, COPY_MESSAGE);
    if let Some(initializer) = initializer_of(unit, construct) {
        return builder.edit(Edit::remove(initializer));
    }
    // a copy passed as an expression becomes an explicit default construction;
    // inside `Vector(ZERO_VECTOR)` the argument is simply dropped
    let in_expression = unit.parent(construct).is_some_and(|p| {
        let kind = unit.kind(p);
        kind != NodeKind::FunctionalCast
            && matches!(kind.category(), NodeCategory::Statement | NodeCategory::Expression)
    });
    if in_expression {
        builder.edit(Edit::replace(zero, "Vector()"))
    } else {
        builder.edit(Edit::remove(zero))
    }
}

fn zero_floats(unit: &Unit, construct: NodeId) -> DiagnosticBuilder<'_> {
    let removal = initializer_of(unit, construct).unwrap_or_else(|| {
        let args = unit.arguments(construct);
        let first = args.first().map(|&a| unit.node(a).span);
        let last = args.last().map(|&a| unit.node(a).span);
        match (first, last) {
            (Some(first), Some(last)) => first.to(last),
            _ => unit.node(construct).span,
        }
    });
    DiagnosticBuilder::new(unit, ZeroVectorInit::NAME, removal, FLOATS_MESSAGE)
        .edit(Edit::remove(removal))
}
