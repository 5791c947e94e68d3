//! `evolution-symbol-non-copying-constructor`: `Symbol("literal")` copies
//! static string data that the non-copying constructor could reference.

use crate::ast::LangOptions;
use crate::detect::{Diagnostic, DiagnosticBuilder, Edit};
use crate::matchers::dsl::*;
use crate::matchers::{Match, MatchContext, Matcher};

use super::{bound, CheckError};

#[derive(Debug, Clone, Default)]
pub struct SymbolNonCopyingConstructor;

impl SymbolNonCopyingConstructor {
    pub const NAME: &'static str = "evolution-symbol-non-copying-constructor";

    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        if !lang.cplusplus {
            return Vec::new();
        }
        vec![construct_expr()
            .with(any_of([name_is("Symbol"), has_record_type_named("Symbol")]))
            .with(argument_count_is(1))
            .with(has_argument(0, string_literal().bind("literal")))
            .bind("construct")]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let construct = unit.node(bound(m, "construct")?).span;
        let literal = unit.node(bound(m, "literal")?).span;
        let diagnostic = DiagnosticBuilder::new(
            unit,
            Self::NAME,
            construct,
            "Symbol constructed with string literal should use non-copying constructor",
        )
        .edit(Edit::insert(literal.end, ", Symbol::NONCOPYING_CONSTRUCTOR"))
        .finish()?;
        Ok(Some(diagnostic))
    }
}
