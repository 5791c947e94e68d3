//! `evolution-assert-usage`: assertion macros whose condition is a bare
//! string literal and therefore always true.

use serde::{Deserialize, Serialize};

use crate::ast::LangOptions;
use crate::detect::{Diagnostic, DiagnosticBuilder};
use crate::matchers::dsl::*;
use crate::matchers::{Match, MatchContext, Matcher};

use super::{bound, CheckError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssertUsageOptions {
    /// Macros treated as assertions.
    pub macro_names: Vec<String>,
}

impl Default for AssertUsageOptions {
    fn default() -> Self {
        Self {
            macro_names: vec!["Assert".into(), "DebugAssert".into(), "DebugVerify".into()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssertUsage {
    options: AssertUsageOptions,
}

impl AssertUsage {
    pub const NAME: &'static str = "evolution-assert-usage";

    pub fn new(options: AssertUsageOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssertUsageOptions {
        &self.options
    }

    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        if !(lang.cplusplus11 || lang.c99) {
            return Vec::new();
        }
        // the argument must be exactly one token: a lone string literal
        let lone_literal = string_literal().with(node_matches(|unit, n| unit.children(n).is_empty()));
        vec![macro_expansion()
            .with(has_any_name(self.options.macro_names.iter().cloned()))
            .with(has_argument(0, lone_literal))
            .bind("macro")]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let node = unit.node(bound(m, "macro")?);
        let Some(name) = node.name.as_deref() else {
            return Ok(None);
        };
        let diagnostic = DiagnosticBuilder::new(
            unit,
            Self::NAME,
            node.name_span.unwrap_or(node.span),
            "macro '%0' uses string literal as expression argument, it will always evaluate to true",
        )
        .arg(name)
        .finish()?;
        Ok(Some(diagnostic))
    }
}
