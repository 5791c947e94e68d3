//! The closed set of checks and the registration table that owns them.
//!
//! Each check registers one or more matchers for a unit's language options
//! and receives every match back through [`Check::check`], returning at most
//! one diagnostic per match.

mod assert_usage;
mod container_first_element;
mod overloading_with_virtual;
mod symbol_non_copying_ctor;
mod type_member_assign;
mod zero_vector_init;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::ast::{LangOptions, NodeId};
use crate::config::Config;
use crate::detect::{Diagnostic, DiagnosticError};
use crate::matchers::{Match, MatchContext, MatchError, MatchFinder, Matcher};

pub use assert_usage::{AssertUsage, AssertUsageOptions};
pub use container_first_element::ContainerFirstElementAccess;
pub use overloading_with_virtual::OverloadingWithVirtual;
pub use symbol_non_copying_ctor::SymbolNonCopyingConstructor;
pub use type_member_assign::{
    FieldObligation, FieldStatus, Obligations, TypeMemberAssign, TypeMemberAssignOptions,
};
pub use zero_vector_init::ZeroVectorInit;

/// Errors that abort one check on one unit.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),
    #[error("match is missing capture '{0}'")]
    MissingBinding(&'static str),
}

/// Look up a capture the check's own matcher is known to bind.
pub(crate) fn bound(m: &Match, name: &'static str) -> Result<NodeId, CheckError> {
    m.get(name).ok_or(CheckError::MissingBinding(name))
}

/// Every check name with a one-line description, in registration order.
pub const CHECKS: &[(&str, &str)] = &[
    (
        TypeMemberAssign::NAME,
        "user-defined assignment operators must assign every data member",
    ),
    (
        OverloadingWithVirtual::NAME,
        "virtual methods must not hide a non-virtual base method with the same signature",
    ),
    (
        AssertUsage::NAME,
        "assertion macros must not take a bare string literal as their condition",
    ),
    (
        ZeroVectorInit::NAME,
        "Vector values should be default-constructed instead of copied from zero",
    ),
    (
        SymbolNonCopyingConstructor::NAME,
        "Symbol built from a string literal should use the non-copying constructor",
    ),
    (
        ContainerFirstElementAccess::NAME,
        "use data() instead of &container[0]",
    ),
];

/// One configured check.
#[derive(Debug, Clone)]
pub enum Check {
    TypeMemberAssign(TypeMemberAssign),
    OverloadingWithVirtual(OverloadingWithVirtual),
    AssertUsage(AssertUsage),
    ZeroVectorInit(ZeroVectorInit),
    SymbolNonCopyingConstructor(SymbolNonCopyingConstructor),
    ContainerFirstElementAccess(ContainerFirstElementAccess),
}

fn options<T: DeserializeOwned + Default>(
    name: &str,
    value: Option<&serde_yaml::Value>,
) -> anyhow::Result<T> {
    match value {
        Some(v) if !v.is_null() => serde_yaml::from_value(v.clone())
            .with_context(|| format!("invalid options for check {}", name)),
        _ => Ok(T::default()),
    }
}

impl Check {
    /// Build a check by name, reading its options from `value` when given.
    pub fn configure(name: &str, value: Option<&serde_yaml::Value>) -> anyhow::Result<Check> {
        let check = match name {
            TypeMemberAssign::NAME => {
                Check::TypeMemberAssign(TypeMemberAssign::new(options(name, value)?))
            }
            OverloadingWithVirtual::NAME => {
                Check::OverloadingWithVirtual(OverloadingWithVirtual::default())
            }
            AssertUsage::NAME => Check::AssertUsage(AssertUsage::new(options(name, value)?)),
            ZeroVectorInit::NAME => Check::ZeroVectorInit(ZeroVectorInit::default()),
            SymbolNonCopyingConstructor::NAME => {
                Check::SymbolNonCopyingConstructor(SymbolNonCopyingConstructor::default())
            }
            ContainerFirstElementAccess::NAME => {
                Check::ContainerFirstElementAccess(ContainerFirstElementAccess::default())
            }
            other => anyhow::bail!("unknown check {:?}", other),
        };
        Ok(check)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Check::TypeMemberAssign(_) => TypeMemberAssign::NAME,
            Check::OverloadingWithVirtual(_) => OverloadingWithVirtual::NAME,
            Check::AssertUsage(_) => AssertUsage::NAME,
            Check::ZeroVectorInit(_) => ZeroVectorInit::NAME,
            Check::SymbolNonCopyingConstructor(_) => SymbolNonCopyingConstructor::NAME,
            Check::ContainerFirstElementAccess(_) => ContainerFirstElementAccess::NAME,
        }
    }

    /// Matchers this check wants run over units with the given language mode.
    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        match self {
            Check::TypeMemberAssign(c) => c.matchers(lang),
            Check::OverloadingWithVirtual(c) => c.matchers(lang),
            Check::AssertUsage(c) => c.matchers(lang),
            Check::ZeroVectorInit(c) => c.matchers(lang),
            Check::SymbolNonCopyingConstructor(c) => c.matchers(lang),
            Check::ContainerFirstElementAccess(c) => c.matchers(lang),
        }
    }

    /// Inspect one match and decide whether to report it.
    pub fn check(
        &self,
        cx: &MatchContext<'_>,
        m: &Match,
    ) -> Result<Option<Diagnostic>, CheckError> {
        match self {
            Check::TypeMemberAssign(c) => c.check(cx, m),
            Check::OverloadingWithVirtual(c) => c.check(cx, m),
            Check::AssertUsage(c) => c.check(cx, m),
            Check::ZeroVectorInit(c) => c.check(cx, m),
            Check::SymbolNonCopyingConstructor(c) => c.check(cx, m),
            Check::ContainerFirstElementAccess(c) => c.check(cx, m),
        }
    }
}

/// The explicit table of enabled checks, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    pub fn new(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    /// Every check enabled by `config`, with its configured options.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let selector = config.check_selector()?;
        let mut checks = Vec::new();
        for (name, _) in CHECKS {
            if selector.is_enabled(name) {
                checks.push(Check::configure(name, config.check_options.get(*name))?);
            }
        }
        Ok(Self { checks })
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Check> {
        self.checks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter()
    }

    /// A finder holding every check's matchers for `lang`, keyed by the
    /// check's position in this table.
    pub fn finder(&self, lang: &LangOptions) -> MatchFinder<usize> {
        let mut finder = MatchFinder::new();
        for (index, check) in self.checks.iter().enumerate() {
            for matcher in check.matchers(lang) {
                finder.add_matcher(matcher, index);
            }
        }
        finder
    }
}

/// Run a single check over a whole unit, in traversal order.
#[cfg(test)]
pub(crate) fn run_one(check: Check, unit: &crate::ast::Unit) -> Vec<Diagnostic> {
    let registry = CheckRegistry::new(vec![check]);
    let cx = MatchContext::new(unit);
    let mut out = Vec::new();
    registry.finder(unit.lang()).run(&cx, unit.root(), |&index, event| {
        let check = registry.get(index).unwrap();
        out.extend(check.check(&cx, &event.unwrap()).unwrap());
        std::ops::ControlFlow::Continue(())
    });
    out
}
