//! Declarative, composable predicates over [`Unit`] nodes.
//!
//! A [`Matcher`] is an immutable value built from the free functions in
//! [`dsl`]. Evaluating it at a node either fails with no side effect or
//! succeeds with a [`BindingSet`] of named captures added by
//! [`Matcher::bind`]:
//!
//! ```
//! use evolint::ast::{Node, NodeKind, UnitBuilder};
//! use evolint::matchers::{dsl::*, MatchContext};
//!
//! let mut b = UnitBuilder::new("demo.cpp");
//! let lit = b.add(Node::new(NodeKind::StringLiteral));
//! let call = b.add(Node::new(NodeKind::MacroExpansion).named("Assert").with_children([lit]));
//! let root = b.add(Node::new(NodeKind::TranslationUnit).with_children([call]));
//! let unit = b.build(root).unwrap();
//!
//! let m = all_of([
//!     kind_is(NodeKind::MacroExpansion),
//!     has_argument(0, string_literal().bind("arg")),
//! ]);
//! let bound = m.matches(&MatchContext::new(&unit), call).unwrap().unwrap();
//! assert_eq!(bound.get("arg"), Some(lit));
//! ```

pub mod dsl;
mod finder;

use std::fmt;
use std::sync::Arc;

use crate::ast::{LangOptions, Literal, NodeId, NodeKind, QualType, Symbol, Unit};

pub use finder::{find_all, match_all, Match, MatchFinder, Matches};

/// Invariant violations raised while evaluating a matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("capture '{0}' bound twice in one match")]
    DuplicateBinding(String),
}

/// Read-only ambient state shared by every evaluation over one unit.
#[derive(Clone, Copy)]
pub struct MatchContext<'u> {
    unit: &'u Unit,
}

impl<'u> MatchContext<'u> {
    pub fn new(unit: &'u Unit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &'u Unit {
        self.unit
    }

    pub fn lang(&self) -> &'u LangOptions {
        self.unit.lang()
    }
}

/// Named captures from one successful match. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSet {
    entries: Vec<(String, NodeId)>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures in the order they were bound.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub fn insert(&mut self, name: &str, node: NodeId) -> Result<(), MatchError> {
        if self.contains(name) {
            return Err(MatchError::DuplicateBinding(name.to_string()));
        }
        self.entries.push((name.to_string(), node));
        Ok(())
    }

    fn checkpoint(&self) -> usize {
        self.entries.len()
    }

    fn rollback(&mut self, checkpoint: usize) {
        self.entries.truncate(checkpoint);
    }
}

type TypePredicate = dyn Fn(&Unit, &QualType) -> bool + Send + Sync;
type SymbolPredicate = dyn Fn(&Unit, &Symbol) -> bool + Send + Sync;
type NodePredicate = dyn Fn(&Unit, NodeId) -> bool + Send + Sync;

pub(crate) enum MatcherKind {
    Anything,
    Kind(NodeKind),
    Name(String),
    AnyName(Vec<String>),
    Operator(String),
    Literal(Literal),
    Implicit,
    Type(Box<TypePredicate>),
    Symbol(Box<SymbolPredicate>),
    Node(Box<NodePredicate>),
    AllOf(Vec<Matcher>),
    AnyOf(Vec<Matcher>),
    Unless(Matcher),
    HasAncestor(Matcher),
    HasDescendant(Matcher),
    Has(Matcher),
    HasParent(Matcher),
    Child(usize, Matcher),
    HasArgument(usize, Matcher),
    ArgumentCount(usize),
    IgnoringImplicit(Matcher),
    HasDeclaration(Matcher),
    On(Matcher),
    Bind(String, Matcher),
}

/// An immutable, cheaply clonable node predicate.
#[derive(Clone)]
pub struct Matcher(Arc<MatcherKind>);

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            MatcherKind::Anything => write!(f, "anything()"),
            MatcherKind::Kind(k) => write!(f, "kind_is({:?})", k),
            MatcherKind::Name(n) => write!(f, "name_is({:?})", n),
            MatcherKind::AnyName(n) => write!(f, "has_any_name({:?})", n),
            MatcherKind::Operator(op) => write!(f, "operator_is({:?})", op),
            MatcherKind::Literal(l) => write!(f, "literal_equals({:?})", l),
            MatcherKind::Implicit => write!(f, "is_implicit()"),
            MatcherKind::Type(_) => write!(f, "has_type(..)"),
            MatcherKind::Symbol(_) => write!(f, "symbol_matches(..)"),
            MatcherKind::Node(_) => write!(f, "node_matches(..)"),
            MatcherKind::AllOf(ms) => f.debug_tuple("all_of").field(ms).finish(),
            MatcherKind::AnyOf(ms) => f.debug_tuple("any_of").field(ms).finish(),
            MatcherKind::Unless(m) => f.debug_tuple("unless").field(m).finish(),
            MatcherKind::HasAncestor(m) => f.debug_tuple("has_ancestor").field(m).finish(),
            MatcherKind::HasDescendant(m) => f.debug_tuple("has_descendant").field(m).finish(),
            MatcherKind::Has(m) => f.debug_tuple("has").field(m).finish(),
            MatcherKind::HasParent(m) => f.debug_tuple("has_parent").field(m).finish(),
            MatcherKind::Child(i, m) => f.debug_tuple("has_child").field(i).field(m).finish(),
            MatcherKind::HasArgument(i, m) => {
                f.debug_tuple("has_argument").field(i).field(m).finish()
            }
            MatcherKind::ArgumentCount(n) => write!(f, "argument_count_is({})", n),
            MatcherKind::IgnoringImplicit(m) => {
                f.debug_tuple("ignoring_implicit").field(m).finish()
            }
            MatcherKind::HasDeclaration(m) => f.debug_tuple("has_declaration").field(m).finish(),
            MatcherKind::On(m) => f.debug_tuple("on").field(m).finish(),
            MatcherKind::Bind(name, m) => write!(f, "{:?}.bind({:?})", m, name),
        }
    }
}

impl Matcher {
    pub(crate) fn from_kind(kind: MatcherKind) -> Self {
        Self(Arc::new(kind))
    }

    /// Capture the node this matcher succeeds on under `name`.
    pub fn bind(self, name: &str) -> Matcher {
        Matcher::from_kind(MatcherKind::Bind(name.to_string(), self))
    }

    /// Shorthand for `all_of([self, other])`.
    pub fn with(self, other: Matcher) -> Matcher {
        dsl::all_of([self, other])
    }

    /// Evaluate at `node`, returning the captures on success.
    pub fn matches(
        &self,
        cx: &MatchContext<'_>,
        node: NodeId,
    ) -> Result<Option<BindingSet>, MatchError> {
        let mut bindings = BindingSet::new();
        Ok(self.eval(cx, node, &mut bindings)?.then_some(bindings))
    }

    /// Evaluate at `node` without collecting captures.
    pub fn is_match(&self, cx: &MatchContext<'_>, node: NodeId) -> Result<bool, MatchError> {
        Ok(self.matches(cx, node)?.is_some())
    }

    /// Evaluate at `node`, extending `bindings` on success and leaving it
    /// untouched on failure.
    pub(crate) fn eval(
        &self,
        cx: &MatchContext<'_>,
        node: NodeId,
        bindings: &mut BindingSet,
    ) -> Result<bool, MatchError> {
        let checkpoint = bindings.checkpoint();
        let matched = self.eval_inner(cx, node, bindings)?;
        if !matched {
            bindings.rollback(checkpoint);
        }
        Ok(matched)
    }

    fn eval_inner(
        &self,
        cx: &MatchContext<'_>,
        node: NodeId,
        bindings: &mut BindingSet,
    ) -> Result<bool, MatchError> {
        let unit = cx.unit();
        let n = unit.node(node);
        match &*self.0 {
            MatcherKind::Anything => Ok(true),
            MatcherKind::Kind(kind) => Ok(n.kind == *kind),
            MatcherKind::Name(name) => Ok(node_name(unit, node) == Some(name.as_str())),
            MatcherKind::AnyName(names) => Ok(node_name(unit, node)
                .map(|actual| names.iter().any(|candidate| candidate == actual))
                .unwrap_or(false)),
            MatcherKind::Operator(op) => Ok(n.operator.as_deref() == Some(op.as_str())),
            MatcherKind::Literal(expected) => Ok(n.literal.as_ref() == Some(expected)),
            MatcherKind::Implicit => Ok(n.implicit),
            MatcherKind::Type(pred) => Ok(node_type(unit, node)
                .map(|ty| pred(unit, ty))
                .unwrap_or(false)),
            MatcherKind::Symbol(pred) => Ok(unit
                .symbol_of(node)
                .map(|s| pred(unit, s))
                .unwrap_or(false)),
            MatcherKind::Node(pred) => Ok(pred(unit, node)),
            MatcherKind::AllOf(ms) => {
                for m in ms {
                    if !m.eval(cx, node, bindings)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            MatcherKind::AnyOf(ms) => {
                for m in ms {
                    if m.eval(cx, node, bindings)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            MatcherKind::Unless(m) => {
                let mut scratch = BindingSet::new();
                Ok(!m.eval(cx, node, &mut scratch)?)
            }
            MatcherKind::HasAncestor(m) => {
                for ancestor in unit.ancestors(node) {
                    if m.eval(cx, ancestor, bindings)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            MatcherKind::HasDescendant(m) => {
                for descendant in unit.descendants(node).skip(1) {
                    if m.eval(cx, descendant, bindings)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            MatcherKind::Has(m) => {
                for &child in unit.children(node) {
                    if m.eval(cx, child, bindings)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            MatcherKind::HasParent(m) => match unit.parent(node) {
                Some(parent) => m.eval(cx, parent, bindings),
                None => Ok(false),
            },
            MatcherKind::Child(index, m) => match unit.children(node).get(*index) {
                Some(&child) => m.eval(cx, child, bindings),
                None => Ok(false),
            },
            MatcherKind::HasArgument(index, m) => match unit.arguments(node).get(*index) {
                Some(&arg) => m.eval(cx, arg, bindings),
                None => Ok(false),
            },
            MatcherKind::ArgumentCount(count) => {
                Ok(n.kind.has_arguments() && unit.arguments(node).len() == *count)
            }
            MatcherKind::IgnoringImplicit(m) => m.eval(cx, unit.ignore_implicit(node), bindings),
            MatcherKind::HasDeclaration(m) => {
                match unit.symbol_of(node).and_then(|s| s.decl) {
                    Some(decl) => m.eval(cx, decl, bindings),
                    None => Ok(false),
                }
            }
            MatcherKind::On(m) => match unit.member_call_object(node) {
                Some(object) => m.eval(cx, unit.ignore_implicit(object), bindings),
                None => Ok(false),
            },
            MatcherKind::Bind(name, m) => {
                if !m.eval(cx, node, bindings)? {
                    return Ok(false);
                }
                bindings.insert(name, node)?;
                Ok(true)
            }
        }
    }
}

/// Name carried by the node, or the name of the symbol it refers to.
fn node_name(unit: &Unit, node: NodeId) -> Option<&str> {
    let n = unit.node(node);
    n.name
        .as_deref()
        .or_else(|| unit.symbol_of(node).map(|s| s.name.as_str()))
}

/// Expression type, or the declared type of the symbol a declaration names.
fn node_type(unit: &Unit, node: NodeId) -> Option<&QualType> {
    let n = unit.node(node);
    n.ty
        .as_ref()
        .or_else(|| unit.symbol_of(node).and_then(|s| s.ty.as_ref()))
}
