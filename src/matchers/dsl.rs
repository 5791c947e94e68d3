//! Free functions that build [`Matcher`] values.
//!
//! Primitives test one attribute of the current node; traversal combinators
//! move the evaluation to related nodes; symbol predicates inspect the
//! symbol a node declares or refers to.

use crate::ast::{Access, Literal, NodeId, NodeKind, QualType, Symbol, Unit};

use super::{Matcher, MatcherKind};

// Primitives

pub fn anything() -> Matcher {
    Matcher::from_kind(MatcherKind::Anything)
}

pub fn kind_is(kind: NodeKind) -> Matcher {
    Matcher::from_kind(MatcherKind::Kind(kind))
}

/// The node's own name, or the name of the symbol it declares or references.
pub fn name_is(name: &str) -> Matcher {
    Matcher::from_kind(MatcherKind::Name(name.to_string()))
}

pub fn has_any_name<I, S>(names: I) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Matcher::from_kind(MatcherKind::AnyName(
        names.into_iter().map(Into::into).collect(),
    ))
}

pub fn operator_is(op: &str) -> Matcher {
    Matcher::from_kind(MatcherKind::Operator(op.to_string()))
}

pub fn literal_equals(value: Literal) -> Matcher {
    Matcher::from_kind(MatcherKind::Literal(value))
}

pub fn is_implicit() -> Matcher {
    Matcher::from_kind(MatcherKind::Implicit)
}

/// Test the expression type, or the declared type for declarations.
pub fn has_type<F>(pred: F) -> Matcher
where
    F: Fn(&Unit, &QualType) -> bool + Send + Sync + 'static,
{
    Matcher::from_kind(MatcherKind::Type(Box::new(pred)))
}

/// Test the symbol the node declares or references. Fails when there is none.
pub fn symbol_matches<F>(pred: F) -> Matcher
where
    F: Fn(&Unit, &Symbol) -> bool + Send + Sync + 'static,
{
    Matcher::from_kind(MatcherKind::Symbol(Box::new(pred)))
}

/// Escape hatch for predicates that need the node id itself.
pub fn node_matches<F>(pred: F) -> Matcher
where
    F: Fn(&Unit, NodeId) -> bool + Send + Sync + 'static,
{
    Matcher::from_kind(MatcherKind::Node(Box::new(pred)))
}

// Combinators

/// All must hold on the same node; stops at the first failure.
pub fn all_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
    Matcher::from_kind(MatcherKind::AllOf(matchers.into_iter().collect()))
}

/// First successful branch wins, left to right; its captures are kept.
pub fn any_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
    Matcher::from_kind(MatcherKind::AnyOf(matchers.into_iter().collect()))
}

/// Negation. Captures made inside are always discarded.
pub fn unless(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::Unless(inner))
}

/// Some strict ancestor matches, nearest first.
pub fn has_ancestor(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::HasAncestor(inner))
}

/// Some node strictly below this one matches, in pre-order.
pub fn has_descendant(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::HasDescendant(inner))
}

/// Some direct child matches.
pub fn has(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::Has(inner))
}

/// The immediate parent matches.
pub fn has_parent(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::HasParent(inner))
}

/// The `index`-th child matches. Fails when out of range.
pub fn has_child(index: usize, inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::Child(index, inner))
}

/// Left operand of a binary operator.
pub fn has_lhs(inner: Matcher) -> Matcher {
    has_child(0, inner)
}

/// Right operand of a binary operator.
pub fn has_rhs(inner: Matcher) -> Matcher {
    has_child(1, inner)
}

/// The `index`-th argument of a call-like node matches. Fails when out of range.
pub fn has_argument(index: usize, inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::HasArgument(index, inner))
}

pub fn argument_count_is(count: usize) -> Matcher {
    Matcher::from_kind(MatcherKind::ArgumentCount(count))
}

pub fn ignoring_implicit(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::IgnoringImplicit(inner))
}

/// Apply `inner` to the declaration node of the referenced symbol.
pub fn has_declaration(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::HasDeclaration(inner))
}

/// Apply `inner` to the object expression of a member call.
pub fn on(inner: Matcher) -> Matcher {
    Matcher::from_kind(MatcherKind::On(inner))
}

// Node kinds

macro_rules! kind_matchers {
    ($($fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $fn_name() -> Matcher {
                kind_is(NodeKind::$kind)
            }
        )*
    };
}

kind_matchers! {
    record_decl => RecordDecl,
    field_decl => FieldDecl,
    method_decl => MethodDecl,
    function_decl => FunctionDecl,
    var_decl => VarDecl,
    ctor_initializer => CtorInitializer,
    compound_stmt => CompoundStmt,
    binary_operator => BinaryOperator,
    unary_operator => UnaryOperator,
    operator_call => OperatorCall,
    call_expr => Call,
    member_call => MemberCall,
    construct_expr => Construct,
    functional_cast => FunctionalCast,
    member_expr => MemberExpr,
    decl_ref => DeclRef,
    this_expr => This,
    array_subscript => ArraySubscript,
    integer_literal => IntegerLiteral,
    float_literal => FloatLiteral,
    string_literal => StringLiteral,
    macro_expansion => MacroExpansion,
}

// Symbol predicates

fn callable(pred: impl Fn(&crate::ast::CallableInfo) -> bool + Send + Sync + 'static) -> Matcher {
    symbol_matches(move |_, s| s.callable.as_ref().map(&pred).unwrap_or(false))
}

pub fn is_virtual() -> Matcher {
    callable(|c| c.is_virtual)
}

pub fn is_override() -> Matcher {
    callable(|c| c.is_override || !c.overridden.is_empty())
}

pub fn is_defaulted() -> Matcher {
    callable(|c| c.is_defaulted)
}

pub fn is_user_provided() -> Matcher {
    callable(|c| c.is_user_provided && !c.is_defaulted)
}

pub fn parameter_count_is(count: usize) -> Matcher {
    callable(move |c| c.params.len() == count)
}

pub fn is_public() -> Matcher {
    symbol_matches(|_, s| s.access == Access::Public)
}

/// `operator=`, `operator[]`, ... depending on `op`.
pub fn overloaded_operator(op: &str) -> Matcher {
    let expected = format!("operator{}", op);
    symbol_matches(move |_, s| s.callable.is_some() && s.name == expected)
}

/// A record with at least one direct base.
pub fn is_derived() -> Matcher {
    symbol_matches(|_, s| s.record.as_ref().is_some_and(|r| !r.bases.is_empty()))
}

/// A declaration node that is the defining declaration of its symbol.
pub fn is_definition() -> Matcher {
    node_matches(|unit, node| {
        unit.symbol_of(node)
            .and_then(|s| s.definition)
            .is_some_and(|def| def == node)
    })
}

/// A reference to a field member.
pub fn refers_to_field() -> Matcher {
    symbol_matches(|_, s| s.kind == crate::ast::SymbolKind::Field)
}

/// An expression whose type, through references, is the record (or
/// unresolved type) `name`.
pub fn has_record_type_named(name: &str) -> Matcher {
    let expected = name.to_string();
    has_type(move |unit, ty| type_is_named(unit, ty.non_reference(), &expected))
}

pub(crate) fn type_is_named(unit: &Unit, ty: &QualType, name: &str) -> bool {
    match &ty.ty {
        crate::ast::Type::Named { name: n } => n == name,
        _ => ty
            .as_record()
            .and_then(|r| unit.get_symbol(r))
            .is_some_and(|s| s.name == name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CallableInfo, Node, RecordTag, UnitBuilder};
    use crate::matchers::MatchContext;

    #[test]
    fn test_symbol_predicates() {
        let mut b = UnitBuilder::new("p.cpp");
        let base = b.declare_record("Base", RecordTag::Class);
        let rec = b.declare_record("Derived", RecordTag::Class);
        b.add_base(rec, base);
        let assign = b.declare_method(
            rec,
            "operator=",
            CallableInfo {
                params: vec![QualType::reference_to(QualType::record(rec).constant())],
                ..CallableInfo::default()
            },
        );
        let virt = b.declare_method(
            rec,
            "draw",
            CallableInfo {
                is_virtual: true,
                ..CallableInfo::default()
            },
        );
        let body = b.add(Node::new(NodeKind::CompoundStmt));
        let assign_def = b.add(
            Node::new(NodeKind::MethodDecl)
                .with_symbol(assign)
                .with_children([body]),
        );
        let virt_decl = b.add(Node::new(NodeKind::MethodDecl).with_symbol(virt));
        let record = b.add(
            Node::new(NodeKind::RecordDecl)
                .with_symbol(rec)
                .with_children([virt_decl]),
        );
        let root = b.add(
            Node::new(NodeKind::TranslationUnit).with_children([record, assign_def]),
        );
        let unit = b.build(root).unwrap();
        let cx = MatchContext::new(&unit);

        let assign_m = method_decl()
            .with(overloaded_operator("="))
            .with(parameter_count_is(1))
            .with(is_definition())
            .with(is_user_provided());
        assert!(assign_m.is_match(&cx, assign_def).unwrap());
        assert!(!assign_m.is_match(&cx, virt_decl).unwrap());

        assert!(is_virtual().is_match(&cx, virt_decl).unwrap());
        assert!(!is_override().is_match(&cx, virt_decl).unwrap());
        assert!(has_parent(record_decl().with(is_derived()))
            .is_match(&cx, virt_decl)
            .unwrap());
        assert!(has_any_name(["draw", "paint"]).is_match(&cx, virt_decl).unwrap());
    }

    #[test]
    fn test_ignoring_implicit_and_record_type() {
        let mut b = UnitBuilder::new("t.cpp");
        let rec = b.declare_record("Vector", RecordTag::Struct);
        let inner = b.add(Node::new(NodeKind::DeclRef).named("v").typed(QualType::record(rec)));
        let paren = b.add(Node::new(NodeKind::Paren).with_children([inner]));
        let cast = b.add(Node::new(NodeKind::ImplicitCast).with_children([paren]));
        let root = b.add(Node::new(NodeKind::TranslationUnit).with_children([cast]));
        let unit = b.build(root).unwrap();
        let cx = MatchContext::new(&unit);

        let m = ignoring_implicit(decl_ref().with(has_record_type_named("Vector")).bind("v"));
        let bound = m.matches(&cx, cast).unwrap().unwrap();
        assert_eq!(bound.get("v"), Some(inner));
        assert!(!decl_ref().is_match(&cx, cast).unwrap());
    }
}
