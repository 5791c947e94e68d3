//! Syntax tree nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{NodeId, QualType, SymbolId};

/// Byte range `[start, end)` into the unit's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset` (an insertion point).
    pub const fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Coarse grouping of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Declaration,
    Statement,
    Expression,
    Literal,
    TypeReference,
    Preprocessor,
}

/// Closed set of node kinds a front end may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Declarations
    TranslationUnit,
    RecordDecl,
    FieldDecl,
    MethodDecl,
    FunctionDecl,
    ParamDecl,
    VarDecl,
    CtorInitializer,
    // Statements
    CompoundStmt,
    DeclStmt,
    ReturnStmt,
    IfStmt,
    ForStmt,
    WhileStmt,
    OtherStmt,
    // Expressions
    BinaryOperator,
    UnaryOperator,
    OperatorCall,
    Call,
    MemberCall,
    Construct,
    FunctionalCast,
    MemberExpr,
    DeclRef,
    This,
    ArraySubscript,
    ImplicitCast,
    Paren,
    // Literals
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    // Everything else
    TypeRef,
    MacroExpansion,
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        use NodeKind::*;
        match self {
            TranslationUnit | RecordDecl | FieldDecl | MethodDecl | FunctionDecl | ParamDecl
            | VarDecl | CtorInitializer => NodeCategory::Declaration,
            CompoundStmt | DeclStmt | ReturnStmt | IfStmt | ForStmt | WhileStmt | OtherStmt => {
                NodeCategory::Statement
            }
            IntegerLiteral | FloatLiteral | StringLiteral | BoolLiteral => NodeCategory::Literal,
            TypeRef => NodeCategory::TypeReference,
            MacroExpansion => NodeCategory::Preprocessor,
            _ => NodeCategory::Expression,
        }
    }

    /// Whether this kind is a call-like node with an argument list.
    pub fn has_arguments(&self) -> bool {
        matches!(
            self,
            NodeKind::Call
                | NodeKind::MemberCall
                | NodeKind::OperatorCall
                | NodeKind::Construct
                | NodeKind::FunctionalCast
                | NodeKind::MacroExpansion
        )
    }

    /// Declarations that may own a body (a trailing `CompoundStmt`).
    pub fn is_callable_decl(&self) -> bool {
        matches!(self, NodeKind::MethodDecl | NodeKind::FunctionDecl)
    }

    /// Wrapper nodes skipped by `ignoring_implicit`.
    pub fn is_transparent(&self) -> bool {
        matches!(self, NodeKind::ImplicitCast | NodeKind::Paren)
    }
}

/// Literal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// A single syntax tree element.
///
/// `parent` is filled in by [`UnitBuilder`](super::UnitBuilder); any value set
/// before a node is added is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Span of the declared name, for declarations that have one.
    pub name_span: Option<Span>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub name: Option<String>,
    pub operator: Option<String>,
    pub literal: Option<Literal>,
    /// Declared symbol for declarations, referenced symbol otherwise.
    pub symbol: Option<SymbolId>,
    /// Type of an expression.
    pub ty: Option<QualType>,
    /// Compiler-synthesized (e.g. implicit `this`).
    pub implicit: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            name_span: None,
            parent: None,
            children: Vec::new(),
            name: None,
            operator: None,
            literal: None,
            symbol: None,
            ty: None,
            implicit: false,
        }
    }

    pub fn spanning(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }

    pub fn with_name_span(mut self, start: u32, end: u32) -> Self {
        self.name_span = Some(Span::new(start, end));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_operator(mut self, op: impl Into<String>) -> Self {
        self.operator = Some(op.into());
        self
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn typed(mut self, ty: QualType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeId>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }
}
