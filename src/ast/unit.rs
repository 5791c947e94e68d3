//! A built translation unit and its navigation queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Node, NodeId, NodeKind, Span, Symbol, SymbolId, SymbolKind};

/// Language-mode flags, read by checks when registering matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangOptions {
    #[serde(default = "default_true")]
    pub cplusplus: bool,
    #[serde(default = "default_true")]
    pub cplusplus11: bool,
    #[serde(default)]
    pub c99: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LangOptions {
    fn default() -> Self {
        Self {
            cplusplus: true,
            cplusplus11: true,
            c99: false,
        }
    }
}

/// 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// One analyzed unit: the node arena, the symbol table, and the source text.
#[derive(Debug, Clone)]
pub struct Unit {
    pub(super) name: String,
    pub(super) source: Option<String>,
    pub(super) lang: LangOptions,
    pub(super) nodes: Vec<Node>,
    pub(super) symbols: Vec<Symbol>,
    pub(super) root: NodeId,
    /// Byte offsets at which each line starts.
    pub(super) line_starts: Vec<u32>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn lang(&self) -> &LangOptions {
        &self.lang
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Panics on an id from another unit; ids handed out by this unit are always valid.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Symbol attached to a node, if it resolves.
    pub fn symbol_of(&self, id: NodeId) -> Option<&Symbol> {
        self.node(id).symbol.and_then(|s| self.get_symbol(s))
    }

    /// Operands of a call-like node; empty for every other kind.
    pub fn arguments(&self, id: NodeId) -> &[NodeId] {
        let node = self.node(id);
        match node.kind {
            NodeKind::Call | NodeKind::MemberCall => {
                node.children.get(1..).unwrap_or(&[])
            }
            kind if kind.has_arguments() => &node.children,
            _ => &[],
        }
    }

    /// Object expression of a member call (`obj` in `obj.f()`).
    pub fn member_call_object(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if node.kind != NodeKind::MemberCall {
            return None;
        }
        let callee = *node.children.first()?;
        if self.kind(callee) != NodeKind::MemberExpr {
            return None;
        }
        self.children(callee).first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            unit: self,
            next: self.parent(id),
        }
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            unit: self,
            stack: vec![id],
        }
    }

    /// Skip `ImplicitCast` and `Paren` wrappers.
    pub fn ignore_implicit(&self, mut id: NodeId) -> NodeId {
        while self.kind(id).is_transparent() {
            match self.children(id).first() {
                Some(&inner) => id = inner,
                None => break,
            }
        }
        id
    }

    /// Body of a function or method definition.
    pub fn body_of(&self, symbol: SymbolId) -> Option<NodeId> {
        let def = self.get_symbol(symbol)?.definition?;
        self.children(def)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::CompoundStmt)
    }

    /// Fields of a record, in declaration order.
    pub fn fields_of(&self, record: SymbolId) -> impl Iterator<Item = &Symbol> + '_ {
        self.get_symbol(record)
            .and_then(|s| s.record.as_ref())
            .into_iter()
            .flat_map(|r| r.fields.iter())
            .filter_map(move |&f| self.get_symbol(f))
    }

    /// Members of `record` (fields and methods) named `name`.
    pub fn lookup<'a>(&'a self, record: SymbolId, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.get_symbol(record)
            .and_then(|s| s.record.as_ref())
            .into_iter()
            .flat_map(|r| r.fields.iter().chain(r.methods.iter()))
            .filter_map(move |&m| self.get_symbol(m))
            .filter(move |m| m.name == name)
    }

    /// Every transitive base of `record`, each reported once, in depth-first
    /// declaration order.
    pub fn transitive_bases(&self, record: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<SymbolId> = self.direct_bases(record).iter().rev().copied().collect();
        while let Some(base) = stack.pop() {
            if base == record || !seen.insert(base) {
                continue;
            }
            order.push(base);
            stack.extend(self.direct_bases(base).iter().rev().copied());
        }
        order
    }

    fn direct_bases(&self, record: SymbolId) -> &[SymbolId] {
        self.get_symbol(record)
            .and_then(|s| s.record.as_ref())
            .map(|r| r.bases.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `record` is `base` or transitively derives from it.
    pub fn is_same_or_derived_from(&self, record: SymbolId, base: SymbolId) -> bool {
        record == base || self.transitive_bases(record).contains(&base)
    }

    /// Enclosing record of a member symbol.
    pub fn parent_record(&self, member: SymbolId) -> Option<&Symbol> {
        let parent = self.get_symbol(member)?.parent?;
        self.get_symbol(parent).filter(|s| s.kind == SymbolKind::Record)
    }

    /// Source text covered by `span`, if the unit carries its source.
    pub fn text(&self, span: Span) -> Option<&str> {
        self.source
            .as_deref()?
            .get(span.start as usize..span.end as usize)
    }

    /// Line/column of a byte offset, if the unit carries its source.
    pub fn location(&self, offset: u32) -> Option<Location> {
        self.source.as_ref()?;
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let column = offset - self.line_starts[line];
        Some(Location {
            line: line + 1,
            column: column as usize + 1,
        })
    }
}

pub(super) fn line_starts(source: &str) -> Vec<u32> {
    std::iter::once(0)
        .chain(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        )
        .collect()
}

/// Iterator over strict ancestors, nearest first.
pub struct Ancestors<'a> {
    unit: &'a Unit,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.unit.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
#[derive(Clone)]
pub struct Descendants<'a> {
    unit: &'a Unit,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.unit.children(current).iter().rev().copied());
        Some(current)
    }
}
