//! Incremental construction of a [`Unit`].

use super::unit::line_starts;
use super::{
    CallableInfo, LangOptions, ModelError, Node, NodeCategory, NodeId, NodeKind, QualType,
    RecordInfo, RecordTag, Symbol, SymbolId, SymbolKind, Type, Unit,
};

/// Builds a unit bottom-up: children are added before the node that owns them.
///
/// ```
/// use evolint::ast::{Node, NodeKind, UnitBuilder};
///
/// let mut b = UnitBuilder::new("demo.cpp");
/// let lit = b.add(Node::new(NodeKind::IntegerLiteral));
/// let root = b.add(Node::new(NodeKind::TranslationUnit).with_children([lit]));
/// let unit = b.build(root).unwrap();
/// assert_eq!(unit.parent(lit), Some(root));
/// ```
pub struct UnitBuilder {
    name: String,
    source: Option<String>,
    lang: LangOptions,
    nodes: Vec<Node>,
    symbols: Vec<Symbol>,
    errors: Vec<ModelError>,
}

impl UnitBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            lang: LangOptions::default(),
            nodes: Vec::new(),
            symbols: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_lang(mut self, lang: LangOptions) -> Self {
        self.lang = lang;
        self
    }

    /// Add a node whose children have already been added.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = None;
        for &child in &node.children {
            match self.nodes.get_mut(child.index()) {
                Some(c) if c.parent.is_some() => self.errors.push(ModelError::SharedChild(child)),
                Some(c) => c.parent = Some(id),
                None => self.errors.push(ModelError::UnknownNode(child)),
            }
        }
        self.nodes.push(node);
        id
    }

    /// Add a symbol; its id is assigned here.
    pub fn add_symbol(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        symbol.id = id;
        self.symbols.push(symbol);
        id
    }

    /// Add a symbol whose id was assigned by an external table.
    pub(super) fn push_symbol_verbatim(&mut self, symbol: Symbol) {
        let index = self.symbols.len();
        if symbol.id.index() != index {
            self.errors.push(ModelError::SymbolIdMismatch {
                index,
                id: symbol.id,
            });
        }
        self.symbols.push(symbol);
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn declare_record(&mut self, name: &str, tag: RecordTag) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Record, name);
        symbol.record = Some(RecordInfo {
            tag,
            ..RecordInfo::default()
        });
        self.add_symbol(symbol)
    }

    /// Declare an unnamed struct/union nested inside `parent`, plus the
    /// implicit field that holds it.
    pub fn declare_anonymous_record(&mut self, parent: SymbolId, tag: RecordTag) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Record, "");
        symbol.parent = Some(parent);
        symbol.record = Some(RecordInfo {
            tag,
            anonymous: true,
            ..RecordInfo::default()
        });
        let record = self.add_symbol(symbol);
        self.declare_field(parent, "", QualType::record(record));
        record
    }

    pub fn declare_field(&mut self, record: SymbolId, name: &str, ty: QualType) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Field, name);
        symbol.ty = Some(ty);
        symbol.parent = Some(record);
        symbol.qualified_name = self.qualify(record, name);
        let id = self.add_symbol(symbol);
        if let Some(info) = self.symbols[record.index()].record.as_mut() {
            info.fields.push(id);
        }
        id
    }

    pub fn declare_method(
        &mut self,
        record: SymbolId,
        name: &str,
        callable: CallableInfo,
    ) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Method, name);
        symbol.parent = Some(record);
        symbol.qualified_name = self.qualify(record, name);
        symbol.callable = Some(callable);
        let id = self.add_symbol(symbol);
        if let Some(info) = self.symbols[record.index()].record.as_mut() {
            info.methods.push(id);
        }
        id
    }

    pub fn declare_function(&mut self, name: &str, callable: CallableInfo) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Function, name);
        symbol.callable = Some(callable);
        self.add_symbol(symbol)
    }

    pub fn declare_variable(&mut self, name: &str, ty: QualType) -> SymbolId {
        let mut symbol = Symbol::new(SymbolKind::Variable, name);
        symbol.ty = Some(ty);
        self.add_symbol(symbol)
    }

    pub fn add_base(&mut self, derived: SymbolId, base: SymbolId) {
        if let Some(info) = self.symbols[derived.index()].record.as_mut() {
            info.bases.push(base);
        }
    }

    fn qualify(&self, record: SymbolId, name: &str) -> Option<String> {
        let parent = self.symbols.get(record.index())?;
        if parent.name.is_empty() {
            return None;
        }
        Some(format!("{}::{}", parent.display_name(), name))
    }

    /// Validate the arena and derive symbol declaration/definition links.
    pub fn build(mut self, root: NodeId) -> Result<Unit, ModelError> {
        if let Some(err) = std::mem::take(&mut self.errors).into_iter().next() {
            return Err(err);
        }
        let root_node = self
            .nodes
            .get(root.index())
            .ok_or(ModelError::UnknownNode(root))?;
        if root_node.parent.is_some() {
            return Err(ModelError::RootHasParent(root));
        }
        if let Some(orphan) = self
            .nodes
            .iter()
            .enumerate()
            .find(|(i, n)| *i != root.index() && n.parent.is_none())
        {
            return Err(ModelError::Unreachable(NodeId(orphan.0 as u32)));
        }

        let symbol_count = self.symbols.len();
        for symbol in &self.symbols {
            let mut refs: Vec<SymbolId> = symbol.parent.into_iter().collect();
            if let Some(r) = &symbol.record {
                refs.extend(r.fields.iter().chain(&r.methods).chain(&r.bases));
            }
            if let Some(c) = &symbol.callable {
                refs.extend(&c.overridden);
                c.params
                    .iter()
                    .chain(std::iter::once(&c.return_type))
                    .for_each(|t| record_refs(t, &mut refs));
            }
            if let Some(ty) = &symbol.ty {
                record_refs(ty, &mut refs);
            }
            if let Some(&target) = refs.iter().find(|t| t.index() >= symbol_count) {
                return Err(ModelError::DanglingSymbol {
                    symbol: symbol.id,
                    target,
                });
            }
        }

        let nodes = &self.nodes;
        let symbols = &mut self.symbols;
        for (index, node) in nodes.iter().enumerate() {
            let Some(symbol) = node.symbol else { continue };
            let id = NodeId(index as u32);
            let Some(entry) = symbols.get_mut(symbol.index()) else {
                return Err(ModelError::UnknownSymbol { node: id, symbol });
            };
            if node.kind.category() != NodeCategory::Declaration {
                continue;
            }
            if entry.decl.is_none() {
                entry.decl = Some(id);
            }
            let has_body = node.kind.is_callable_decl()
                && node
                    .children
                    .iter()
                    .any(|c| nodes[c.index()].kind == NodeKind::CompoundStmt);
            if has_body && entry.definition.is_none() {
                entry.definition = Some(id);
            }
        }

        let line_starts = self.source.as_deref().map(line_starts).unwrap_or_default();
        Ok(Unit {
            name: self.name,
            source: self.source,
            lang: self.lang,
            nodes: self.nodes,
            symbols: self.symbols,
            root,
            line_starts,
        })
    }

}

fn record_refs(ty: &QualType, out: &mut Vec<SymbolId>) {
    match &ty.ty {
        Type::Record { symbol } => out.push(*symbol),
        Type::Pointer { pointee: inner }
        | Type::Reference { referent: inner }
        | Type::Array { element: inner, .. } => record_refs(inner, out),
        Type::Builtin { .. } | Type::Named { .. } => {}
    }
}
