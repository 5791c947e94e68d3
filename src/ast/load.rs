//! JSON interchange format produced by the external front end.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::{LangOptions, Literal, Node, NodeId, NodeKind, QualType, Span, Symbol, SymbolId, Unit, UnitBuilder};

#[derive(Debug, Deserialize)]
struct UnitFile {
    name: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    language: LangOptions,
    #[serde(default)]
    symbols: Vec<Symbol>,
    root: NodeFile,
}

#[derive(Debug, Deserialize)]
struct NodeFile {
    kind: NodeKind,
    #[serde(default)]
    span: Span,
    #[serde(default)]
    name_span: Option<Span>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    literal: Option<Literal>,
    #[serde(default)]
    symbol: Option<SymbolId>,
    #[serde(default, rename = "type")]
    ty: Option<QualType>,
    #[serde(default)]
    implicit: bool,
    #[serde(default)]
    children: Vec<NodeFile>,
}

fn add_tree(builder: &mut UnitBuilder, file: NodeFile) -> NodeId {
    let children: Vec<NodeId> = file
        .children
        .into_iter()
        .map(|child| add_tree(builder, child))
        .collect();
    builder.add(Node {
        kind: file.kind,
        span: file.span,
        name_span: file.name_span,
        parent: None,
        children,
        name: file.name,
        operator: file.operator,
        literal: file.literal,
        symbol: file.symbol,
        ty: file.ty,
        implicit: file.implicit,
    })
}

/// Parse a unit from its JSON text.
pub fn parse_unit(json: &str) -> anyhow::Result<Unit> {
    let file: UnitFile = serde_json::from_str(json).context("malformed unit document")?;
    let mut builder = UnitBuilder::new(file.name).with_lang(file.language);
    if let Some(source) = file.source {
        builder = builder.with_source(source);
    }
    for symbol in file.symbols {
        builder.push_symbol_verbatim(symbol);
    }
    let root = add_tree(&mut builder, file.root);
    Ok(builder.build(root)?)
}

/// Read and parse a unit file.
pub fn load_unit<P: AsRef<Path>>(path: P) -> anyhow::Result<Unit> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_unit(&content).with_context(|| format!("invalid unit {}", path.display()))
}
