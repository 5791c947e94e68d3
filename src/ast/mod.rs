//! Immutable node model the checks run against.
//!
//! A [`Unit`] is one analyzed translation unit: an arena of [`Node`]s plus the
//! resolved [`Symbol`] table produced by an external front end. Nodes and
//! symbols refer to each other through typed ids, never through ownership:
//!
//! ```text
//! ┌──────────────┐  children (owned)  ┌──────────────┐
//! │ Node (arena) │───────────────────▶│ Node (arena) │
//! │              │◀───────────────────│              │
//! └──────────────┘   parent (NodeId)  └──────────────┘
//!        │ symbol (SymbolId)
//!        ▼
//! ┌──────────────┐  decl / definition (NodeId)
//! │    Symbol    │─────────────────────────────▶ Node
//! └──────────────┘
//! ```
//!
//! Units are assembled with [`UnitBuilder`] or loaded from the JSON
//! interchange format with [`load_unit`]. Once built they are never mutated.

mod builder;
mod load;
mod node;
mod symbol;
mod unit;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::UnitBuilder;
pub use load::{load_unit, parse_unit};
pub use node::{Literal, Node, NodeCategory, NodeKind, Span};
pub use symbol::{
    Access, CallableInfo, QualType, RecordInfo, RecordTag, Symbol, SymbolKind, Type,
};
pub use unit::{Ancestors, Descendants, LangOptions, Location, Unit};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Construct an identifier from a raw value.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Index into the owning arena.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(NodeId);
define_id!(SymbolId);

/// Errors raised while assembling a [`Unit`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("node {0:?} is attached to more than one parent")]
    SharedChild(NodeId),
    #[error("node {0:?} is not reachable from the root")]
    Unreachable(NodeId),
    #[error("root node {0:?} has a parent")]
    RootHasParent(NodeId),
    #[error("unknown node id {0:?}")]
    UnknownNode(NodeId),
    #[error("node {node:?} refers to unknown symbol {symbol:?}")]
    UnknownSymbol { node: NodeId, symbol: SymbolId },
    #[error("symbol {symbol:?} refers to unknown symbol {target:?}")]
    DanglingSymbol { symbol: SymbolId, target: SymbolId },
    #[error("symbol at index {index} declares id {id:?}")]
    SymbolIdMismatch { index: usize, id: SymbolId },
}
