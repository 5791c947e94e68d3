//! Resolved symbols and types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{NodeId, SymbolId};

/// Shape of a type, without qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    /// `int`, `float`, `void`, ...
    Builtin { name: String },
    /// A class, struct or union declared in the unit.
    Record { symbol: SymbolId },
    Pointer { pointee: Box<QualType> },
    Reference { referent: Box<QualType> },
    /// `size: None` is an incomplete array (`T[]`).
    Array {
        element: Box<QualType>,
        #[serde(default)]
        size: Option<u64>,
    },
    /// A type the front end could not resolve further.
    Named { name: String },
}

/// A type plus its top-level `const` qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualType {
    #[serde(flatten)]
    pub ty: Type,
    #[serde(default, rename = "const")]
    pub is_const: bool,
}

impl QualType {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            is_const: false,
        }
    }

    pub fn builtin(name: &str) -> Self {
        Self::new(Type::Builtin {
            name: name.to_string(),
        })
    }

    pub fn void() -> Self {
        Self::builtin("void")
    }

    pub fn record(symbol: SymbolId) -> Self {
        Self::new(Type::Record { symbol })
    }

    pub fn named(name: &str) -> Self {
        Self::new(Type::Named {
            name: name.to_string(),
        })
    }

    pub fn pointer_to(pointee: QualType) -> Self {
        Self::new(Type::Pointer {
            pointee: Box::new(pointee),
        })
    }

    pub fn reference_to(referent: QualType) -> Self {
        Self::new(Type::Reference {
            referent: Box::new(referent),
        })
    }

    pub fn array_of(element: QualType, size: Option<u64>) -> Self {
        Self::new(Type::Array {
            element: Box::new(element),
            size,
        })
    }

    /// The same type with the `const` qualifier added.
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn is_array(&self) -> bool {
        matches!(self.ty, Type::Array { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.ty, Type::Pointer { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.ty, Type::Reference { .. })
    }

    /// Const-qualified, either directly or through the element type of an array.
    pub fn is_constant(&self) -> bool {
        if self.is_const {
            return true;
        }
        match &self.ty {
            Type::Array { element, .. } => element.is_constant(),
            _ => false,
        }
    }

    /// `T[]`, `T[0]`, or any array nesting one of those.
    pub fn is_incomplete_or_zero_length_array(&self) -> bool {
        let mut current = self;
        while let Type::Array { element, size } = &current.ty {
            match size {
                None | Some(0) => return true,
                Some(_) => current = element,
            }
        }
        false
    }

    /// Strip any number of reference layers.
    pub fn non_reference(&self) -> &QualType {
        let mut current = self;
        while let Type::Reference { referent } = &current.ty {
            current = referent;
        }
        current
    }

    pub fn pointee(&self) -> Option<&QualType> {
        match &self.ty {
            Type::Pointer { pointee } => Some(pointee),
            _ => None,
        }
    }

    /// Record symbol named directly by this type.
    pub fn as_record(&self) -> Option<SymbolId> {
        match self.ty {
            Type::Record { symbol } => Some(symbol),
            _ => None,
        }
    }
}

impl fmt::Display for QualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        match &self.ty {
            Type::Builtin { name } | Type::Named { name } => write!(f, "{}", name),
            Type::Record { symbol } => write!(f, "record#{}", symbol.0),
            Type::Pointer { pointee } => write!(f, "{}*", pointee),
            Type::Reference { referent } => write!(f, "{}&", referent),
            Type::Array { element, size } => match size {
                Some(n) => write!(f, "{}[{}]", element, n),
                None => write!(f, "{}[]", element),
            },
        }
    }
}

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Record,
    Field,
    Method,
    Function,
    Variable,
    Parameter,
    Macro,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTag {
    #[default]
    Struct,
    Class,
    Union,
}

/// Record-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInfo {
    #[serde(default)]
    pub tag: RecordTag,
    /// Unnamed struct/union whose members belong to the enclosing record.
    #[serde(default)]
    pub anonymous: bool,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<SymbolId>,
    #[serde(default)]
    pub methods: Vec<SymbolId>,
    /// Direct bases in declaration order.
    #[serde(default)]
    pub bases: Vec<SymbolId>,
}

fn default_true() -> bool {
    true
}

/// Method and function attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableInfo {
    #[serde(default)]
    pub params: Vec<QualType>,
    #[serde(default = "QualType::void")]
    pub return_type: QualType,
    #[serde(default)]
    pub is_virtual: bool,
    /// Marked `override` (or `final`) in the source.
    #[serde(default)]
    pub is_override: bool,
    /// `= default`.
    #[serde(default)]
    pub is_defaulted: bool,
    /// Written by the user rather than implicitly declared.
    #[serde(default = "default_true")]
    pub is_user_provided: bool,
    /// Base methods this one overrides.
    #[serde(default)]
    pub overridden: Vec<SymbolId>,
}

impl Default for CallableInfo {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            return_type: QualType::void(),
            is_virtual: false,
            is_override: false,
            is_defaulted: false,
            is_user_provided: true,
            overridden: Vec::new(),
        }
    }
}

/// A named, declared entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    #[serde(default)]
    pub qualified_name: Option<String>,
    pub kind: SymbolKind,
    /// Declared type of fields, variables and parameters.
    #[serde(default, rename = "type")]
    pub ty: Option<QualType>,
    #[serde(default)]
    pub access: Access,
    /// Enclosing record for members.
    #[serde(default)]
    pub parent: Option<SymbolId>,
    #[serde(default)]
    pub record: Option<RecordInfo>,
    #[serde(default)]
    pub callable: Option<CallableInfo>,
    /// First declaring node, derived when the unit is built.
    #[serde(skip)]
    pub decl: Option<NodeId>,
    /// Declaring node that carries a body, derived when the unit is built.
    #[serde(skip)]
    pub definition: Option<NodeId>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            id: SymbolId(0),
            name: name.into(),
            qualified_name: None,
            kind,
            ty: None,
            access: Access::Public,
            parent: None,
            record: None,
            callable: None,
            decl: None,
            definition: None,
        }
    }

    pub fn is_record(&self) -> bool {
        self.kind == SymbolKind::Record
    }

    pub fn is_union(&self) -> bool {
        self.record
            .as_ref()
            .map(|r| r.tag == RecordTag::Union)
            .unwrap_or(false)
    }

    pub fn is_anonymous_record(&self) -> bool {
        self.record.as_ref().map(|r| r.anonymous).unwrap_or(false)
    }

    /// Qualified name when known, plain name otherwise.
    pub fn display_name(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }
}
