use serde::Serialize;

use crate::error::RegistryError;
use crate::types::TypeHandlerRegistry;

use super::value::{ElementType, EnumDef, ReferenceType, ValueTypeTag};

/// A parameter type as declared by a command registration, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Value(ElementType),
    Array(Box<DeclaredType>),
    List(Box<DeclaredType>),
    /// A type with no value representation (maps, tuples, host types without a handler).
    Unsupported(&'static str),
}

impl DeclaredType {
    pub const fn scalar(tag: ValueTypeTag) -> Self {
        DeclaredType::Value(ElementType::scalar(tag))
    }

    pub const fn enumeration(def: EnumDef) -> Self {
        DeclaredType::Value(ElementType::enumeration(def))
    }

    pub const fn reference(kind: ReferenceType) -> Self {
        DeclaredType::Value(ElementType::reference(kind))
    }

    pub fn array(element: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(element))
    }

    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List(Box::new(element))
    }

    /// Display name, e.g. `Int32[]` or `List<String>`.
    pub fn type_name(&self) -> String {
        match self {
            DeclaredType::Value(element) => element.to_string(),
            DeclaredType::Array(inner) => format!("{}[]", inner.type_name()),
            DeclaredType::List(inner) => format!("List<{}>", inner.type_name()),
            DeclaredType::Unsupported(name) => (*name).to_string(),
        }
    }
}

/// Which container, if any, wraps the element values of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeKind {
    Scalar,
    Array,
    List,
}

/// The resolved, supported shape of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterShape {
    name: String,
    kind: ShapeKind,
    element: ElementType,
}

impl ParameterShape {
    /// Resolve a declared type one collection level deep. Fails with
    /// `MalformedCollectionShape` for collections of collections and
    /// `UnsupportedType` when the (element) type has no handler.
    pub fn resolve(
        name: impl Into<String>,
        declared: &DeclaredType,
        types: &TypeHandlerRegistry,
    ) -> Result<Self, RegistryError> {
        let (kind, inner) = match declared {
            DeclaredType::Array(inner) => (ShapeKind::Array, inner.as_ref()),
            DeclaredType::List(inner) => (ShapeKind::List, inner.as_ref()),
            other => (ShapeKind::Scalar, other),
        };
        let element = match inner {
            DeclaredType::Value(element) => *element,
            DeclaredType::Array(_) | DeclaredType::List(_) => {
                return Err(RegistryError::MalformedCollectionShape {
                    type_name: declared.type_name(),
                })
            }
            DeclaredType::Unsupported(type_name) => {
                return Err(RegistryError::UnsupportedType {
                    type_name: (*type_name).to_string(),
                })
            }
        };
        if !types.supports_element(&element) {
            return Err(RegistryError::UnsupportedType {
                type_name: element.to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            kind,
            element,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Type of the scalar value, or of each element for collections.
    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn tag(&self) -> ValueTypeTag {
        self.element.tag()
    }

    /// Element tag for collection shapes; None for scalars.
    pub fn element_tag(&self) -> Option<ValueTypeTag> {
        self.is_collection().then(|| self.element.tag())
    }

    pub fn is_array(&self) -> bool {
        self.kind == ShapeKind::Array
    }

    pub fn is_list(&self) -> bool {
        self.kind == ShapeKind::List
    }

    pub fn is_collection(&self) -> bool {
        self.kind != ShapeKind::Scalar
    }

    pub fn type_name(&self) -> String {
        match self.kind {
            ShapeKind::Scalar => self.element.to_string(),
            ShapeKind::Array => format!("{}[]", self.element),
            ShapeKind::List => format!("List<{}>", self.element),
        }
    }
}
