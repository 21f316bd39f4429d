pub mod builtin;
pub mod editor;

use std::fmt;

use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::model::{ElementType, ObjectRef, ReferenceType, Value, ValueTypeTag};

pub use editor::{FieldEditor, PassiveEditor};

pub type DefaultFn = Box<dyn Fn() -> Value + Send + Sync>;
pub type EditFn = Box<dyn Fn(&mut dyn FieldEditor, &str, Value) -> Value + Send + Sync>;

/// Default-construct and edit functions for one registered reference type.
pub struct TypeHandler {
    create_default: DefaultFn,
    edit: EditFn,
}

impl TypeHandler {
    pub fn new(
        create_default: impl Fn() -> Value + Send + Sync + 'static,
        edit: impl Fn(&mut dyn FieldEditor, &str, Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            create_default: Box::new(create_default),
            edit: Box::new(edit),
        }
    }

    /// Null by default, edited through the host's reference picker.
    pub fn object_picker(kind: ReferenceType) -> Self {
        Self::new(
            move || Value::ObjectReference(ObjectRef::null(kind)),
            |editor, label, value| match value {
                Value::ObjectReference(current) => {
                    Value::ObjectReference(editor.object_field(label, current))
                }
                other => other,
            },
        )
    }
}

/// Maps value types to their default and edit behaviour.
///
/// Built-in tags dispatch through a closed match in [`builtin`]; reference types
/// are added at runtime and looked up by name. Handlers are owned here and never
/// copied out.
#[derive(Default)]
pub struct TypeHandlerRegistry {
    references: IndexMap<ReferenceType, TypeHandler>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a reference type. Built-in tags cannot be replaced.
    /// Registering the same reference type twice replaces the earlier handler.
    pub fn register(
        &mut self,
        tag: ValueTypeTag,
        create_default: impl Fn() -> Value + Send + Sync + 'static,
        edit: impl Fn(&mut dyn FieldEditor, &str, Value) -> Value + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let ValueTypeTag::ObjectReference(kind) = tag else {
            return Err(RegistryError::BuiltinHandler {
                type_name: tag.to_string(),
            });
        };
        self.insert(kind, TypeHandler::new(create_default, edit));
        Ok(())
    }

    /// Register a reference type with the default picker handler.
    pub fn register_reference(&mut self, kind: ReferenceType) -> &mut Self {
        self.insert(kind, TypeHandler::object_picker(kind));
        self
    }

    fn insert(&mut self, kind: ReferenceType, handler: TypeHandler) {
        if self.references.insert(kind, handler).is_some() {
            tracing::warn!(reference = %kind, "replacing reference type handler");
        }
    }

    pub fn supports(&self, tag: &ValueTypeTag) -> bool {
        tag.is_builtin()
            || matches!(tag, ValueTypeTag::ObjectReference(kind) if self.references.contains_key(kind))
    }

    /// Like [`supports`](Self::supports), but an enum also needs a non-empty variant set.
    pub fn supports_element(&self, element: &ElementType) -> bool {
        match element.tag() {
            ValueTypeTag::Enum => element.enum_def().is_some_and(|def| !def.is_empty()),
            tag => self.supports(&tag),
        }
    }

    /// Registered reference types, in registration order.
    pub fn reference_types(&self) -> impl Iterator<Item = ReferenceType> + '_ {
        self.references.keys().copied()
    }

    pub fn create_default(&self, element: &ElementType) -> Result<Value, RegistryError> {
        let unsupported = || RegistryError::UnsupportedType {
            type_name: element.to_string(),
        };
        let value = match element.tag() {
            ValueTypeTag::ObjectReference(kind) => {
                let handler = self.references.get(&kind).ok_or_else(unsupported)?;
                (handler.create_default)()
            }
            _ => builtin::default_value(element).ok_or_else(unsupported)?,
        };
        ensure_matches(element, value)
    }

    /// Run one edit pass over `current`. Both the input and the handler's result
    /// must match `element`.
    pub fn edit(
        &self,
        element: &ElementType,
        editor: &mut dyn FieldEditor,
        label: &str,
        current: Value,
    ) -> Result<Value, RegistryError> {
        let current = ensure_matches(element, current)?;
        let edited = match element.tag() {
            ValueTypeTag::ObjectReference(kind) => {
                let handler = self
                    .references
                    .get(&kind)
                    .ok_or_else(|| RegistryError::UnsupportedType {
                        type_name: element.to_string(),
                    })?;
                (handler.edit)(editor, label, current)
            }
            _ => builtin::edit_value(editor, label, current),
        };
        ensure_matches(element, edited)
    }
}

fn ensure_matches(element: &ElementType, value: Value) -> Result<Value, RegistryError> {
    if value.matches(element) {
        Ok(value)
    } else {
        Err(RegistryError::mismatch(element, value.element_type()))
    }
}

impl fmt::Debug for TypeHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandlerRegistry")
            .field("references", &self.references.keys().collect::<Vec<_>>())
            .finish()
    }
}
