//! Closed dispatch for the built-in value types.

use crate::model::{
    Bounds, BoundsInt, Color, ElementType, EnumValue, Rect, RectInt, Value, ValueTypeTag, Vector2,
    Vector2Int, Vector3, Vector3Int, Vector4,
};

use super::FieldEditor;

/// Zero value for a built-in element type. None for references and for enums
/// without variants.
pub(super) fn default_value(element: &ElementType) -> Option<Value> {
    let value = match element.tag() {
        ValueTypeTag::Int32 => Value::Int32(0),
        ValueTypeTag::Bool => Value::Bool(false),
        ValueTypeTag::Float32 => Value::Float32(0.0),
        ValueTypeTag::String => Value::String(String::new()),
        ValueTypeTag::Int64 => Value::Int64(0),
        ValueTypeTag::Enum => Value::Enum(EnumValue::new(element.enum_def()?, 0)?),
        ValueTypeTag::Vector2 => Value::Vector2(Vector2::ZERO),
        ValueTypeTag::Vector2Int => Value::Vector2Int(Vector2Int::ZERO),
        ValueTypeTag::Vector3 => Value::Vector3(Vector3::ZERO),
        ValueTypeTag::Vector3Int => Value::Vector3Int(Vector3Int::ZERO),
        ValueTypeTag::Vector4 => Value::Vector4(Vector4::ZERO),
        ValueTypeTag::Rect => Value::Rect(Rect::default()),
        ValueTypeTag::RectInt => Value::RectInt(RectInt::default()),
        ValueTypeTag::Color => Value::Color(Color::default()),
        ValueTypeTag::Bounds => Value::Bounds(Bounds::default()),
        ValueTypeTag::BoundsInt => Value::BoundsInt(BoundsInt::default()),
        ValueTypeTag::ObjectReference(_) => return None,
    };
    Some(value)
}

/// Draw the matching widget for a built-in value and return the edited value.
pub(super) fn edit_value(editor: &mut dyn FieldEditor, label: &str, value: Value) -> Value {
    match value {
        Value::Int32(v) => Value::Int32(editor.int_field(label, v)),
        Value::Bool(v) => Value::Bool(editor.toggle(label, v)),
        Value::Float32(v) => Value::Float32(editor.float_field(label, v)),
        Value::String(v) => Value::String(editor.text_field(label, v)),
        Value::Int64(v) => Value::Int64(editor.long_field(label, v)),
        Value::Enum(current) => {
            let picked = editor.enum_popup(label, current.def(), current.index());
            Value::Enum(EnumValue::new(current.def(), picked).unwrap_or(current))
        }
        Value::Vector2(v) => Value::Vector2(editor.vector2_field(label, v)),
        Value::Vector2Int(v) => Value::Vector2Int(editor.vector2_int_field(label, v)),
        Value::Vector3(v) => Value::Vector3(editor.vector3_field(label, v)),
        Value::Vector3Int(v) => Value::Vector3Int(editor.vector3_int_field(label, v)),
        Value::Vector4(v) => Value::Vector4(editor.vector4_field(label, v)),
        Value::Rect(v) => Value::Rect(editor.rect_field(label, v)),
        Value::RectInt(v) => Value::RectInt(editor.rect_int_field(label, v)),
        Value::Color(v) => Value::Color(editor.color_field(label, v)),
        Value::Bounds(v) => Value::Bounds(editor.bounds_field(label, v)),
        Value::BoundsInt(v) => Value::BoundsInt(editor.bounds_int_field(label, v)),
        Value::ObjectReference(r) => Value::ObjectReference(editor.object_field(label, r)),
    }
}
