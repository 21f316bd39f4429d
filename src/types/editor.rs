//! Widget primitives supplied by the host renderer.
//!
//! Every method draws a labelled field for the current value and returns the
//! possibly-updated value. The defaults return the input unchanged, so a host
//! only overrides the widgets it actually draws.

use crate::model::{
    Bounds, BoundsInt, Color, EnumDef, ObjectRef, Rect, RectInt, Vector2, Vector2Int, Vector3,
    Vector3Int, Vector4,
};

pub trait FieldEditor {
    fn int_field(&mut self, _label: &str, value: i32) -> i32 {
        value
    }

    fn long_field(&mut self, _label: &str, value: i64) -> i64 {
        value
    }

    fn float_field(&mut self, _label: &str, value: f32) -> f32 {
        value
    }

    fn toggle(&mut self, _label: &str, value: bool) -> bool {
        value
    }

    fn text_field(&mut self, _label: &str, value: String) -> String {
        value
    }

    /// Pick a variant of `def`. Out-of-range results are ignored by the caller.
    fn enum_popup(&mut self, _label: &str, _def: EnumDef, selected: usize) -> usize {
        selected
    }

    fn vector2_field(&mut self, _label: &str, value: Vector2) -> Vector2 {
        value
    }

    fn vector2_int_field(&mut self, _label: &str, value: Vector2Int) -> Vector2Int {
        value
    }

    fn vector3_field(&mut self, _label: &str, value: Vector3) -> Vector3 {
        value
    }

    fn vector3_int_field(&mut self, _label: &str, value: Vector3Int) -> Vector3Int {
        value
    }

    fn vector4_field(&mut self, _label: &str, value: Vector4) -> Vector4 {
        value
    }

    fn rect_field(&mut self, _label: &str, value: Rect) -> Rect {
        value
    }

    fn rect_int_field(&mut self, _label: &str, value: RectInt) -> RectInt {
        value
    }

    fn color_field(&mut self, _label: &str, value: Color) -> Color {
        value
    }

    fn bounds_field(&mut self, _label: &str, value: Bounds) -> Bounds {
        value
    }

    fn bounds_int_field(&mut self, _label: &str, value: BoundsInt) -> BoundsInt {
        value
    }

    /// Reference picker. The returned reference must keep the same `kind`.
    fn object_field(&mut self, _label: &str, value: ObjectRef) -> ObjectRef {
        value
    }

    /// Size field drawn above a collection parameter; returns the desired length.
    fn collection_length(&mut self, _label: &str, len: usize) -> usize {
        len
    }

    /// Collapsible section header; returns the new expanded state.
    fn foldout(&mut self, _title: &str, expanded: bool) -> bool {
        expanded
    }

    /// A command row: its name and an invoke button. Returns true when pressed.
    fn command_header(&mut self, _name: &str, _invoke_label: &str) -> bool {
        false
    }
}

/// An editor that never changes anything and never presses a button.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveEditor;

impl FieldEditor for PassiveEditor {}
