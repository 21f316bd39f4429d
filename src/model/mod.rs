pub mod color;
pub mod math;
pub mod params;
pub mod shape;
pub mod value;

// Re-export commonly used types at the model level.
pub use color::Color;
pub use math::{Bounds, BoundsInt, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};
pub use params::{resize_sequence, ParamSlot, ParameterHandle, ParameterModel};
pub use shape::{DeclaredType, ParameterShape, ShapeKind};
pub use value::{ElementType, EnumDef, EnumValue, ObjectRef, ReferenceType, Value, ValueTypeTag};
