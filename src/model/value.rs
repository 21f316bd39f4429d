use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::RegistryError;

use super::color::Color;
use super::math::{Bounds, BoundsInt, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};

/// Name of a host reference type (for example `"Transform"`). Reference types are
/// not built in; each one is registered with the type-handler registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReferenceType(&'static str);

impl ReferenceType {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The closed set of value shapes the registry can default-construct and edit.
/// All enumerations share the `Enum` tag; reference types are keyed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueTypeTag {
    Int32,
    Bool,
    Float32,
    String,
    Int64,
    Enum,
    Vector2,
    Vector2Int,
    Vector3,
    Vector3Int,
    Vector4,
    Rect,
    RectInt,
    Color,
    Bounds,
    BoundsInt,
    ObjectReference(ReferenceType),
}

impl ValueTypeTag {
    /// Every tag with a built-in handler.
    pub const BUILTIN: [ValueTypeTag; 16] = [
        ValueTypeTag::Int32,
        ValueTypeTag::Bool,
        ValueTypeTag::Float32,
        ValueTypeTag::String,
        ValueTypeTag::Int64,
        ValueTypeTag::Enum,
        ValueTypeTag::Vector2,
        ValueTypeTag::Vector2Int,
        ValueTypeTag::Vector3,
        ValueTypeTag::Vector3Int,
        ValueTypeTag::Vector4,
        ValueTypeTag::Rect,
        ValueTypeTag::RectInt,
        ValueTypeTag::Color,
        ValueTypeTag::Bounds,
        ValueTypeTag::BoundsInt,
    ];

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ValueTypeTag::ObjectReference(_))
    }
}

impl fmt::Display for ValueTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTypeTag::ObjectReference(kind) => write!(f, "ObjectReference({kind})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The value set of one concrete enumeration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumDef {
    type_name: &'static str,
    variants: &'static [&'static str],
}

impl EnumDef {
    pub const fn new(type_name: &'static str, variants: &'static [&'static str]) -> Self {
        Self {
            type_name,
            variants,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn position(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| *v == variant)
    }
}

/// A selected variant of an enumeration. Always in range for its `EnumDef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    def: EnumDef,
    index: usize,
}

impl EnumValue {
    /// Returns None if `index` is not a variant of `def`.
    pub fn new(def: EnumDef, index: usize) -> Option<Self> {
        (index < def.len()).then_some(Self { def, index })
    }

    pub fn def(&self) -> EnumDef {
        self.def
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.def.variants.get(self.index).copied().unwrap_or_default()
    }
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A possibly-null reference to a host object, identified by an opaque id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRef {
    pub kind: ReferenceType,
    pub id: Option<u64>,
}

impl ObjectRef {
    pub const fn null(kind: ReferenceType) -> Self {
        Self { kind, id: None }
    }

    pub const fn to(kind: ReferenceType, id: u64) -> Self {
        Self { kind, id: Some(id) }
    }
}

/// The type of a single value slot: a tag, plus the variant set when the tag is `Enum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementType {
    tag: ValueTypeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    enum_def: Option<EnumDef>,
}

impl ElementType {
    /// A non-enum element. An `Enum` tag built this way has no variant set and
    /// is never supported.
    pub const fn scalar(tag: ValueTypeTag) -> Self {
        Self { tag, enum_def: None }
    }

    pub const fn enumeration(def: EnumDef) -> Self {
        Self {
            tag: ValueTypeTag::Enum,
            enum_def: Some(def),
        }
    }

    pub const fn reference(kind: ReferenceType) -> Self {
        Self::scalar(ValueTypeTag::ObjectReference(kind))
    }

    pub fn tag(&self) -> ValueTypeTag {
        self.tag
    }

    pub fn enum_def(&self) -> Option<EnumDef> {
        self.enum_def
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.enum_def {
            Some(def) => f.write_str(def.type_name),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// A single editable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Int32(i32),
    Bool(bool),
    Float32(f32),
    String(String),
    Int64(i64),
    Enum(EnumValue),
    Vector2(Vector2),
    Vector2Int(Vector2Int),
    Vector3(Vector3),
    Vector3Int(Vector3Int),
    Vector4(Vector4),
    Rect(Rect),
    RectInt(RectInt),
    Color(Color),
    Bounds(Bounds),
    BoundsInt(BoundsInt),
    ObjectReference(ObjectRef),
}

impl Value {
    pub fn tag(&self) -> ValueTypeTag {
        match self {
            Value::Int32(_) => ValueTypeTag::Int32,
            Value::Bool(_) => ValueTypeTag::Bool,
            Value::Float32(_) => ValueTypeTag::Float32,
            Value::String(_) => ValueTypeTag::String,
            Value::Int64(_) => ValueTypeTag::Int64,
            Value::Enum(_) => ValueTypeTag::Enum,
            Value::Vector2(_) => ValueTypeTag::Vector2,
            Value::Vector2Int(_) => ValueTypeTag::Vector2Int,
            Value::Vector3(_) => ValueTypeTag::Vector3,
            Value::Vector3Int(_) => ValueTypeTag::Vector3Int,
            Value::Vector4(_) => ValueTypeTag::Vector4,
            Value::Rect(_) => ValueTypeTag::Rect,
            Value::RectInt(_) => ValueTypeTag::RectInt,
            Value::Color(_) => ValueTypeTag::Color,
            Value::Bounds(_) => ValueTypeTag::Bounds,
            Value::BoundsInt(_) => ValueTypeTag::BoundsInt,
            Value::ObjectReference(r) => ValueTypeTag::ObjectReference(r.kind),
        }
    }

    /// The element type this value belongs to.
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Enum(e) => ElementType::enumeration(e.def()),
            other => ElementType::scalar(other.tag()),
        }
    }

    /// True if this value can occupy a slot of `element`. Enum values must belong
    /// to the same enumeration; references must be of the same reference type.
    pub fn matches(&self, element: &ElementType) -> bool {
        match (self, element.enum_def()) {
            (Value::Enum(e), Some(def)) => e.def() == def,
            (Value::Enum(_), None) => false,
            (other, _) => other.tag() == element.tag(),
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Value::ObjectReference(r) => Some(*r),
            _ => None,
        }
    }

    /// Parse host-supplied text into a value of `element`.
    ///
    /// Vectors, rects and bounds are comma-separated components; colors accept
    /// `#rrggbb[aa]` or `r,g,b[,a]`; enums accept a variant name or index;
    /// references accept an id or `null`.
    pub fn parse(element: &ElementType, raw: &str) -> Result<Value, RegistryError> {
        let invalid = || RegistryError::InvalidValue {
            input: raw.to_string(),
            expected: element.to_string(),
        };
        let text = raw.trim();
        let value = match element.tag() {
            ValueTypeTag::Int32 => Value::Int32(text.parse().map_err(|_| invalid())?),
            ValueTypeTag::Bool => Value::Bool(match text {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid()),
            }),
            ValueTypeTag::Float32 => Value::Float32(text.parse().map_err(|_| invalid())?),
            ValueTypeTag::String => Value::String(raw.to_string()),
            ValueTypeTag::Int64 => Value::Int64(text.parse().map_err(|_| invalid())?),
            ValueTypeTag::Enum => {
                let def = element.enum_def().ok_or_else(invalid)?;
                let index = def
                    .position(text)
                    .or_else(|| text.parse::<usize>().ok())
                    .ok_or_else(invalid)?;
                Value::Enum(EnumValue::new(def, index).ok_or_else(invalid)?)
            }
            ValueTypeTag::Vector2 => {
                let [x, y] = components::<f32, 2>(text).ok_or_else(invalid)?;
                Value::Vector2(Vector2::new(x, y))
            }
            ValueTypeTag::Vector2Int => {
                let [x, y] = components::<i32, 2>(text).ok_or_else(invalid)?;
                Value::Vector2Int(Vector2Int::new(x, y))
            }
            ValueTypeTag::Vector3 => {
                let [x, y, z] = components::<f32, 3>(text).ok_or_else(invalid)?;
                Value::Vector3(Vector3::new(x, y, z))
            }
            ValueTypeTag::Vector3Int => {
                let [x, y, z] = components::<i32, 3>(text).ok_or_else(invalid)?;
                Value::Vector3Int(Vector3Int::new(x, y, z))
            }
            ValueTypeTag::Vector4 => {
                let [x, y, z, w] = components::<f32, 4>(text).ok_or_else(invalid)?;
                Value::Vector4(Vector4::new(x, y, z, w))
            }
            ValueTypeTag::Rect => {
                let [x, y, w, h] = components::<f32, 4>(text).ok_or_else(invalid)?;
                Value::Rect(Rect::new(x, y, w, h))
            }
            ValueTypeTag::RectInt => {
                let [x, y, w, h] = components::<i32, 4>(text).ok_or_else(invalid)?;
                Value::RectInt(RectInt::new(x, y, w, h))
            }
            ValueTypeTag::Color => Value::Color(parse_color(text).ok_or_else(invalid)?),
            ValueTypeTag::Bounds => {
                let [cx, cy, cz, sx, sy, sz] = components::<f32, 6>(text).ok_or_else(invalid)?;
                Value::Bounds(Bounds::new(Vector3::new(cx, cy, cz), Vector3::new(sx, sy, sz)))
            }
            ValueTypeTag::BoundsInt => {
                let [px, py, pz, sx, sy, sz] = components::<i32, 6>(text).ok_or_else(invalid)?;
                Value::BoundsInt(BoundsInt::new(
                    Vector3Int::new(px, py, pz),
                    Vector3Int::new(sx, sy, sz),
                ))
            }
            ValueTypeTag::ObjectReference(kind) => match text {
                "" | "null" | "none" => Value::ObjectReference(ObjectRef::null(kind)),
                id => Value::ObjectReference(ObjectRef::to(kind, id.parse().map_err(|_| invalid())?)),
            },
        };
        Ok(value)
    }
}

/// Split `raw` on commas into exactly `N` parsed components.
fn components<T: FromStr, const N: usize>(raw: &str) -> Option<[T; N]> {
    let parsed: Vec<T> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    parsed.try_into().ok()
}

fn parse_color(raw: &str) -> Option<Color> {
    if raw.starts_with('#') {
        return Color::from_hex(raw);
    }
    if let Some([r, g, b, a]) = components::<f32, 4>(raw) {
        return Some(Color::rgba(r, g, b, a));
    }
    components::<f32, 3>(raw).map(|[r, g, b]| Color::rgb(r, g, b))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Enum(e) => f.write_str(e.name()),
            Value::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vector2Int(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Vector3Int(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Vector4(v) => write!(f, "({}, {}, {}, {})", v.x, v.y, v.z, v.w),
            Value::Rect(r) => write!(f, "(x:{}, y:{}, width:{}, height:{})", r.x, r.y, r.width, r.height),
            Value::RectInt(r) => write!(f, "(x:{}, y:{}, width:{}, height:{})", r.x, r.y, r.width, r.height),
            Value::Color(c) => write!(f, "RGBA({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Value::Bounds(b) => write!(
                f,
                "Center: ({}, {}, {}), Size: ({}, {}, {})",
                b.center.x, b.center.y, b.center.z, b.size.x, b.size.y, b.size.z
            ),
            Value::BoundsInt(b) => write!(
                f,
                "Position: ({}, {}, {}), Size: ({}, {}, {})",
                b.position.x, b.position.y, b.position.z, b.size.x, b.size.y, b.size.z
            ),
            Value::ObjectReference(r) => match r.id {
                Some(id) => write!(f, "{}#{id}", r.kind),
                None => write!(f, "None ({})", r.kind),
            },
        }
    }
}
