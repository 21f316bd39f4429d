//! Typed binding between Rust parameter types and the value model.
//!
//! A command's registration names its parameters by Rust type; these traits give
//! each type its declared shape and turn built arguments back into typed values.

use serde::Serialize;

use crate::error::RegistryError;
use crate::model::{
    Bounds, BoundsInt, Color, DeclaredType, ElementType, EnumDef, ObjectRef, Rect, RectInt, Value,
    ValueTypeTag, Vector2, Vector2Int, Vector3, Vector3Int, Vector4,
};

/// A type that occupies a single value slot, and can be a collection element.
pub trait ScalarParam: Sized {
    fn element_type() -> ElementType;
    fn from_value(value: &Value) -> Option<Self>;
}

/// A type that can appear in a command signature.
pub trait CommandParam: Sized {
    fn declared_type() -> DeclaredType;
    fn from_argument(argument: &Argument) -> Option<Self>;
}

/// A fieldless Rust enum bound to an [`EnumDef`]. Implement with [`impl_enum_param!`].
pub trait EnumParam: Copy + 'static {
    const DEF: EnumDef;
    /// Variants in declaration order, matching `DEF.variants()` index for index.
    const VARIANTS: &'static [Self];
}

#[doc(hidden)]
pub fn enum_from_value<E: EnumParam>(value: &Value) -> Option<E> {
    let picked = value.as_enum()?;
    if picked.def() != E::DEF {
        return None;
    }
    E::VARIANTS.get(picked.index()).copied()
}

#[doc(hidden)]
pub fn scalar_from_argument<P: ScalarParam>(argument: &Argument) -> Option<P> {
    match argument {
        Argument::Scalar(value) => P::from_value(value),
        Argument::Array(_) | Argument::List(_) => None,
    }
}

macro_rules! copy_params {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarParam for $ty {
                fn element_type() -> ElementType {
                    ElementType::scalar(ValueTypeTag::$variant)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }

            impl CommandParam for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::Value(<Self as ScalarParam>::element_type())
                }

                fn from_argument(argument: &Argument) -> Option<Self> {
                    scalar_from_argument(argument)
                }
            }
        )*
    };
}

copy_params! {
    i32 => Int32,
    bool => Bool,
    f32 => Float32,
    i64 => Int64,
    Vector2 => Vector2,
    Vector2Int => Vector2Int,
    Vector3 => Vector3,
    Vector3Int => Vector3Int,
    Vector4 => Vector4,
    Rect => Rect,
    RectInt => RectInt,
    Color => Color,
    Bounds => Bounds,
    BoundsInt => BoundsInt,
}

impl ScalarParam for String {
    fn element_type() -> ElementType {
        ElementType::scalar(ValueTypeTag::String)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl CommandParam for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::Value(<Self as ScalarParam>::element_type())
    }

    fn from_argument(argument: &Argument) -> Option<Self> {
        scalar_from_argument(argument)
    }
}

/// Ordered collections map to `List` shapes.
impl<T: ScalarParam> CommandParam for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::list(DeclaredType::Value(T::element_type()))
    }

    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::List(values) => values.iter().map(T::from_value).collect(),
            Argument::Scalar(_) | Argument::Array(_) => None,
        }
    }
}

/// Fixed arrays map to `Array` shapes.
impl<T: ScalarParam> CommandParam for Box<[T]> {
    fn declared_type() -> DeclaredType {
        DeclaredType::array(DeclaredType::Value(T::element_type()))
    }

    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Array(values) => values.iter().map(T::from_value).collect(),
            Argument::Scalar(_) | Argument::List(_) => None,
        }
    }
}

/// Bind a fieldless enum as a command parameter.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Mode { Idle, Run }
/// impl_enum_param!(Mode { Idle = "idle", Run = "run" });
/// ```
///
/// Variant names default to the Rust identifier when no display name is given.
#[macro_export]
macro_rules! impl_enum_param {
    ($ty:ident { $($variant:ident $(= $name:literal)?),+ $(,)? }) => {
        impl $crate::registry::params::EnumParam for $ty {
            const DEF: $crate::model::EnumDef = $crate::model::EnumDef::new(
                stringify!($ty),
                &[$($crate::impl_enum_param!(@name $variant $(, $name)?)),+],
            );
            const VARIANTS: &'static [Self] = &[$($ty::$variant),+];
        }

        impl $crate::registry::params::ScalarParam for $ty {
            fn element_type() -> $crate::model::ElementType {
                $crate::model::ElementType::enumeration(
                    <Self as $crate::registry::params::EnumParam>::DEF,
                )
            }

            fn from_value(value: &$crate::model::Value) -> Option<Self> {
                $crate::registry::params::enum_from_value(value)
            }
        }

        impl $crate::registry::params::CommandParam for $ty {
            fn declared_type() -> $crate::model::DeclaredType {
                $crate::model::DeclaredType::Value(
                    <Self as $crate::registry::params::ScalarParam>::element_type(),
                )
            }

            fn from_argument(argument: &$crate::registry::params::Argument) -> Option<Self> {
                $crate::registry::params::scalar_from_argument(argument)
            }
        }
    };
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (@name $variant:ident, $name:literal) => {
        $name
    };
}

/// One call argument, in the container the signature expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "value")]
pub enum Argument {
    Scalar(Value),
    Array(Box<[Value]>),
    List(Vec<Value>),
}

impl Argument {
    fn describe(&self) -> String {
        match self {
            Argument::Scalar(value) => value.element_type().to_string(),
            Argument::Array(values) => format!("array of {}", values.len()),
            Argument::List(values) => format!("list of {}", values.len()),
        }
    }
}

/// Positional arguments for one invocation, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Arguments {
    args: Vec<Argument>,
}

impl Arguments {
    pub fn new(args: Vec<Argument>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    pub fn argument(&self, index: usize) -> Result<&Argument, RegistryError> {
        self.args
            .get(index)
            .ok_or_else(|| RegistryError::out_of_range("argument", index, self.args.len()))
    }

    /// Extract argument `index` as `P`.
    pub fn get<P: CommandParam>(&self, index: usize) -> Result<P, RegistryError> {
        let argument = self.argument(index)?;
        P::from_argument(argument).ok_or_else(|| {
            RegistryError::mismatch(P::declared_type().type_name(), argument.describe())
        })
    }

    /// Extract a reference argument declared with `DeclaredType::reference`.
    pub fn reference(&self, index: usize) -> Result<ObjectRef, RegistryError> {
        match self.argument(index)? {
            Argument::Scalar(Value::ObjectReference(r)) => Ok(*r),
            other => Err(RegistryError::mismatch("ObjectReference", other.describe())),
        }
    }

    /// Raw element values of a collection argument, whatever its container.
    pub fn elements(&self, index: usize) -> Result<&[Value], RegistryError> {
        match self.argument(index)? {
            Argument::Array(values) => Ok(&**values),
            Argument::List(values) => Ok(values.as_slice()),
            Argument::Scalar(value) => Err(RegistryError::mismatch("collection", value.element_type())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{EnumValue, ReferenceType};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Meal {
        Nothing,
        Pizza,
        Burger,
    }

    crate::impl_enum_param!(Meal {
        Nothing = "none",
        Pizza = "pizza",
        Burger = "burger",
    });

    #[test]
    fn test_declared_types() {
        assert_eq!(f32::declared_type(), DeclaredType::scalar(ValueTypeTag::Float32));
        assert_eq!(
            Vec::<i32>::declared_type(),
            DeclaredType::list(DeclaredType::scalar(ValueTypeTag::Int32))
        );
        assert_eq!(
            <Box<[String]>>::declared_type(),
            DeclaredType::array(DeclaredType::scalar(ValueTypeTag::String))
        );
        assert_eq!(Meal::declared_type(), DeclaredType::enumeration(Meal::DEF));
        assert_eq!(Meal::DEF.variants(), &["none", "pizza", "burger"]);
    }

    #[test]
    fn test_typed_extraction() {
        let args = Arguments::new(vec![
            Argument::Scalar(Value::Float32(5.5)),
            Argument::Array(vec![Value::Int32(1), Value::Int32(2)].into_boxed_slice()),
            Argument::List(vec![Value::String("a".into())]),
            Argument::Scalar(Value::Enum(EnumValue::new(Meal::DEF, 2).unwrap())),
        ]);
        assert_eq!(args.get::<f32>(0).unwrap(), 5.5);
        assert_eq!(&*args.get::<Box<[i32]>>(1).unwrap(), &[1, 2]);
        assert_eq!(args.get::<Vec<String>>(2).unwrap(), vec!["a".to_string()]);
        assert_eq!(args.get::<Meal>(3).unwrap(), Meal::Burger);
        assert_eq!(args.elements(1).unwrap().len(), 2);
    }

    #[test]
    fn test_extraction_refuses_wrong_container() {
        let args = Arguments::new(vec![Argument::List(vec![Value::Int32(1)])]);
        assert!(matches!(
            args.get::<Box<[i32]>>(0),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(args.get::<i32>(0).is_err());
        assert!(matches!(
            args.get::<i32>(4),
            Err(RegistryError::IndexOutOfRange { index: 4, len: 1, .. })
        ));
    }

    #[test]
    fn test_enum_from_other_definition_is_rejected() {
        const OTHER: EnumDef = EnumDef::new("Other", &["none", "pizza", "burger"]);
        let value = Value::Enum(EnumValue::new(OTHER, 1).unwrap());
        assert_eq!(enum_from_value::<Meal>(&value), None);
    }

    #[test]
    fn test_reference_argument() {
        let kind = ReferenceType::new("Transform");
        let args = Arguments::new(vec![Argument::Scalar(Value::ObjectReference(
            ObjectRef::to(kind, 3),
        ))]);
        assert_eq!(args.reference(0).unwrap().id, Some(3));
    }
}
