use serde::Serialize;

use crate::error::RegistryError;
use crate::types::{FieldEditor, TypeHandlerRegistry};

use super::shape::{ParameterShape, ShapeKind};
use super::value::Value;

/// Editing state for one parameter. Collections are always edited as an ordered
/// sequence, whatever container the command receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamSlot {
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl ParamSlot {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ParamSlot::Scalar(v) => Some(v),
            ParamSlot::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            ParamSlot::Sequence(values) => Some(values),
            ParamSlot::Scalar(_) => None,
        }
    }
}

/// Live per-parameter values for one discovered command. One slot per parameter
/// shape, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterModel {
    slots: Vec<ParamSlot>,
}

impl ParameterModel {
    /// Scalars start at their handler's default, collections start empty.
    pub fn with_defaults(
        shapes: &[ParameterShape],
        types: &TypeHandlerRegistry,
    ) -> Result<Self, RegistryError> {
        let slots = shapes
            .iter()
            .map(|shape| match shape.kind() {
                ShapeKind::Scalar => types.create_default(shape.element()).map(ParamSlot::Scalar),
                ShapeKind::Array | ShapeKind::List => Ok(ParamSlot::Sequence(Vec::new())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ParamSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&ParamSlot> {
        self.slots.get(index)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut ParamSlot, RegistryError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or_else(|| RegistryError::out_of_range("parameter", index, len))
    }
}

/// Converge `seq` to exactly `len` elements: append defaults at the tail, or drop
/// from the tail. The first `min(old_len, len)` elements are untouched. When a
/// default fails or the length cannot be allocated, `seq` is left as it was.
pub fn resize_sequence<E: From<RegistryError>>(
    seq: &mut Vec<Value>,
    len: usize,
    mut make_default: impl FnMut() -> Result<Value, E>,
) -> Result<(), E> {
    if len <= seq.len() {
        seq.truncate(len);
        return Ok(());
    }
    let missing = len - seq.len();
    let capacity_exceeded = || RegistryError::CapacityExceeded { requested: len };
    let mut tail = Vec::new();
    tail.try_reserve_exact(missing).map_err(|_| capacity_exceeded())?;
    for _ in 0..missing {
        tail.push(make_default()?);
    }
    seq.try_reserve_exact(missing).map_err(|_| capacity_exceeded())?;
    seq.append(&mut tail);
    Ok(())
}

/// Read/write handle on a command's parameter model. Every mutation is checked
/// against the command's parameter shapes, so the model always matches them.
pub struct ParameterHandle<'a> {
    shapes: &'a [ParameterShape],
    model: &'a mut ParameterModel,
    types: &'a TypeHandlerRegistry,
}

impl<'a> ParameterHandle<'a> {
    pub(crate) fn new(
        shapes: &'a [ParameterShape],
        model: &'a mut ParameterModel,
        types: &'a TypeHandlerRegistry,
    ) -> Self {
        Self {
            shapes,
            model,
            types,
        }
    }

    pub fn model(&self) -> &ParameterModel {
        self.model
    }

    pub fn shapes(&self) -> &'a [ParameterShape] {
        self.shapes
    }

    fn shape(&self, index: usize) -> Result<&'a ParameterShape, RegistryError> {
        let shapes = self.shapes;
        shapes
            .get(index)
            .ok_or_else(|| RegistryError::out_of_range("parameter", index, shapes.len()))
    }

    fn sequence_mut(&mut self, index: usize) -> Result<&mut Vec<Value>, RegistryError> {
        match self.model.slot_mut(index)? {
            ParamSlot::Sequence(values) => Ok(values),
            ParamSlot::Scalar(value) => Err(RegistryError::mismatch("sequence", value.tag())),
        }
    }

    /// Replace a scalar parameter's value.
    pub fn set_value(&mut self, index: usize, value: Value) -> Result<(), RegistryError> {
        let shape = self.shape(index)?;
        if shape.is_collection() || !value.matches(shape.element()) {
            return Err(RegistryError::mismatch(shape.type_name(), value.element_type()));
        }
        *self.model.slot_mut(index)? = ParamSlot::Scalar(value);
        Ok(())
    }

    /// Replace one element of a collection parameter.
    pub fn set_element(
        &mut self,
        index: usize,
        element: usize,
        value: Value,
    ) -> Result<(), RegistryError> {
        let shape = self.shape(index)?;
        if !shape.is_collection() || !value.matches(shape.element()) {
            return Err(RegistryError::mismatch(shape.type_name(), value.element_type()));
        }
        let seq = self.sequence_mut(index)?;
        let len = seq.len();
        let slot = seq
            .get_mut(element)
            .ok_or_else(|| RegistryError::out_of_range("element", element, len))?;
        *slot = value;
        Ok(())
    }

    /// Replace the whole contents of a collection parameter.
    pub fn set_sequence(&mut self, index: usize, values: Vec<Value>) -> Result<(), RegistryError> {
        let shape = self.shape(index)?;
        if !shape.is_collection() {
            return Err(RegistryError::mismatch(shape.type_name(), "sequence"));
        }
        if let Some(bad) = values.iter().find(|v| !v.matches(shape.element())) {
            return Err(RegistryError::mismatch(shape.element(), bad.element_type()));
        }
        *self.sequence_mut(index)? = values;
        Ok(())
    }

    /// Resize a collection parameter to exactly `len` elements.
    pub fn resize(&mut self, index: usize, len: usize) -> Result<(), RegistryError> {
        let shape = self.shape(index)?;
        if !shape.is_collection() {
            return Err(RegistryError::mismatch("collection parameter", shape.type_name()));
        }
        let types = self.types;
        let element = *shape.element();
        let seq = self.sequence_mut(index)?;
        let old_len = seq.len();
        resize_sequence(seq, len, || types.create_default(&element))?;
        tracing::trace!(parameter = shape.name(), from = old_len, to = len, "resized collection");
        Ok(())
    }

    /// One redraw cycle for a parameter. Scalars go through their handler;
    /// collections take a length from the editor, resize, then re-edit each
    /// element in index order.
    pub fn edit(&mut self, index: usize, editor: &mut dyn FieldEditor) -> Result<(), RegistryError> {
        let shape = self.shape(index)?;
        let types = self.types;
        let element = *shape.element();
        match self.model.slot_mut(index)? {
            ParamSlot::Scalar(current) => {
                *current = types.edit(&element, editor, shape.name(), current.clone())?;
            }
            ParamSlot::Sequence(seq) => {
                let len = editor.collection_length(shape.name(), seq.len());
                if len != seq.len() {
                    tracing::trace!(parameter = shape.name(), from = seq.len(), to = len, "resized collection");
                }
                let mut edited = seq.clone();
                resize_sequence(&mut edited, len, || types.create_default(&element))?;
                for (i, value) in edited.iter_mut().enumerate() {
                    let label = format!("Element {i}");
                    *value = types.edit(&element, editor, &label, value.clone())?;
                }
                *seq = edited;
            }
        }
        Ok(())
    }

    /// Edit every parameter in declaration order.
    pub fn edit_all(&mut self, editor: &mut dyn FieldEditor) -> Result<(), RegistryError> {
        for index in 0..self.shapes.len() {
            self.edit(index, editor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeclaredType, ReferenceType, ValueTypeTag};
    use crate::types::PassiveEditor;

    fn shapes(types: &TypeHandlerRegistry) -> Vec<ParameterShape> {
        vec![
            ParameterShape::resolve("speed", &DeclaredType::scalar(ValueTypeTag::Float32), types)
                .unwrap(),
            ParameterShape::resolve(
                "xs",
                &DeclaredType::list(DeclaredType::scalar(ValueTypeTag::Int32)),
                types,
            )
            .unwrap(),
        ]
    }

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().copied().map(Value::Int32).collect()
    }

    struct Growing {
        len: usize,
        next: i32,
        seen: Vec<String>,
    }

    impl FieldEditor for Growing {
        fn int_field(&mut self, label: &str, _value: i32) -> i32 {
            self.seen.push(label.to_string());
            self.next += 1;
            self.next
        }

        fn collection_length(&mut self, _label: &str, _len: usize) -> usize {
            self.len
        }
    }

    #[test]
    fn test_defaults_follow_shapes() {
        let types = TypeHandlerRegistry::new();
        let model = ParameterModel::with_defaults(&shapes(&types), &types).unwrap();
        assert_eq!(
            model.slots(),
            &[ParamSlot::Scalar(Value::Float32(0.0)), ParamSlot::Sequence(vec![])]
        );
    }

    #[test]
    fn test_resize_is_exact_and_keeps_prefix() {
        let mut seq = ints(&[1, 2, 3, 4, 5]);
        for target in [7usize, 7, 2, 0, 3, 1] {
            let before = seq.clone();
            resize_sequence(&mut seq, target, || Ok::<_, RegistryError>(Value::Int32(0))).unwrap();
            assert_eq!(seq.len(), target);
            let kept = before.len().min(target);
            assert_eq!(&seq[..kept], &before[..kept]);
            assert!(seq[kept..].iter().all(|v| *v == Value::Int32(0)));
        }
    }

    #[test]
    fn test_unallocatable_length_is_an_error() {
        let mut seq = ints(&[1, 2]);
        let err = resize_sequence(&mut seq, usize::MAX, || Ok::<_, RegistryError>(Value::Int32(0)))
            .unwrap_err();
        assert_eq!(err, RegistryError::CapacityExceeded { requested: usize::MAX });
        assert_eq!(seq, ints(&[1, 2]));

        let types = TypeHandlerRegistry::new();
        let shapes = shapes(&types);
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);
        assert!(matches!(
            handle.resize(1, usize::MAX),
            Err(RegistryError::CapacityExceeded { .. })
        ));
        let mut editor = Growing { len: usize::MAX, next: 0, seen: vec![] };
        assert!(handle.edit(1, &mut editor).is_err());
        assert_eq!(handle.model().get(1).unwrap().as_sequence().unwrap(), &[][..]);
    }

    #[test]
    fn test_failed_default_leaves_sequence_unchanged() {
        let mut seq = ints(&[1]);
        let mut made = 0;
        let err = resize_sequence(&mut seq, 4, || {
            made += 1;
            if made < 3 {
                Ok(Value::Int32(9))
            } else {
                Err(RegistryError::mismatch("Int32", "Bool"))
            }
        })
        .unwrap_err();
        assert!(matches!(err, RegistryError::ShapeMismatch { .. }));
        assert_eq!(seq, ints(&[1]));
    }

    #[test]
    fn test_failed_edit_cycle_leaves_sequence_unchanged() {
        let kind = ReferenceType::new("Broken");
        let mut types = TypeHandlerRegistry::new();
        types
            .register(ValueTypeTag::ObjectReference(kind), || Value::Int32(0), |_, _, v| v)
            .unwrap();
        let shapes = vec![ParameterShape::resolve(
            "targets",
            &DeclaredType::list(DeclaredType::reference(kind)),
            &types,
        )
        .unwrap()];
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);
        let mut editor = Growing { len: 2, next: 0, seen: vec![] };
        assert!(matches!(
            handle.edit(0, &mut editor),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(matches!(handle.resize(0, 2), Err(RegistryError::ShapeMismatch { .. })));
        assert_eq!(model.slots(), &[ParamSlot::Sequence(vec![])]);
    }

    #[test]
    fn test_shrink_drops_tail_only() {
        let mut seq = ints(&[10, 20, 30, 40]);
        resize_sequence(&mut seq, 3, || Ok::<_, RegistryError>(Value::Int32(0))).unwrap();
        assert_eq!(seq, ints(&[10, 20, 30]));
        resize_sequence(&mut seq, 1, || Ok::<_, RegistryError>(Value::Int32(0))).unwrap();
        assert_eq!(seq, ints(&[10]));
    }

    #[test]
    fn test_set_value_checks_shape() {
        let types = TypeHandlerRegistry::new();
        let shapes = shapes(&types);
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);

        handle.set_value(0, Value::Float32(5.5)).unwrap();
        assert!(matches!(
            handle.set_value(0, Value::Int32(5)),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            handle.set_value(1, Value::Int32(5)),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            handle.set_value(2, Value::Float32(1.0)),
            Err(RegistryError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert_eq!(model.get(0), Some(&ParamSlot::Scalar(Value::Float32(5.5))));
    }

    #[test]
    fn test_collection_mutations() {
        let types = TypeHandlerRegistry::new();
        let shapes = shapes(&types);
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);

        handle.resize(1, 3).unwrap();
        handle.set_element(1, 2, Value::Int32(9)).unwrap();
        assert!(handle.set_element(1, 3, Value::Int32(9)).is_err());
        assert!(handle.resize(0, 3).is_err());
        assert_eq!(handle.model().get(1).unwrap().as_sequence().unwrap(), &ints(&[0, 0, 9])[..]);

        handle.set_sequence(1, ints(&[4, 5])).unwrap();
        assert!(handle
            .set_sequence(1, vec![Value::Int32(1), Value::Bool(true)])
            .is_err());
        assert_eq!(handle.model().get(1).unwrap().as_sequence().unwrap(), &ints(&[4, 5])[..]);
    }

    #[test]
    fn test_edit_cycle_resizes_then_edits_elements_in_order() {
        let types = TypeHandlerRegistry::new();
        let shapes = shapes(&types);
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);
        let mut editor = Growing { len: 3, next: 0, seen: vec![] };

        handle.edit(1, &mut editor).unwrap();
        assert_eq!(editor.seen, vec!["Element 0", "Element 1", "Element 2"]);
        assert_eq!(handle.model().get(1).unwrap().as_sequence().unwrap(), &ints(&[1, 2, 3])[..]);

        editor.len = 1;
        handle.edit(1, &mut editor).unwrap();
        assert_eq!(handle.model().get(1).unwrap().as_sequence().unwrap(), &ints(&[4])[..]);
    }

    #[test]
    fn test_state_survives_passive_cycles() {
        let types = TypeHandlerRegistry::new();
        let shapes = shapes(&types);
        let mut model = ParameterModel::with_defaults(&shapes, &types).unwrap();
        let mut handle = ParameterHandle::new(&shapes, &mut model, &types);
        handle.set_value(0, Value::Float32(2.5)).unwrap();
        handle.set_sequence(1, ints(&[7, 8])).unwrap();

        for _ in 0..10 {
            handle.edit_all(&mut PassiveEditor).unwrap();
        }
        assert_eq!(
            model.slots(),
            &[
                ParamSlot::Scalar(Value::Float32(2.5)),
                ParamSlot::Sequence(ints(&[7, 8]))
            ]
        );
    }
}
