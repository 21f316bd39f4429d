use crate::error::RegistryError;
use crate::model::{ParamSlot, ParameterModel, ParameterShape, ShapeKind};

use super::params::{Argument, Arguments};
use super::table::{CommandEntry, CommandTarget};
use super::CommandDescriptor;

/// Convert editing state into call arguments. Array parameters are materialised
/// as fixed arrays from their sequence; lists are passed as sequences.
pub fn build_arguments(
    shapes: &[ParameterShape],
    model: &ParameterModel,
) -> Result<Arguments, RegistryError> {
    if shapes.len() != model.len() {
        return Err(RegistryError::mismatch(
            format!("{} parameters", shapes.len()),
            format!("{} slots", model.len()),
        ));
    }
    shapes
        .iter()
        .zip(model.slots())
        .map(|(shape, slot)| match (shape.kind(), slot) {
            (ShapeKind::Scalar, ParamSlot::Scalar(value)) => Ok(Argument::Scalar(value.clone())),
            (ShapeKind::Array, ParamSlot::Sequence(values)) => {
                Ok(Argument::Array(values.clone().into_boxed_slice()))
            }
            (ShapeKind::List, ParamSlot::Sequence(values)) => Ok(Argument::List(values.clone())),
            (_, ParamSlot::Scalar(value)) => {
                Err(RegistryError::mismatch(shape.type_name(), value.element_type()))
            }
            (_, ParamSlot::Sequence(_)) => Err(RegistryError::mismatch(shape.type_name(), "sequence")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Arguments::new)
}

/// Execute a bound command against `target`. This is the single call point for
/// every host surface (panel, CLI, tests).
pub fn execute<T: CommandTarget>(
    entry: &CommandEntry<T>,
    descriptor: &CommandDescriptor,
    model: &ParameterModel,
    target: &mut T,
) -> Result<(), T::Error> {
    let args = build_arguments(descriptor.parameter_shapes(), model)?;
    tracing::debug!(command = descriptor.name(), arguments = args.len(), "invoking command");
    entry.call(target, &args)
}
