pub mod catalog;
pub mod execute;
pub mod params;
pub mod table;

use serde::Serialize;

use crate::error::RegistryError;
use crate::model::{ParameterHandle, ParameterModel, ParameterShape, Value};
use crate::types::TypeHandlerRegistry;

pub use params::{Argument, Arguments, CommandParam, EnumParam, ScalarParam};
pub use table::{table_for, CommandEntry, CommandSpec, CommandTable, CommandTarget};

// ── Command metadata ────────────────────────────────────────────

/// Immutable description of one discovered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    name: String,
    parameter_shapes: Vec<ParameterShape>,
    allowed_outside_runtime: bool,
}

impl CommandDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_shapes(&self) -> &[ParameterShape] {
        &self.parameter_shapes
    }

    pub fn allowed_outside_runtime(&self) -> bool {
        self.allowed_outside_runtime
    }

    pub fn is_visible(&self, runtime_active: bool) -> bool {
        is_visible(self.allowed_outside_runtime, runtime_active)
    }

    /// e.g. `TestArray(String[])`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameter_shapes.iter().map(ParameterShape::type_name).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// A command may be invoked while the runtime is active, or at any time when it
/// is allowed outside the runtime.
pub fn is_visible(allowed_outside_runtime: bool, runtime_active: bool) -> bool {
    runtime_active || allowed_outside_runtime
}

/// Handle to a discovered command. Only valid for the discovery pass that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CommandId {
    generation: u32,
    index: usize,
}

impl CommandId {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

struct BoundCommand {
    descriptor: CommandDescriptor,
    entry: usize,
    model: ParameterModel,
}

fn bind(
    spec: &CommandSpec,
    types: &TypeHandlerRegistry,
) -> Result<(CommandDescriptor, ParameterModel), RegistryError> {
    let parameter_shapes = spec
        .params()
        .iter()
        .map(|(label, declared)| ParameterShape::resolve(label.as_str(), declared, types))
        .collect::<Result<Vec<_>, _>>()?;
    let model = ParameterModel::with_defaults(&parameter_shapes, types)?;
    let descriptor = CommandDescriptor {
        name: spec.name().to_string(),
        parameter_shapes,
        allowed_outside_runtime: spec.allowed_outside_runtime(),
    };
    Ok((descriptor, model))
}

// ── Registry ────────────────────────────────────────────────────

/// Discovered commands of one target type, each paired with its live parameter model.
pub struct CommandRegistry<T: CommandTarget> {
    types: TypeHandlerRegistry,
    table: std::sync::Arc<CommandTable<T>>,
    commands: Vec<BoundCommand>,
    generation: u32,
}

impl<T: CommandTarget> CommandRegistry<T> {
    /// Create a registry and run the first discovery pass.
    pub fn new(types: TypeHandlerRegistry) -> Self {
        let mut registry = Self {
            types,
            table: table_for::<T>(),
            commands: Vec::new(),
            generation: 0,
        };
        registry.discover();
        registry
    }

    pub fn types(&self) -> &TypeHandlerRegistry {
        &self.types
    }

    /// Handlers registered here apply from the next [`discover`](Self::discover).
    pub fn types_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.types
    }

    /// Replace the whole command set. Commands whose parameters do not resolve
    /// are left out; every surviving command gets a fresh default model.
    /// Returns the number of commands discovered.
    pub fn discover(&mut self) -> usize {
        self.generation = self.generation.wrapping_add(1);
        let types = &self.types;
        self.commands = self
            .table
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(entry, registered)| match bind(registered.spec(), types) {
                Ok((descriptor, model)) => Some(BoundCommand {
                    descriptor,
                    entry,
                    model,
                }),
                Err(err) => {
                    tracing::debug!(command = registered.spec().name(), reason = %err, "excluding command");
                    None
                }
            })
            .collect();
        tracing::debug!(
            generation = self.generation,
            commands = self.commands.len(),
            registered = self.table.len(),
            "discovered commands"
        );
        self.commands.len()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn id(&self, index: usize) -> CommandId {
        CommandId {
            generation: self.generation,
            index,
        }
    }

    /// All discovered commands, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = (CommandId, &CommandDescriptor)> + '_ {
        self.commands
            .iter()
            .enumerate()
            .map(|(index, bound)| (self.id(index), &bound.descriptor))
    }

    pub fn list_commands(&self) -> Vec<&CommandDescriptor> {
        self.commands.iter().map(|bound| &bound.descriptor).collect()
    }

    /// First command with `name`.
    pub fn find(&self, name: &str) -> Option<CommandId> {
        self.commands
            .iter()
            .position(|bound| bound.descriptor.name == name)
            .map(|index| self.id(index))
    }

    /// Every command with `name` (overloads), in registration order.
    pub fn find_all(&self, name: &str) -> Vec<CommandId> {
        self.commands()
            .filter(|(_, descriptor)| descriptor.name == name)
            .map(|(id, _)| id)
            .collect()
    }

    fn check(&self, id: CommandId) -> Result<usize, RegistryError> {
        if id.generation != self.generation {
            return Err(RegistryError::StaleCommand {
                generation: id.generation,
                current: self.generation,
            });
        }
        if id.index >= self.commands.len() {
            return Err(RegistryError::out_of_range("command", id.index, self.commands.len()));
        }
        Ok(id.index)
    }

    fn bound(&self, id: CommandId) -> Result<&BoundCommand, RegistryError> {
        let index = self.check(id)?;
        self.commands
            .get(index)
            .ok_or_else(|| RegistryError::out_of_range("command", index, self.commands.len()))
    }

    pub fn descriptor(&self, id: CommandId) -> Result<&CommandDescriptor, RegistryError> {
        Ok(&self.bound(id)?.descriptor)
    }

    pub fn parameter_model(&self, id: CommandId) -> Result<&ParameterModel, RegistryError> {
        Ok(&self.bound(id)?.model)
    }

    /// Read/write handle on a command's parameter model.
    pub fn parameters_mut(&mut self, id: CommandId) -> Result<ParameterHandle<'_>, RegistryError> {
        let index = self.check(id)?;
        let len = self.commands.len();
        let bound = self
            .commands
            .get_mut(index)
            .ok_or_else(|| RegistryError::out_of_range("command", index, len))?;
        Ok(ParameterHandle::new(
            &bound.descriptor.parameter_shapes,
            &mut bound.model,
            &self.types,
        ))
    }

    pub fn set_parameter_value(
        &mut self,
        id: CommandId,
        index: usize,
        value: Value,
    ) -> Result<(), RegistryError> {
        self.parameters_mut(id)?.set_value(index, value)
    }

    pub fn set_collection_element(
        &mut self,
        id: CommandId,
        index: usize,
        element: usize,
        value: Value,
    ) -> Result<(), RegistryError> {
        self.parameters_mut(id)?.set_element(index, element, value)
    }

    pub fn resize_collection_parameter(
        &mut self,
        id: CommandId,
        index: usize,
        len: usize,
    ) -> Result<(), RegistryError> {
        self.parameters_mut(id)?.resize(index, len)
    }

    /// Evaluated on every call; nothing is cached.
    pub fn is_visible(&self, id: CommandId, runtime_active: bool) -> Result<bool, RegistryError> {
        Ok(self.descriptor(id)?.is_visible(runtime_active))
    }

    pub fn visible_commands(&self, runtime_active: bool) -> Vec<CommandId> {
        self.commands()
            .filter(|(_, descriptor)| descriptor.is_visible(runtime_active))
            .map(|(id, _)| id)
            .collect()
    }

    /// Build the arguments from the current model and call the command on
    /// `target`. The target's own failure is returned as is. Visibility is the
    /// caller's policy and is not checked here.
    pub fn invoke(&self, id: CommandId, target: &mut T) -> Result<(), T::Error> {
        let bound = self.bound(id)?;
        let entry = self.table.entries().get(bound.entry).ok_or_else(|| {
            RegistryError::UnknownCommand {
                name: bound.descriptor.name.clone(),
            }
        })?;
        execute::execute(entry, &bound.descriptor, &bound.model, target)
    }
}

impl<T: CommandTarget> Default for CommandRegistry<T> {
    fn default() -> Self {
        Self::new(TypeHandlerRegistry::new())
    }
}

impl<T: CommandTarget> std::fmt::Debug for CommandRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("generation", &self.generation)
            .field("commands", &self.list_commands())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeclaredType, ParamSlot, ReferenceType, ShapeKind, ValueTypeTag};

    const TRANSFORM: ReferenceType = ReferenceType::new("Transform");

    #[derive(Default)]
    struct Ship {
        speed: f32,
        list: Option<Vec<i32>>,
        array: Option<Box<[i32]>>,
        order: Vec<String>,
    }

    #[derive(Debug, PartialEq)]
    enum ShipError {
        Registry(RegistryError),
        Refused(String),
    }

    impl From<RegistryError> for ShipError {
        fn from(e: RegistryError) -> Self {
            ShipError::Registry(e)
        }
    }

    impl CommandTarget for Ship {
        type Error = ShipError;

        fn command_table() -> CommandTable<Self> {
            CommandTable::new()
                .command(CommandSpec::new("SetSpeed").param::<f32>("v"), |s: &mut Ship, args| {
                    s.speed = args.get(0)?;
                    Ok(())
                })
                .command(
                    CommandSpec::new("Nested").param_declared(
                        "xs",
                        DeclaredType::list(DeclaredType::list(DeclaredType::scalar(ValueTypeTag::Int32))),
                    ),
                    |_: &mut Ship, _| Ok(()),
                )
                .command(CommandSpec::new("TestList").param::<Vec<i32>>("xs"), |s: &mut Ship, args| {
                    s.list = Some(args.get(0)?);
                    Ok(())
                })
                .command(
                    CommandSpec::new("Follow").param_declared("target", DeclaredType::reference(TRANSFORM)),
                    |_: &mut Ship, _| Ok(()),
                )
                .command(
                    CommandSpec::new("Mixed")
                        .param::<String>("label")
                        .param::<Box<[i32]>>("xs")
                        .param::<bool>("flag")
                        .allow_outside_runtime(),
                    |s: &mut Ship, args| {
                        s.order.push(args.get::<String>(0)?);
                        s.array = Some(args.get(1)?);
                        s.order.push(args.get::<bool>(2)?.to_string());
                        Ok(())
                    },
                )
                .command(
                    CommandSpec::new("Ratio").param_declared("r", DeclaredType::Unsupported("f64")),
                    |_: &mut Ship, _| Ok(()),
                )
                .command(CommandSpec::new("Explode").allow_outside_runtime(), |_: &mut Ship, _| {
                    Err(ShipError::Refused("boom".to_string()))
                })
        }
    }

    fn names(registry: &CommandRegistry<Ship>) -> Vec<&str> {
        registry.list_commands().iter().map(|d| d.name()).collect()
    }

    #[test]
    fn test_discovery_filters_unresolvable_commands() {
        let registry = CommandRegistry::<Ship>::default();
        assert_eq!(names(&registry), vec!["SetSpeed", "TestList", "Mixed", "Explode"]);
    }

    #[test]
    fn test_registered_reference_type_enables_command() {
        let mut registry = CommandRegistry::<Ship>::default();
        registry.types_mut().register_reference(TRANSFORM);
        registry.discover();
        assert_eq!(
            names(&registry),
            vec!["SetSpeed", "TestList", "Follow", "Mixed", "Explode"]
        );
        let follow = registry.find("Follow").unwrap();
        assert_eq!(
            registry.parameter_model(follow).unwrap().get(0).unwrap().as_scalar().unwrap().as_reference().unwrap().id,
            None
        );
    }

    #[test]
    fn test_set_speed_scenario() {
        let mut registry = CommandRegistry::<Ship>::default();
        let id = registry.find("SetSpeed").unwrap();
        let descriptor = registry.descriptor(id).unwrap();
        assert_eq!(descriptor.parameter_shapes().len(), 1);
        assert_eq!(descriptor.parameter_shapes()[0].tag(), ValueTypeTag::Float32);
        assert_eq!(
            registry.parameter_model(id).unwrap().slots(),
            &[ParamSlot::Scalar(Value::Float32(0.0))]
        );

        registry.set_parameter_value(id, 0, Value::Float32(5.5)).unwrap();
        let mut ship = Ship::default();
        registry.invoke(id, &mut ship).unwrap();
        assert_eq!(ship.speed, 5.5);
    }

    #[test]
    fn test_list_scenario() {
        let mut registry = CommandRegistry::<Ship>::default();
        let id = registry.find("TestList").unwrap();
        assert!(!registry.is_visible(id, false).unwrap());
        assert!(registry.is_visible(id, true).unwrap());

        registry.resize_collection_parameter(id, 0, 3).unwrap();
        let mut ship = Ship::default();
        registry.invoke(id, &mut ship).unwrap();
        assert_eq!(ship.list, Some(vec![0, 0, 0]));

        registry.set_collection_element(id, 0, 1, Value::Int32(4)).unwrap();
        registry.invoke(id, &mut ship).unwrap();
        assert_eq!(ship.list, Some(vec![0, 4, 0]));
    }

    #[test]
    fn test_arrays_are_materialised_in_declared_order() {
        let mut registry = CommandRegistry::<Ship>::default();
        let id = registry.find("Mixed").unwrap();
        assert_eq!(
            registry.descriptor(id).unwrap().parameter_shapes()[1].kind(),
            ShapeKind::Array
        );
        {
            let mut params = registry.parameters_mut(id).unwrap();
            params.set_value(0, Value::String("go".into())).unwrap();
            params
                .set_sequence(1, vec![Value::Int32(7), Value::Int32(8), Value::Int32(9)])
                .unwrap();
            params.set_value(2, Value::Bool(true)).unwrap();
        }
        let mut ship = Ship::default();
        registry.invoke(id, &mut ship).unwrap();
        assert_eq!(ship.array.as_deref(), Some(&[7, 8, 9][..]));
        assert_eq!(ship.order, vec!["go", "true"]);
    }

    #[test]
    fn test_target_failure_propagates_unmodified() {
        let registry = CommandRegistry::<Ship>::default();
        let id = registry.find("Explode").unwrap();
        let err = registry.invoke(id, &mut Ship::default()).unwrap_err();
        assert_eq!(err, ShipError::Refused("boom".to_string()));
    }

    #[test]
    fn test_visibility_truth_table() {
        for (allowed, runtime, visible) in [
            (false, false, false),
            (false, true, true),
            (true, false, true),
            (true, true, true),
        ] {
            assert_eq!(is_visible(allowed, runtime), visible);
        }
        let registry = CommandRegistry::<Ship>::default();
        let outside: Vec<_> = registry
            .visible_commands(false)
            .into_iter()
            .map(|id| registry.descriptor(id).unwrap().name().to_string())
            .collect();
        assert_eq!(outside, vec!["Mixed", "Explode"]);
        assert_eq!(registry.visible_commands(true).len(), registry.len());
    }

    #[test]
    fn test_rediscovery_resets_models_and_stales_ids() {
        let mut registry = CommandRegistry::<Ship>::default();
        let old = registry.find("SetSpeed").unwrap();
        registry.set_parameter_value(old, 0, Value::Float32(2.0)).unwrap();

        registry.discover();
        assert!(matches!(
            registry.descriptor(old),
            Err(RegistryError::StaleCommand { .. })
        ));
        assert!(matches!(
            registry.invoke(old, &mut Ship::default()),
            Err(ShipError::Registry(RegistryError::StaleCommand { .. }))
        ));
        let new = registry.find("SetSpeed").unwrap();
        assert_eq!(
            registry.parameter_model(new).unwrap().slots(),
            &[ParamSlot::Scalar(Value::Float32(0.0))]
        );
    }

    #[test]
    fn test_precondition_failures() {
        let mut registry = CommandRegistry::<Ship>::default();
        let id = registry.find("SetSpeed").unwrap();
        assert!(matches!(
            registry.set_parameter_value(id, 0, Value::Int32(1)),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            registry.resize_collection_parameter(id, 0, 2),
            Err(RegistryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            registry.set_parameter_value(id, 1, Value::Float32(1.0)),
            Err(RegistryError::IndexOutOfRange { .. })
        ));
        assert_eq!(registry.find("Missing"), None);
    }

    #[test]
    fn test_signature() {
        let registry = CommandRegistry::<Ship>::default();
        let id = registry.find("Mixed").unwrap();
        assert_eq!(
            registry.descriptor(id).unwrap().signature(),
            "Mixed(String, Int32[], Bool)"
        );
    }
}
