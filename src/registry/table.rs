//! Explicit per-type registration tables.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::error::RegistryError;
use crate::model::DeclaredType;

use super::params::{Arguments, CommandParam};

/// A type whose operations can be exposed as commands.
pub trait CommandTarget: Sized + 'static {
    /// Error returned by the target's own operations. Registry precondition
    /// failures convert into it so both compose with `?`.
    type Error: From<RegistryError> + 'static;

    /// The full registration table for this type, in enumeration order.
    fn command_table() -> CommandTable<Self>;
}

pub type Handler<T> =
    Arc<dyn Fn(&mut T, &Arguments) -> Result<(), <T as CommandTarget>::Error> + Send + Sync>;

/// Static registration metadata for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    params: Vec<(String, DeclaredType)>,
    allowed_outside_runtime: bool,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            allowed_outside_runtime: false,
        }
    }

    /// Append a parameter whose shape comes from its Rust type.
    pub fn param<P: CommandParam>(self, label: impl Into<String>) -> Self {
        self.param_declared(label, P::declared_type())
    }

    /// Append a parameter with an explicit declared type (references, or types
    /// with no value representation).
    pub fn param_declared(mut self, label: impl Into<String>, declared: DeclaredType) -> Self {
        self.params.push((label.into(), declared));
        self
    }

    /// Mark the command invocable while the host runtime is inactive.
    pub fn allow_outside_runtime(mut self) -> Self {
        self.allowed_outside_runtime = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(String, DeclaredType)] {
        &self.params
    }

    pub fn allowed_outside_runtime(&self) -> bool {
        self.allowed_outside_runtime
    }
}

/// A registered command: its metadata and the bound operation.
pub struct CommandEntry<T: CommandTarget> {
    spec: CommandSpec,
    handler: Handler<T>,
}

impl<T: CommandTarget> CommandEntry<T> {
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub(crate) fn call(&self, target: &mut T, args: &Arguments) -> Result<(), T::Error> {
        (self.handler)(target, args)
    }
}

impl<T: CommandTarget> fmt::Debug for CommandEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Ordered registration table for one target type. Duplicate names are allowed.
pub struct CommandTable<T: CommandTarget> {
    entries: Vec<CommandEntry<T>>,
}

impl<T: CommandTarget> CommandTable<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn command(
        mut self,
        spec: CommandSpec,
        handler: impl Fn(&mut T, &Arguments) -> Result<(), T::Error> + Send + Sync + 'static,
    ) -> Self {
        self.entries.push(CommandEntry {
            spec,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn entries(&self) -> &[CommandEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: CommandTarget> Default for CommandTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CommandTarget> fmt::Debug for CommandTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

static TABLES: LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The registration table for `T`, built on first use and shared afterwards.
pub fn table_for<T: CommandTarget>() -> Arc<CommandTable<T>> {
    let key = TypeId::of::<T>();
    if let Some(cached) = cached_table::<T>(key) {
        return cached;
    }
    // Built outside the lock: a table may itself look up another type's table.
    let built = Arc::new(T::command_table());
    let stored = Arc::clone(
        TABLES
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::clone(&built) as Arc<dyn Any + Send + Sync>),
    );
    stored.downcast::<CommandTable<T>>().unwrap_or(built)
}

fn cached_table<T: CommandTarget>(key: TypeId) -> Option<Arc<CommandTable<T>>> {
    let cached = TABLES.lock().get(&key).cloned()?;
    cached.downcast::<CommandTable<T>>().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::ValueTypeTag;

    struct Counter {
        hits: u32,
    }

    impl CommandTarget for Counter {
        type Error = RegistryError;

        fn command_table() -> CommandTable<Self> {
            CommandTable::new()
                .command(CommandSpec::new("Hit").allow_outside_runtime(), |c: &mut Counter, _| {
                    c.hits += 1;
                    Ok(())
                })
                .command(CommandSpec::new("Add").param::<i32>("n"), |c: &mut Counter, args| {
                    c.hits += u32::try_from(args.get::<i32>(0)?).unwrap_or(0);
                    Ok(())
                })
        }
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("Move")
            .param::<f32>("speed")
            .param::<Vec<String>>("names")
            .allow_outside_runtime();
        assert_eq!(spec.name(), "Move");
        assert!(spec.allowed_outside_runtime());
        assert_eq!(spec.params().len(), 2);
        assert_eq!(spec.params()[0].1, DeclaredType::scalar(ValueTypeTag::Float32));
        assert!(!CommandSpec::new("Other").allowed_outside_runtime());
    }

    #[test]
    fn test_table_is_built_once_per_type() {
        let first = table_for::<Counter>();
        let second = table_for::<Counter>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(first.entries()[1].spec().name(), "Add");
    }

    #[test]
    fn test_entries_call_bound_operation() {
        let table = table_for::<Counter>();
        let mut counter = Counter { hits: 0 };
        table.entries()[0].call(&mut counter, &Arguments::default()).unwrap();
        assert_eq!(counter.hits, 1);
        let err = table.entries()[1].call(&mut counter, &Arguments::default()).unwrap_err();
        assert!(matches!(err, RegistryError::IndexOutOfRange { .. }));
    }
}
