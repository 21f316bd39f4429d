use std::sync::Arc;

use parking_lot::Mutex;

use crate::registry::{CommandId, CommandRegistry, CommandTarget};

/// A command registry shared between threads. Discovery, every parameter-model
/// mutation, and invocation all run under one lock, so no consumer can edit a
/// model while a discovery pass replaces it.
pub struct SharedRegistry<T: CommandTarget> {
    inner: Arc<Mutex<CommandRegistry<T>>>,
}

impl<T: CommandTarget> SharedRegistry<T> {
    pub fn new(registry: CommandRegistry<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Read-only access to the registry. Locks the mutex for the duration of `f`;
    /// `f` must not lock it again.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CommandRegistry<T>) -> R,
    {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// Mutating access to the registry. Locks the mutex for the duration of `f`;
    /// `f` must not lock it again.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CommandRegistry<T>) -> R,
    {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn discover(&self) -> usize {
        self.with_mut(CommandRegistry::discover)
    }

    /// Invoke a command under the lock. The lock is held while the command runs,
    /// so a command must not call back into this `SharedRegistry` (or any clone
    /// of it); doing so deadlocks.
    pub fn invoke(&self, id: CommandId, target: &mut T) -> Result<(), T::Error> {
        self.with(|registry| registry.invoke(id, target))
    }
}

impl<T: CommandTarget> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
