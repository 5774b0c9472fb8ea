//! Backend registry.
//!
//! Maps backend names to factories producing boxed [`CommandChannel`]s.
//! Built at startup and passed to whoever opens channels; there is no
//! global registry.

use crate::channel::CommandChannel;
use crate::error::{CommandError, CommandResult};
use crate::simulated::SimulatedBackend;
use std::collections::HashMap;
use tracing::debug;

/// Factory function type for creating backend instances.
pub type BackendFactory = fn() -> Box<dyn CommandChannel>;

/// Registry of available command backends.
pub struct BackendRegistry {
    factories: HashMap<&'static str, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the in-process backends.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert(SimulatedBackend::NAME, create_simulated_backend);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Errors
    /// Returns `CommandError::BackendAlreadyRegistered` if the name is taken.
    pub fn register(&mut self, name: &'static str, factory: BackendFactory) -> CommandResult<()> {
        if self.factories.contains_key(name) {
            return Err(CommandError::BackendAlreadyRegistered {
                name: name.to_string(),
            });
        }
        debug!("Registered command backend '{name}'");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BackendFactory> {
        self.factories.get(name).copied()
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// Returns `CommandError::BackendNotFound` if no backend with the given name is registered.
    pub fn create_backend(&self, name: &str) -> CommandResult<Box<dyn CommandChannel>> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| CommandError::BackendNotFound {
                name: name.to_string(),
            })?;
        Ok(factory())
    }

    /// List all registered backend names, sorted.
    pub fn list_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn create_simulated_backend() -> Box<dyn CommandChannel> {
    Box::new(SimulatedBackend::new())
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
