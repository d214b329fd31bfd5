//! Registry of storage engines
//!
//! Hosts look engines up by name and ask them for stores. Nothing registers
//! itself: the host builds a registry and adds the engines it wants, or uses
//! [`EngineRegistry::with_builtin_engines`].

use crate::error::{StorageError, StorageResult};
use crate::storage::storage_api::{StorageConfig, StorageEngine, Store};
use crate::storage::storage_dvidkv::DvidKvEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name-keyed collection of storage engines
#[derive(Default, Clone)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn StorageEngine>>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every engine shipped with this crate
    pub fn with_builtin_engines() -> StorageResult<Self> {
        let mut registry = Self::new();
        registry.register(DvidKvEngine::new())?;
        Ok(registry)
    }

    /// Register an engine under its own name
    ///
    /// Only one engine may be registered per name.
    pub fn register<E>(&mut self, engine: E) -> StorageResult<()>
    where
        E: StorageEngine + 'static,
    {
        let name = engine.name().to_string();
        if self.engines.contains_key(&name) {
            return Err(StorageError::DuplicateEngine { name });
        }

        debug!(engine = %name, version = %engine.version(), "registered storage engine");
        self.engines.insert(name, Arc::new(engine));
        Ok(())
    }

    /// Look up an engine by name
    pub fn get(&self, name: &str) -> StorageResult<Arc<dyn StorageEngine>> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::EngineNotFound {
                name: name.to_string(),
            })
    }

    /// Whether an engine is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Sorted names of all registered engines
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Build a store with the engine registered under `name`
    pub fn new_store(
        &self,
        name: &str,
        config: &serde_json::Value,
        storage_config: StorageConfig,
        type_name: &str,
        instance: &str,
    ) -> StorageResult<Box<dyn Store>> {
        self.get(name)?
            .new_store(config, storage_config, type_name, instance)
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.names())
            .finish()
    }
}
