//! Backend configuration documents
//!
//! A backend document names the engine to use and carries the engine specific
//! settings untouched; the engine validates those when it builds the store.
//! `timeout-secs` is optional and falls back to the 60 second default.
//!
//! ```json
//! {
//!   "engine": "dvidkv",
//!   "type": "kv",
//!   "instance": "neuprint",
//!   "timeout-secs": 30,
//!   "engine-config": {
//!     "dataset": "hemibrain",
//!     "server": "emdata:8900",
//!     "branch": "52a13",
//!     "instance": "neuprint_kv"
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::storage::{EngineRegistry, StorageConfig, Store};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Type name used when the document does not set one
pub const DEFAULT_TYPE_NAME: &str = "kv";

fn default_type_name() -> String {
    DEFAULT_TYPE_NAME.to_string()
}

/// A storage backend as described in a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registry name of the engine
    pub engine: String,
    /// Type name handed to the store
    #[serde(rename = "type", default = "default_type_name")]
    pub type_name: String,
    /// Instance name handed to the store
    #[serde(default)]
    pub instance: String,
    /// Per-exchange timeout in seconds
    #[serde(rename = "timeout-secs", default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Engine specific settings
    #[serde(rename = "engine-config")]
    pub engine_config: serde_json::Value,
}

impl BackendConfig {
    /// Parse a backend document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BackendConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a backend document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            return Err(Error::Configuration {
                message: "engine name cannot be empty".to_string(),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Configuration {
                message: "timeout-secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Transport configuration of the described store
    pub fn storage_config(&self) -> StorageConfig {
        match self.timeout_secs {
            Some(secs) => StorageConfig::with_timeout(Duration::from_secs(secs)),
            None => StorageConfig::default(),
        }
    }

    /// Build the described store with an engine from `registry`
    pub fn open(&self, registry: &EngineRegistry) -> Result<Box<dyn Store>> {
        let store = registry.new_store(
            &self.engine,
            &self.engine_config,
            self.storage_config(),
            &self.type_name,
            &self.instance,
        )?;
        Ok(store)
    }
}
