//! Storage module for the DVID key-value adapter
//!
//! This module provides a uniform key-value interface over remote storage services:
//! - **Engines** - Registered backend descriptors that build configured stores
//! - **Stores** - Handles bound to one remote endpoint with `put`/`get`
//! - **Registry** - Name-keyed lookup of engines for the host application
//!
//! Only the DVID key-value backend ships with the crate.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dvid_kv_rust::storage::{EngineRegistry, KeyValueSync, SimpleStore, StorageConfig};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = EngineRegistry::with_builtin_engines()?;
//! let config = json!({
//!     "dataset": "hemibrain",
//!     "server": "emdata:8900",
//!     "branch": "52a13",
//!     "instance": "neuprint_kv",
//! });
//! let store = registry.new_store("dvidkv", &config, StorageConfig::default(), "kv", "neuprint")?;
//!
//! store.put(b"unused", b"Hello, DVID!")?;
//! let data = store.get(b"unused")?;
//! println!("{} bytes from {}", data.len(), store.database()?.0);
//! # Ok(())
//! # }
//! ```

// Core storage API and types
pub mod storage_api;

// Engine registry
pub mod registry;

// Storage backend implementations
pub mod storage_dvidkv;

// Re-export main types for convenience
pub use storage_api::{
    DatasetInfo, KeyValueSync, SimpleStore, StorageConfig, StorageEngine, Store,
};

#[cfg(feature = "async")]
pub use storage_api::{AsyncKeyValue, BoxFuture, KeyValue};

pub use registry::EngineRegistry;
pub use storage_dvidkv::{DvidConfig, DvidKvEngine, DvidKvStore};

/// Storage constants
pub mod constants {
    //! Constants used throughout the storage module

    /// Default timeout for a single HTTP exchange in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
}
