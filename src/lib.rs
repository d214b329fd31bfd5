//! # DVID Key-Value Rust Library
//!
//! A pluggable storage adapter exposing a uniform key-value interface over a
//! DVID server reachable via HTTP. Hosts register engines, build stores from a
//! backend configuration and store or retrieve opaque byte blobs without knowing
//! the remote protocol.
//!
//! ## Features
//!
//! - **Storage Module**: Engine and store contracts, the engine registry and the DVID backend
//! - **Config Module**: Backend configuration documents naming an engine and its settings
//! - **Error Module**: Typed errors for configuration, request, transport and body failures
//!
//! ## Optional Features
//!
//! - `async`: Asynchronous `put`/`get` on top of the blocking API
//! - `cli`: The `dvidkv` command line tool (see [`cli`])
//!
//! ## Example
//!
//! ```rust
//! use dvid_kv_rust::storage::{DvidConfig, DvidKvEngine, SimpleStore};
//!
//! let engine = DvidKvEngine::new();
//! let config = DvidConfig {
//!     dataset: "hemibrain".to_string(),
//!     server: "emdata:8900".to_string(),
//!     branch: "52a13".to_string(),
//!     instance: "neuprint_kv".to_string(),
//! };
//! let store = engine.new_client(config, "kv", "neuprint");
//! assert_eq!(store.endpoint(), "http://emdata:8900/api/52a13/neuprint_kv/key/");
//! assert_eq!(store.version_string()?, "0.1.0");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export core error types
pub use error::{Error, Result};

// Core modules
pub mod config;
pub mod error;
pub mod storage;

#[cfg(feature = "cli")]
pub mod cli;

// Utility modules
mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Common types and traits for convenient importing

    pub use crate::config::BackendConfig;
    pub use crate::error::{Error, Result, StorageError, StorageResult};
    pub use crate::storage::{
        DvidConfig, DvidKvEngine, DvidKvStore, EngineRegistry, KeyValueSync, SimpleStore,
        StorageConfig, StorageEngine, Store,
    };

    #[cfg(feature = "async")]
    pub use crate::storage::AsyncKeyValue;
}

// Version information
/// The version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(CRATE_NAME, "dvid-kv-rust");
    }
}
