//! Error types for the DVID key-value adapter
//!
//! This module provides a unified error handling system using `thiserror` for
//! the storage engines, the engine registry and the command line tool.

use thiserror::Error;

/// The main error type for the adapter
#[derive(Error, Debug)]
pub enum Error {
    /// Storage operation errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// The configuration handed to an engine does not have the shape it expects
    #[error("Invalid configuration for {backend}: {reason}")]
    InvalidConfig {
        /// Engine that rejected the configuration
        backend: String,
        /// Message of the underlying failure
        reason: String,
    },

    /// The HTTP request could not be built (malformed endpoint)
    #[error("Failed to build request for {endpoint}: {reason}")]
    RequestConstruction {
        /// Endpoint the request targeted
        endpoint: String,
        /// Message of the underlying failure
        reason: String,
    },

    /// The HTTP exchange did not complete
    #[error("Transport error for {endpoint}: {reason}")]
    Transport {
        /// Endpoint the request targeted
        endpoint: String,
        /// Message of the underlying failure
        reason: String,
        /// Set when the transport gave up because of its timeout
        timed_out: bool,
    },

    /// Draining a response body failed
    #[error("Failed to read response body from {endpoint}: {reason}")]
    BodyRead {
        /// Endpoint the request targeted
        endpoint: String,
        /// Message of the underlying failure
        reason: String,
    },

    /// A version literal is not valid semver
    #[error("Invalid version {version:?}: {reason}")]
    InvalidVersion {
        /// The rejected literal
        version: String,
        /// Message of the underlying failure
        reason: String,
    },

    /// No engine is registered under this name
    #[error("Storage engine not found: {name}")]
    EngineNotFound {
        /// Name that was looked up
        name: String,
    },

    /// An engine is already registered under this name
    #[error("Storage engine already registered: {name}")]
    DuplicateEngine {
        /// Name already taken in the registry
        name: String,
    },
}

impl StorageError {
    /// Whether the error came from the HTTP transport timing out
    pub fn is_timeout(&self) -> bool {
        matches!(self, StorageError::Transport { timed_out: true, .. })
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience type alias for Storage Results
pub type StorageResult<T> = std::result::Result<T, StorageError>;
