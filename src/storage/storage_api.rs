//! Storage engine and store contracts
//!
//! This module provides the uniform interface a host application uses to talk to
//! any storage backend: an engine (the registered descriptor) builds stores, and
//! a store exposes identity accessors plus key-value operations.

use crate::error::StorageResult;
use bytes::Bytes;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[cfg(feature = "async")]
use std::{future::Future, pin::Pin};

use super::constants::DEFAULT_TIMEOUT_SECONDS;

/// Per-store transport configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Timeout applied to every HTTP exchange
    pub timeout: Duration,
}

impl StorageConfig {
    /// Configuration with the given per-exchange timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

/// Branch and data instance reported for a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Version (branch/UUID) token on the server
    pub branch: String,
    /// Data instance name on the server
    pub instance: String,
}

/// A storage backend that can be registered with the host and asked for stores
///
/// The configuration arrives as an untyped JSON document because one registry
/// dispatches to every backend kind; each engine validates it against its own
/// concrete configuration type.
pub trait StorageEngine: Send + Sync {
    /// Registry key of the engine
    fn name(&self) -> &str;

    /// Remote protocol version the engine supports
    fn version(&self) -> &Version;

    /// Build a store bound to the endpoint described by `config`
    ///
    /// `storage_config` carries the transport policy (timeout) the store uses
    /// for every exchange.
    fn new_store(
        &self,
        config: &serde_json::Value,
        storage_config: StorageConfig,
        type_name: &str,
        instance: &str,
    ) -> StorageResult<Box<dyn Store>>;
}

/// Identity and bookkeeping accessors every store exposes
pub trait SimpleStore: Send + Sync {
    /// Location of the database and a short description of the backend
    fn database(&self) -> StorageResult<(String, String)>;

    /// Canonical version string of the store
    fn version_string(&self) -> StorageResult<String>;

    /// Datasets served by this store
    fn datasets(&self) -> StorageResult<BTreeMap<String, DatasetInfo>>;

    /// Instance name the host gave this store
    fn instance(&self) -> &str;

    /// Type name the host gave this store
    fn type_name(&self) -> &str;
}

/// Blocking key-value operations
pub trait KeyValueSync: Send + Sync {
    /// Store a value
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &[u8]) -> StorageResult<Bytes>;
}

/// Async key-value operations
#[cfg(feature = "async")]
pub trait KeyValue: Send + Sync {
    /// Store a value
    fn put(&self, key: &[u8], value: Bytes) -> impl Future<Output = StorageResult<()>> + Send;

    /// Retrieve a value
    fn get(&self, key: &[u8]) -> impl Future<Output = StorageResult<Bytes>> + Send;
}

/// Boxed future returned by the object-safe async operations
#[cfg(feature = "async")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe form of [`KeyValue`], reachable through `dyn Store`
#[cfg(feature = "async")]
pub trait AsyncKeyValue: Send + Sync {
    /// Store a value
    fn put_async<'a>(&'a self, key: &'a [u8], value: Bytes) -> BoxFuture<'a, StorageResult<()>>;

    /// Retrieve a value
    fn get_async<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, StorageResult<Bytes>>;
}

#[cfg(feature = "async")]
impl<T: KeyValue> AsyncKeyValue for T {
    fn put_async<'a>(&'a self, key: &'a [u8], value: Bytes) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(KeyValue::put(self, key, value))
    }

    fn get_async<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, StorageResult<Bytes>> {
        Box::pin(KeyValue::get(self, key))
    }
}

/// A complete store as handed out by the engine registry
#[cfg(feature = "async")]
pub trait Store: SimpleStore + KeyValueSync + AsyncKeyValue {}

#[cfg(feature = "async")]
impl<T: SimpleStore + KeyValueSync + AsyncKeyValue> Store for T {}

/// A complete store as handed out by the engine registry
#[cfg(not(feature = "async"))]
pub trait Store: SimpleStore + KeyValueSync {}

#[cfg(not(feature = "async"))]
impl<T: SimpleStore + KeyValueSync> Store for T {}

/// Utility functions for storage endpoints
pub mod utils {
    /// Build the key endpoint of a DVID data instance
    ///
    /// The result is `http://{server}/api/{branch}/{instance}/key/`; no escaping
    /// or validation is applied, a malformed server surfaces when a request is
    /// built against the endpoint.
    pub fn build_endpoint(server: &str, branch: &str, instance: &str) -> String {
        format!("http://{}/api/{}/{}/key/", server, branch, instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_build_endpoint() {
        assert_eq!(
            utils::build_endpoint("emdata:8000", "a1b2c3", "segmentation_meta"),
            "http://emdata:8000/api/a1b2c3/segmentation_meta/key/"
        );
    }

    #[test]
    fn test_dataset_info_json() {
        let info = DatasetInfo {
            branch: "master".to_string(),
            instance: "kv".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"branch": "master", "instance": "kv"}));
    }

    proptest! {
        #[test]
        fn endpoint_is_plain_concatenation(
            server in "[a-z0-9.:-]{1,24}",
            branch in "[a-zA-Z0-9_]{1,16}",
            instance in "[a-zA-Z0-9_]{1,16}",
        ) {
            let endpoint = utils::build_endpoint(&server, &branch, &instance);
            prop_assert_eq!(
                endpoint,
                "http://".to_string() + &server + "/api/" + &branch + "/" + &instance + "/key/"
            );
        }
    }
}
