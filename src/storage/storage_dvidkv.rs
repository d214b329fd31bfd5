//! DVID key-value storage backend implementation
//!
//! A store is bound to the `key` endpoint of one DVID data instance:
//! `http://{server}/api/{branch}/{instance}/key/`. The endpoint is computed once
//! when the store is built and never changes afterwards.
//!
//! Current wire behavior, kept on purpose:
//! - the key passed to `put`/`get` is not part of the request, every call hits
//!   the fixed endpoint
//! - HTTP status codes are not enforced, any completed exchange is a success
//!   (non-2xx statuses are only logged)
//! - each call builds its own HTTP client with the configured timeout
//!   (60 seconds by default), nothing is pooled or retried

use crate::error::{StorageError, StorageResult};
use crate::storage::storage_api::{
    utils::build_endpoint, DatasetInfo, KeyValueSync, SimpleStore, StorageConfig, StorageEngine,
    Store,
};
use crate::utils::bytes_to_hex;
use bytes::Bytes;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[cfg(feature = "async")]
use crate::storage::storage_api::KeyValue;

/// Registry name of the backend
pub const NAME: &str = "dvidkv";

/// Version of the DVID key-value API that is supported
pub const VERSION: &str = "0.1.0";

const SUPPORTED_VERSION: Version = Version::new(0, 1, 0);

/// Connection settings of a DVID key-value instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvidConfig {
    /// Dataset label reported to the host
    pub dataset: String,
    /// Server address (`host[:port]`)
    pub server: String,
    /// Version (branch/UUID) token
    pub branch: String,
    /// Key-value data instance name
    pub instance: String,
}

impl DvidConfig {
    /// Validate an untyped configuration document
    pub fn from_value(value: &serde_json::Value) -> StorageResult<Self> {
        DvidConfig::deserialize(value).map_err(invalid_config)
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json).map_err(invalid_config)
    }

    /// Key endpoint described by this configuration
    pub fn endpoint(&self) -> String {
        build_endpoint(&self.server, &self.branch, &self.instance)
    }
}

fn invalid_config(err: serde_json::Error) -> StorageError {
    StorageError::InvalidConfig {
        backend: NAME.to_string(),
        reason: err.to_string(),
    }
}

/// The DVID key-value engine, registered with the host under [`NAME`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvidKvEngine {
    name: String,
    version: Version,
}

impl Default for DvidKvEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DvidKvEngine {
    /// Create the engine for the supported API version
    pub fn new() -> Self {
        Self {
            name: NAME.to_string(),
            version: SUPPORTED_VERSION,
        }
    }

    /// Create the engine for another API version
    pub fn with_version(version: &str) -> StorageResult<Self> {
        let version = Version::parse(version).map_err(|e| StorageError::InvalidVersion {
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: NAME.to_string(),
            version,
        })
    }

    /// Create a store from an already typed configuration
    pub fn new_client(&self, config: DvidConfig, type_name: &str, instance: &str) -> DvidKvStore {
        let endpoint = config.endpoint();
        debug!(%endpoint, type_name, instance, "created dvidkv store");

        DvidKvStore {
            version: self.version.clone(),
            type_name: type_name.to_string(),
            instance: instance.to_string(),
            config,
            endpoint,
            storage_config: StorageConfig::default(),
        }
    }
}

impl StorageEngine for DvidKvEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn new_store(
        &self,
        config: &serde_json::Value,
        storage_config: StorageConfig,
        type_name: &str,
        instance: &str,
    ) -> StorageResult<Box<dyn Store>> {
        let config = DvidConfig::from_value(config)?;
        let store = self
            .new_client(config, type_name, instance)
            .with_storage_config(storage_config);
        Ok(Box::new(store))
    }
}

/// Store bound to one DVID key endpoint
#[derive(Debug, Clone)]
pub struct DvidKvStore {
    version: Version,
    type_name: String,
    instance: String,
    config: DvidConfig,
    endpoint: String,
    storage_config: StorageConfig,
}

impl DvidKvStore {
    /// Replace the transport configuration (timeout)
    pub fn with_storage_config(mut self, storage_config: StorageConfig) -> Self {
        self.storage_config = storage_config;
        self
    }

    /// URL every request of this store targets
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configuration the store was built from
    pub fn config(&self) -> &DvidConfig {
        &self.config
    }

    /// Transport configuration
    pub fn storage_config(&self) -> &StorageConfig {
        &self.storage_config
    }

    fn blocking_client(&self) -> StorageResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.storage_config.timeout)
            .build()
            .map_err(|e| self.transport_error(e))
    }

    #[cfg(feature = "async")]
    fn async_client(&self) -> StorageResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.storage_config.timeout)
            .build()
            .map_err(|e| self.transport_error(e))
    }

    fn request_error(&self, err: reqwest::Error) -> StorageError {
        StorageError::RequestConstruction {
            endpoint: self.endpoint.clone(),
            reason: err.to_string(),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> StorageError {
        StorageError::Transport {
            endpoint: self.endpoint.clone(),
            reason: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    fn body_error(&self, err: reqwest::Error) -> StorageError {
        StorageError::BodyRead {
            endpoint: self.endpoint.clone(),
            reason: err.to_string(),
        }
    }

    fn log_status(&self, operation: &str, status: reqwest::StatusCode) {
        if status.is_success() {
            debug!(operation, %status, "dvid responded");
        } else {
            warn!(operation, %status, endpoint = %self.endpoint, "dvid responded with non-success status");
        }
    }
}

impl SimpleStore for DvidKvStore {
    fn database(&self) -> StorageResult<(String, String)> {
        Ok((self.config.server.clone(), NAME.to_string()))
    }

    fn version_string(&self) -> StorageResult<String> {
        Ok(self.version.to_string())
    }

    fn datasets(&self) -> StorageResult<BTreeMap<String, DatasetInfo>> {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            self.config.dataset.clone(),
            DatasetInfo {
                branch: self.config.branch.clone(),
                instance: self.config.instance.clone(),
            },
        );
        Ok(datasets)
    }

    fn instance(&self) -> &str {
        &self.instance
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl KeyValueSync for DvidKvStore {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, key = %bytes_to_hex(key), len = value.len()))]
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        off_runtime(|| {
            let client = self.blocking_client()?;
            let request = client
                .post(self.endpoint.as_str())
                .body(value.to_vec())
                .build()
                .map_err(|e| self.request_error(e))?;

            // The response is dropped on return, which releases the connection.
            let response = client.execute(request).map_err(|e| self.transport_error(e))?;
            self.log_status("put", response.status());
            Ok(())
        })
    }

    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, key = %bytes_to_hex(key)))]
    fn get(&self, key: &[u8]) -> StorageResult<Bytes> {
        off_runtime(|| {
            let client = self.blocking_client()?;
            let request = client
                .get(self.endpoint.as_str())
                .build()
                .map_err(|e| self.request_error(e))?;

            let response = client.execute(request).map_err(|e| self.transport_error(e))?;
            self.log_status("get", response.status());
            response.bytes().map_err(|e| self.body_error(e))
        })
    }
}

/// Run a blocking exchange where the blocking client may be built and dropped
///
/// `reqwest::blocking` panics when its client is dropped on a tokio runtime
/// thread, so inside a runtime the exchange moves to a scoped thread. The
/// calling thread still blocks until the exchange finishes.
fn off_runtime<T, F>(exchange: F) -> StorageResult<T>
where
    T: Send,
    F: FnOnce() -> StorageResult<T> + Send,
{
    #[cfg(feature = "async")]
    if tokio::runtime::Handle::try_current().is_ok() {
        let span = tracing::Span::current();
        return std::thread::scope(|scope| {
            scope
                .spawn(move || span.in_scope(exchange))
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        });
    }

    exchange()
}

#[cfg(feature = "async")]
impl KeyValue for DvidKvStore {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, key = %bytes_to_hex(key), len = value.len()))]
    async fn put(&self, key: &[u8], value: Bytes) -> StorageResult<()> {
        let client = self.async_client()?;
        let request = client
            .post(self.endpoint.as_str())
            .body(value)
            .build()
            .map_err(|e| self.request_error(e))?;

        let response = client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;
        self.log_status("put", response.status());
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, key = %bytes_to_hex(key)))]
    async fn get(&self, key: &[u8]) -> StorageResult<Bytes> {
        let client = self.async_client()?;
        let request = client
            .get(self.endpoint.as_str())
            .build()
            .map_err(|e| self.request_error(e))?;

        let response = client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;
        self.log_status("get", response.status());
        response.bytes().await.map_err(|e| self.body_error(e))
    }
}
