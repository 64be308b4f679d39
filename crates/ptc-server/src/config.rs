use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ptc_store::{StoreOptions, DEFAULT_CACHE_TTL};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable naming the datastore emulator.
pub const EMULATOR_HOST_VAR: &str = "DATASTORE_EMULATOR_HOST";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub datastore: DatastoreConfig,
    /// Run against a local emulator; requires [`EMULATOR_HOST_VAR`].
    pub use_emulator: bool,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: Option<u64>,
    /// JSON conference configuration stored at startup, replacing the
    /// stored one. Required to start on an empty datastore.
    pub configuration: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            datastore: DatastoreConfig::Memory,
            use_emulator: false,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            request_timeout_secs: None,
            configuration: None,
        }
    }
}

/// Datastore backend selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatastoreConfig {
    /// Ephemeral; contents are lost on exit.
    Memory,
    /// Durable commit log at `path`.
    Log { path: PathBuf },
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..StoreOptions::default()
        }
    }

    /// Check the emulator setting against the emulator host from the
    /// environment. Returns the host to keep; `None` means it must be
    /// cleared so production never talks to an emulator by accident.
    pub fn emulator_host(&self, host: Option<String>) -> ServerResult<Option<String>> {
        match (self.use_emulator, host) {
            (true, Some(host)) if !host.is_empty() => Ok(Some(host)),
            (true, _) => Err(ServerError::Config(format!(
                "emulator requested but {EMULATOR_HOST_VAR} is not set"
            ))),
            (false, _) => Ok(None),
        }
    }
}
