//! Server configuration.
//!
//! Read once at startup from a TOML file. Every field has a default, so an
//! empty file (or no file) yields a working in-memory server on port 8080.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! log_level = "info"
//!
//! [store]
//! backend = "sqlite"
//! path = "peruser.db"
//!
//! [bootstrap]
//! index = "root"
//! name = "root"
//! key = "0123456789abcdef0123456789abcdef01234567"
//!
//! [service]
//! name = "peruser"
//! version = "0.1.0"
//! description = "user directory"
//! ```

use std::path::{Path, PathBuf};

use peruser_core::{ApiKey, NewUser, UserIndex};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Configuration for the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Grant every request without consulting the store. Local development
    /// only; startup logs a warning when set.
    pub debug_bypass: bool,
    /// Record store backend.
    pub store: StoreConfig,
    /// Admin record to create on startup if its index is free.
    pub bootstrap: Option<BootstrapAdmin>,
    /// Descriptor served at `GET /service`. The route exists only when set.
    pub service: Option<ServiceDescriptor>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_level: "info".into(),
            debug_bypass: false,
            store: StoreConfig::default(),
            bootstrap: None,
            service: None,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which record store backs the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Nothing survives a restart.
    #[default]
    Memory,
    /// SQLite database file, created and migrated on open.
    Sqlite { path: PathBuf },
}

/// The first administrator.
///
/// Create is admin-only, so without this an empty store can never gain an
/// admin through the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub index: UserIndex,
    pub name: String,
    pub key: ApiKey,
}

impl BootstrapAdmin {
    pub fn to_new_user(&self) -> NewUser {
        NewUser::new(self.name.clone())
            .index(self.index.clone())
            .key(self.key.clone())
            .admin(true)
            .enabled(true)
    }
}

/// Static service descriptor readable by any enabled caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
