//! Backing configuration and the sources that supply it.
//!
//! The store never reads configuration directly. It asks a [`ConfigSource`]
//! for a modification timestamp on every call and only re-reads the
//! [`DatabaseConfig`] when that timestamp moves past the one it last
//! initialized against.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::UNIX_EPOCH;
use thiserror::Error;

/// Current configuration format version. Anything older is legacy and must
/// be migrated by an operator before the store can start.
pub const CONFIG_VERSION: u32 = 1;

/// Table prefix used when the configuration does not name one.
pub const DEFAULT_TABLE_PREFIX: &str = "arbor";

/// Result type for configuration reads.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the store's tables live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Format version; a missing field reads as 0 (legacy).
    #[serde(default)]
    pub version: u32,
    pub backend: BackendConfig,
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

fn default_table_prefix() -> String {
    DEFAULT_TABLE_PREFIX.to_string()
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-process tables. Kept across configuration changes that stay on
    /// this backend; lost when the process exits or the backend changes.
    Memory,
    /// A SQLite database file.
    Sqlite { path: PathBuf },
}

impl DatabaseConfig {
    /// Current-version config using in-process tables.
    pub fn memory() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendConfig::Memory,
            table_prefix: default_table_prefix(),
        }
    }

    /// Current-version config using a SQLite file.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendConfig::Sqlite { path: path.into() },
            table_prefix: default_table_prefix(),
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Whether this config predates [`CONFIG_VERSION`].
    pub fn is_legacy(&self) -> bool {
        self.version < CONFIG_VERSION
    }
}

/// Supplies configuration and change detection to the store.
pub trait ConfigSource: Send + Sync {
    /// Monotonic "last externally modified" marker.
    fn last_modified(&self) -> ConfigResult<u64>;

    /// True if the configuration is in a legacy, unsupported format.
    fn detect_old_version(&self) -> ConfigResult<bool>;

    /// The configuration to initialize against.
    fn database_config(&self) -> ConfigResult<DatabaseConfig>;
}

/// Configuration read from a JSON file.
///
/// The file's mtime (milliseconds) is the modification marker. A relative
/// SQLite path is resolved against the directory holding the file.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `config` to `path` as pretty-printed JSON.
    pub fn write(path: &Path, config: &DatabaseConfig) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn read(&self) -> ConfigResult<DatabaseConfig> {
        let raw = std::fs::read_to_string(&self.path)?;
        let mut config: DatabaseConfig = serde_json::from_str(&raw)?;
        if let BackendConfig::Sqlite { path } = &mut config.backend {
            if path.is_relative() {
                if let Some(dir) = self.path.parent() {
                    *path = dir.join(&*path);
                }
            }
        }
        Ok(config)
    }
}

impl ConfigSource for FileConfigSource {
    fn last_modified(&self) -> ConfigResult<u64> {
        let modified = std::fs::metadata(&self.path)?.modified()?;
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        // Zero is the "never initialized" marker of a session.
        Ok(millis.max(1))
    }

    fn detect_old_version(&self) -> ConfigResult<bool> {
        Ok(self.read()?.is_legacy())
    }

    fn database_config(&self) -> ConfigResult<DatabaseConfig> {
        self.read()
    }
}

/// Configuration held in memory, for embedding and tests.
#[derive(Debug)]
pub struct MemoryConfigSource {
    modified: AtomicU64,
    config: RwLock<DatabaseConfig>,
}

impl MemoryConfigSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            modified: AtomicU64::new(1),
            config: RwLock::new(config),
        }
    }

    /// Marks the configuration as modified without changing it.
    pub fn touch(&self) {
        self.modified.fetch_add(1, Ordering::SeqCst);
    }

    /// Swaps in a new configuration and marks it modified.
    pub fn replace(&self, config: DatabaseConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        self.touch();
    }
}

impl ConfigSource for MemoryConfigSource {
    fn last_modified(&self) -> ConfigResult<u64> {
        Ok(self.modified.load(Ordering::SeqCst))
    }

    fn detect_old_version(&self) -> ConfigResult<bool> {
        Ok(self.database_config()?.is_legacy())
    }

    fn database_config(&self) -> ConfigResult<DatabaseConfig> {
        Ok(self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
