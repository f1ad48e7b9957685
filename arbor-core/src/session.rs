//! Stale-configuration guard.
//!
//! A [`Session`] owns the storage collaborators together with the
//! configuration timestamp they were built against. The store keeps it
//! behind its single mutex, so a rebuild is never observed half-done.
//!
//! In-process tables have no backing store to reopen, so a configuration
//! change that keeps the memory backend revalidates the configuration but
//! keeps the existing tables. Their contents and id counter survive.

use crate::config::{BackendConfig, ConfigSource, DatabaseConfig};
use crate::error::{MetadataError, MetadataResult};
use arbor_storage::Tables;
use arbor_storage::sqlite::SqliteBackend;
use tracing::{debug, info, warn};

/// Collaborators bound to one configuration generation.
pub struct Session {
    initialized_at: u64,
    tables: Option<Tables>,
    backend: Option<BackendConfig>,
}

impl Session {
    /// An uninitialized session; the first [`ensure_fresh`] builds the tables.
    ///
    /// [`ensure_fresh`]: Session::ensure_fresh
    pub fn new() -> Self {
        Self {
            initialized_at: 0,
            tables: None,
            backend: None,
        }
    }

    /// Configuration timestamp the current tables were built against
    /// (0 before the first initialization).
    pub fn initialized_at(&self) -> u64 {
        self.initialized_at
    }

    pub fn is_initialized(&self) -> bool {
        self.tables.is_some()
    }

    /// Returns the tables, rebuilding them first if the configuration has
    /// changed since they were built.
    ///
    /// When nothing changed this is a single timestamp comparison. A failed
    /// rebuild keeps the old timestamp, so the next call retries.
    pub fn ensure_fresh(&mut self, source: &dyn ConfigSource) -> MetadataResult<&mut Tables> {
        let last_modified = source
            .last_modified()
            .map_err(|e| MetadataError::Initialization(format!("configuration unreachable: {e}")))?;

        if self.tables.is_none() || last_modified > self.initialized_at {
            let config = current_config(source)?;
            let keeps_memory = matches!(
                (&self.backend, &config.backend),
                (Some(BackendConfig::Memory), BackendConfig::Memory)
            );
            if keeps_memory && self.tables.is_some() {
                debug!(current = last_modified, "Configuration changed; keeping in-memory tables");
            } else {
                self.tables = Some(build_tables(&config)?);
                info!(
                    previous = self.initialized_at,
                    current = last_modified,
                    "Metadata store initialized against configuration"
                );
            }
            self.backend = Some(config.backend);
            self.initialized_at = last_modified;
        }

        self.tables
            .as_mut()
            .ok_or_else(|| MetadataError::Initialization("collaborators unavailable".into()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the configuration, rejecting legacy versions.
fn current_config(source: &dyn ConfigSource) -> MetadataResult<DatabaseConfig> {
    let legacy = source
        .detect_old_version()
        .map_err(|e| MetadataError::Initialization(format!("configuration unreachable: {e}")))?;
    if legacy {
        return Err(MetadataError::Initialization(
            "the store has not been provisioned for this version yet; run the admin setup before continuing"
                .into(),
        ));
    }
    source
        .database_config()
        .map_err(|e| MetadataError::Initialization(format!("configuration unreachable: {e}")))
}

fn build_tables(config: &DatabaseConfig) -> MetadataResult<Tables> {
    match &config.backend {
        BackendConfig::Memory => Ok(Tables::in_memory()),
        BackendConfig::Sqlite { path } => {
            let backend = SqliteBackend::open(path, &config.table_prefix).map_err(|e| {
                MetadataError::Initialization(format!("unable to open {}: {e}", path.display()))
            })?;
            backend.provision().map_err(|e| {
                MetadataError::Initialization(format!("unable to provision tables: {e}"))
            })?;
            if let Err(e) = backend.create_indexes() {
                warn!(error = %e, "Secondary index creation failed; continuing without indexes");
            }
            Ok(backend.tables())
        }
    }
}
