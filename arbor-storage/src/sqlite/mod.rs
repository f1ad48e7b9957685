//! SQLite-backed storage collaborators.
//!
//! All four tables share one connection guarded by a mutex, so a
//! [`SqliteBackend`] can hand out [`Tables`] whose members stay consistent
//! with each other.

mod adjacency;
mod attributes;
mod registry;

pub use adjacency::SqliteAdjacencyTable;
pub use attributes::SqliteAttributeTable;
pub use registry::SqliteRegistry;

use crate::{Namespace, StorageError, StorageResult, Tables};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Upper bound on bound parameters per statement; batch reads are chunked.
const MAX_BATCH: usize = 500;

/// Physical table names derived from a validated prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub manifest: String,
    pub meta_public: String,
    pub meta_private: String,
    pub hierarchy: String,
}

impl TableNames {
    /// Derives table names from `prefix`.
    ///
    /// The prefix is spliced into SQL, so it must be a plain ASCII
    /// identifier: a letter or underscore followed by letters, digits or
    /// underscores.
    pub fn new(prefix: &str) -> StorageResult<Self> {
        let mut chars = prefix.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if !valid {
            return Err(StorageError::InvalidIdentifier(prefix.to_string()));
        }
        Ok(Self {
            manifest: format!("{prefix}_manifest"),
            meta_public: format!("{prefix}_{}", Namespace::Public.table_suffix()),
            meta_private: format!("{prefix}_{}", Namespace::Private.table_suffix()),
            hierarchy: format!("{prefix}_hierarchy"),
        })
    }

    pub fn attributes(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Public => &self.meta_public,
            Namespace::Private => &self.meta_private,
        }
    }
}

/// An open SQLite database holding one arbor table set.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    names: TableNames,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path`.
    ///
    /// Only the connection is established here; call [`provision`] before
    /// using the tables.
    ///
    /// [`provision`]: SqliteBackend::provision
    pub fn open(path: &Path, prefix: &str) -> StorageResult<Self> {
        let names = TableNames::new(prefix)?;
        let conn = Connection::open(path)?;
        Self::from_connection(conn, names)
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory(prefix: &str) -> StorageResult<Self> {
        let names = TableNames::new(prefix)?;
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, names)
    }

    fn from_connection(conn: Connection, names: TableNames) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            names,
        })
    }

    pub fn names(&self) -> &TableNames {
        &self.names
    }

    /// Creates the four tables if they do not exist yet.
    ///
    /// Both attribute tables reference the manifest, so attribute rows can
    /// only exist for registered ids.
    pub fn provision(&self) -> StorageResult<()> {
        let TableNames {
            manifest,
            meta_public,
            meta_private,
            hierarchy,
        } = &self.names;
        let conn = lock(&self.conn);
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {manifest} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_id INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {meta_public} (
                id INTEGER NOT NULL REFERENCES {manifest}(id),
                property TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (id, property)
            );

            CREATE TABLE IF NOT EXISTS {meta_private} (
                id INTEGER NOT NULL REFERENCES {manifest}(id),
                property TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (id, property)
            );

            CREATE TABLE IF NOT EXISTS {hierarchy} (
                parent_id INTEGER NOT NULL,
                child_id INTEGER NOT NULL,
                sort_order INTEGER NOT NULL
            );
            "
        ))?;
        debug!(prefix = %manifest, "Provisioned metadata tables");
        Ok(())
    }

    /// Creates the secondary lookup indexes.
    ///
    /// Only speeds up reverse lookups and child listing; the tables work
    /// without them.
    pub fn create_indexes(&self) -> StorageResult<()> {
        let TableNames {
            manifest,
            meta_public,
            meta_private,
            hierarchy,
        } = &self.names;
        let conn = lock(&self.conn);
        conn.execute_batch(&format!(
            "
            CREATE INDEX IF NOT EXISTS {manifest}_type ON {manifest} (type_id);
            CREATE INDEX IF NOT EXISTS {meta_public}_property_value ON {meta_public} (property, value);
            CREATE INDEX IF NOT EXISTS {meta_private}_property_value ON {meta_private} (property, value);
            CREATE INDEX IF NOT EXISTS {hierarchy}_parent ON {hierarchy} (parent_id, sort_order);
            CREATE INDEX IF NOT EXISTS {hierarchy}_child ON {hierarchy} (child_id);
            "
        ))?;
        Ok(())
    }

    /// Builds the collaborator set sharing this connection.
    pub fn tables(&self) -> Tables {
        Tables {
            registry: Box::new(SqliteRegistry::new(
                Arc::clone(&self.conn),
                self.names.manifest.clone(),
            )),
            public: Box::new(SqliteAttributeTable::new(
                Arc::clone(&self.conn),
                Namespace::Public,
                self.names.meta_public.clone(),
            )),
            private: Box::new(SqliteAttributeTable::new(
                Arc::clone(&self.conn),
                Namespace::Private,
                self.names.meta_private.clone(),
            )),
            hierarchy: Box::new(SqliteAdjacencyTable::new(
                Arc::clone(&self.conn),
                self.names.hierarchy.clone(),
            )),
        }
    }
}

/// Locks the shared connection.
///
/// A panic while the lock was held leaves SQLite itself consistent (each
/// statement is atomic), so a poisoned mutex is simply taken over.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `?, ?, ?` with `n` placeholders.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
