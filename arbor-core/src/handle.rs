//! Async facade over [`MetadataStore`].

use crate::error::{MetadataError, MetadataResult};
use crate::store::MetadataStore;
use std::sync::Arc;

/// Cloneable handle for async callers.
///
/// Store operations block on storage I/O, so each call runs on tokio's
/// blocking pool instead of a runtime worker.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<MetadataStore>,
}

impl StoreHandle {
    pub fn new(store: MetadataStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// The underlying store, for synchronous callers sharing this handle.
    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Runs `f` against the store on the blocking pool.
    pub async fn run<T, F>(&self, f: F) -> MetadataResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&MetadataStore) -> MetadataResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| MetadataError::TaskJoin(e.to_string()))?
    }
}
