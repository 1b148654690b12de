pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::warn;

/// Hands out named collections, persisted when a keyspace is available.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens a store under `data_path`. Falls back to memory-only
    /// collections if the keyspace cannot be opened.
    pub fn open(data_path: &Path) -> Self {
        let keyspace = match fjall::Config::new(data_path.join("store")).open() {
            Ok(keyspace) => Some(keyspace),
            Err(e) => {
                warn!(error = %e, path = %data_path.display(), "Could not open data store");
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    pub fn get_collection(&self, name: &str) -> Arc<dyn KeyValueCollection> {
        if let Some(collection) = self
            .collections
            .read()
            .ok()
            .and_then(|collections| collections.get(name).cloned())
        {
            return collection;
        }

        let collection: Arc<dyn KeyValueCollection> = self
            .keyspace
            .as_ref()
            .and_then(|ks| {
                ks.open_partition(name, PartitionCreateOptions::default())
                    .inspect_err(|e| warn!(error = %e, name, "Could not open partition"))
                    .ok()
                    .map(|partition| {
                        Arc::new(DiskCollection::new(ks.clone(), partition))
                            as Arc<dyn KeyValueCollection>
                    })
            })
            .unwrap_or_else(|| Arc::new(MemoryCollection::new()));

        if let Ok(mut collections) = self.collections.write() {
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&collection))
                .clone()
        } else {
            collection
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collections_are_shared_by_name() {
        let store = KeyValueStore::in_memory();
        let a = store.get_collection("session");
        let b = store.get_collection("session");

        a.put("k", b"v", None).await;
        assert_eq!(b.get("k").await, Some(b"v".to_vec()));
        assert!(store.get_collection("other").get("k").await.is_none());
    }
}
