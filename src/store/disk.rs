use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

/// Collection persisted in a fjall partition. Writes are synced before
/// returning so a later process sees them.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key)? else {
            debug!("MISS for key: {}", key);
            return Ok(None);
        };
        let entry: Entry = serde_json::from_slice(&raw)?;
        if let Some(expires_at) = entry.expires_at
            && SystemTime::now() > expires_at
        {
            debug!("Entry expired for key: {}", key);
            self.partition.remove(key)?;
            self.keyspace.persist(PersistMode::SyncAll)?;
            return Ok(None);
        }
        debug!("HIT for key: {}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("PUT for key: {}", key);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.partition.remove(key)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("REMOVE for key: {}", key);
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        if let Err(e) = self.write(key, value, ttl) {
            debug!("DiskCollection put error: {}", e);
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.delete(key) {
            debug!("DiskCollection remove error: {}", e);
        }
    }
}
