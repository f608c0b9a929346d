use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use warehouse_core::Entity;
use warehouse_inventory::{InventoryFilter, InventoryKey, InventoryRecord};

use super::{InventoryStore, StoreError};

/// In-memory inventory table for tests/dev.
///
/// Keyed by `InventoryKey`, so iteration order matches the SQL store's
/// `ORDER BY product_id, condition`.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<BTreeMap<InventoryKey, InventoryRecord>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("inventory lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get(&self, key: InventoryKey) -> Result<Option<InventoryRecord>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&key).cloned())
    }

    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let key = record.id();
        if map.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        map.insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let key = record.id();
        match map.get_mut(&key) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound(key)),
        }
    }

    async fn delete(&self, key: InventoryKey) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&key).is_some())
    }

    async fn find(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRecord>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(filter.apply(map.values()))
    }
}
