//! Inventory persistence abstractions.

use std::sync::Arc;

use async_trait::async_trait;

use warehouse_inventory::{InventoryFilter, InventoryKey, InventoryRecord};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Inventory {0} already exists.")]
    AlreadyExists(InventoryKey),
    #[error("Inventory {0}")]
    NotFound(InventoryKey),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Relational persistence interface for inventory records.
///
/// Implementations own primary-key enforcement: `insert` must fail with
/// `AlreadyExists` rather than overwrite, even under concurrent creates.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn get(&self, key: InventoryKey) -> Result<Option<InventoryRecord>, StoreError>;

    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError>;

    /// Overwrite the non-key columns of an existing record.
    async fn update(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, key: InventoryKey) -> Result<bool, StoreError>;

    /// Records matching every predicate of `filter`, ordered by key.
    async fn find(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRecord>, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn get(&self, key: InventoryKey) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(key).await
    }

    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        (**self).insert(record).await
    }

    async fn update(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        (**self).update(record).await
    }

    async fn delete(&self, key: InventoryKey) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }

    async fn find(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).find(filter).await
    }
}
