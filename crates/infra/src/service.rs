//! Inventory use cases (application-level orchestration).
//!
//! Every mutating operation follows the same read-modify-write shape:
//!
//! ```text
//! request
//!   ↓
//! 1. Load the record by key (NotFound if absent)
//!   ↓
//! 2. Apply the domain rule (pure, may reject with Validation / Conflict)
//!   ↓
//! 3. Persist through the injected store (one statement)
//! ```
//!
//! The store is a constructor argument; nothing here holds global state.

use tracing::{debug, info};

use warehouse_core::{DomainError, Entity};
use warehouse_inventory::{InventoryFilter, InventoryKey, InventoryRecord, StockUpdate};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed input or business-rule violation.
    #[error("{0}")]
    Validation(String),
    /// No record for the addressed key.
    #[error("{0} not found")]
    NotFound(String),
    /// Duplicate key or redundant state change.
    #[error("{0}")]
    Conflict(String),
    /// The store failed for reasons unrelated to the request.
    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(format!("invalid identifier: {msg}")),
            DomainError::NotFound(what) => ServiceError::NotFound(what),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists(key) => {
                ServiceError::Conflict(format!("Inventory {key} already exists."))
            }
            StoreError::NotFound(key) => ServiceError::NotFound(format!("Inventory {key}")),
            StoreError::Storage(_) => ServiceError::Store(value),
        }
    }
}

/// Inventory operations over an injected store.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    /// Records matching every supplied filter (all records for an empty filter).
    pub async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRecord>, ServiceError> {
        if filter.is_empty() {
            debug!("Processing all inventories");
        } else {
            debug!(?filter, "Processing filtered inventory lookup");
        }
        Ok(self.store.find(filter).await?)
    }

    pub async fn get(&self, key: InventoryKey) -> Result<InventoryRecord, ServiceError> {
        debug!(%key, "Processing lookup for inventory");
        let record = self.store.get(key).await?;
        record.ok_or_else(|| DomainError::not_found(format!("Inventory {key}")).into())
    }

    /// Validate and store a new record.
    ///
    /// The existence check is advisory; the store's key constraint decides a
    /// race between concurrent creates, and either path yields `Conflict`.
    pub async fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, ServiceError> {
        record.validate()?;
        let key = record.id();

        if self.store.get(key).await?.is_some() {
            return Err(ServiceError::Conflict(format!("Inventory {key} already exists.")));
        }

        let created = self.store.insert(record).await?;
        info!("Inventory {key} created.");
        Ok(created)
    }

    pub async fn update(&self, key: InventoryKey, update: StockUpdate) -> Result<InventoryRecord, ServiceError> {
        let mut record = self.get(key).await?;
        record.apply_update(&update)?;
        let updated = self.store.update(record).await?;
        info!(?update, "Inventory {key} updated.");
        Ok(updated)
    }

    /// Remove a record. Deleting an absent record is not an error.
    pub async fn delete(&self, key: InventoryKey) -> Result<(), ServiceError> {
        if self.store.delete(key).await? {
            info!("Inventory {key} deleted.");
        } else {
            debug!("Inventory {key} already absent.");
        }
        Ok(())
    }

    pub async fn activate(&self, key: InventoryKey) -> Result<InventoryRecord, ServiceError> {
        let mut record = self.get(key).await?;
        record.activate()?;
        let updated = self.store.update(record).await?;
        info!("Inventory {key} is activated!");
        Ok(updated)
    }

    pub async fn deactivate(&self, key: InventoryKey) -> Result<InventoryRecord, ServiceError> {
        let mut record = self.get(key).await?;
        record.deactivate()?;
        let updated = self.store.update(record).await?;
        info!("Inventory {key} is deactivated!");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryInventoryStore;
    use warehouse_inventory::Condition;

    fn setup() -> InventoryService<Arc<InMemoryInventoryStore>> {
        InventoryService::new(Arc::new(InMemoryInventoryStore::new()))
    }

    fn new_record(product_id: i64, quantity: i64, available: bool) -> InventoryRecord {
        InventoryRecord {
            product_id,
            condition: Condition::New,
            quantity,
            restock_level: Some(2),
            available,
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() {
        let svc = setup();
        let record = new_record(1, 10, true);
        let created = svc.create(record.clone()).await.unwrap();
        assert_eq!(created, record);
        assert_eq!(svc.get(record.key()).await.unwrap(), record);
    }

    #[tokio::test]
    async fn create_rejects_invalid_record_before_touching_store() {
        let svc = setup();
        let mut record = new_record(1, 10, true);
        record.restock_level = None;
        let err = svc.create(record).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.store().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_original() {
        let svc = setup();
        svc.create(new_record(1, 10, true)).await.unwrap();
        let err = svc.create(new_record(1, 99, false)).await.unwrap_err();
        match err {
            ServiceError::Conflict(msg) => assert_eq!(msg, "Inventory (1, NEW) already exists."),
            other => panic!("Expected Conflict, got {other:?}"),
        }
        let kept = svc.get(InventoryKey::new(1, Condition::New)).await.unwrap();
        assert_eq!(kept.quantity, 10);
    }

    #[tokio::test]
    async fn store_level_duplicate_maps_to_conflict() {
        let err: ServiceError = StoreError::AlreadyExists(InventoryKey::new(3, Condition::Used)).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_creates_have_one_winner() {
        let svc = setup();
        let mut set = tokio::task::JoinSet::new();
        for quantity in 0..16 {
            let svc = svc.clone();
            set.spawn(async move { svc.create(new_record(1, quantity, true)).await });
        }

        let mut winners = Vec::new();
        let mut conflicts = 0;
        while let Some(joined) = set.join_next().await {
            match joined.unwrap() {
                Ok(created) => winners.push(created),
                Err(ServiceError::Conflict(msg)) => {
                    assert_eq!(msg, "Inventory (1, NEW) already exists.");
                    conflicts += 1;
                }
                Err(other) => panic!("Expected Conflict, got {other:?}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(conflicts, 15);
        assert_eq!(svc.store().len(), 1);
        let stored = svc.get(InventoryKey::new(1, Condition::New)).await.unwrap();
        assert_eq!(stored, winners[0]);
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let svc = setup();
        let err = svc
            .update(InventoryKey::new(5, Condition::Used), StockUpdate::Increment { amount: 1 })
            .await
            .unwrap_err();
        match err {
            ServiceError::NotFound(what) => assert_eq!(what, "Inventory (5, USED)"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_persists_increment() {
        let svc = setup();
        let key = svc.create(new_record(1, 10, true)).await.unwrap().key();
        let updated = svc.update(key, StockUpdate::Increment { amount: 5 }).await.unwrap();
        assert_eq!(updated.quantity, 15);
        assert_eq!(svc.get(key).await.unwrap().quantity, 15);
    }

    #[tokio::test]
    async fn rejected_update_leaves_stored_record_unchanged() {
        let svc = setup();
        let key = svc.create(new_record(1, 10, true)).await.unwrap().key();
        let err = svc
            .update(
                key,
                StockUpdate::Replace {
                    quantity: -4,
                    restock_level: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get(key).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let svc = setup();
        let key = svc.create(new_record(1, 10, true)).await.unwrap().key();
        svc.delete(key).await.unwrap();
        svc.delete(key).await.unwrap();
        assert!(matches!(svc.get(key).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn redundant_activation_conflicts() {
        let svc = setup();
        let key = svc.create(new_record(1, 10, false)).await.unwrap().key();

        assert!(matches!(svc.deactivate(key).await, Err(ServiceError::Conflict(_))));
        assert!(svc.activate(key).await.unwrap().available);
        assert!(matches!(svc.activate(key).await, Err(ServiceError::Conflict(_))));
        assert!(!svc.deactivate(key).await.unwrap().available);
    }

    #[tokio::test]
    async fn list_applies_filter_through_store() {
        let svc = setup();
        svc.create(new_record(1, 5, true)).await.unwrap();
        svc.create(InventoryRecord {
            product_id: 1,
            condition: Condition::Used,
            quantity: 5,
            restock_level: None,
            available: false,
        })
        .await
        .unwrap();
        svc.create(new_record(2, 5, true)).await.unwrap();

        let filter = InventoryFilter::from_params([("product_id", "1"), ("available", "true")]).unwrap();
        let found = svc.list(&filter).await.unwrap();
        assert_eq!(found, vec![new_record(1, 5, true)]);

        let all = svc.list(&InventoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
