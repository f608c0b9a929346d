use std::sync::Arc;

use anyhow::Context;

use warehouse_infra::{
    InMemoryInventoryStore, InventoryService, InventoryStore, PostgresInventoryStore, StorageConfig,
};

/// Handle injected into every handler. Holds the only shared mutable resource (the store).
#[derive(Clone)]
pub struct AppServices {
    inventory: InventoryService<Arc<dyn InventoryStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            inventory: InventoryService::new(store),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }

    pub fn inventory(&self) -> &InventoryService<Arc<dyn InventoryStore>> {
        &self.inventory
    }
}

pub async fn build_services(storage: &StorageConfig) -> anyhow::Result<AppServices> {
    match storage {
        StorageConfig::InMemory => {
            tracing::warn!("USE_PERSISTENT_STORES not enabled; inventory is kept in memory only");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(max_connections, "Initializing database");
            let store = PostgresInventoryStore::connect(database_url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to create inventory table")?;
            Ok(AppServices::new(Arc::new(store)))
        }
    }
}
