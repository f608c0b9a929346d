//! Infrastructure layer: persistence, configuration, and the service that
//! orchestrates domain rules against a store.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use service::{InventoryService, ServiceError};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError};
