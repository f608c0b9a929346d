//! Inventory domain module.
//!
//! This crate contains the business rules for warehouse inventory records,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//!
//! - `record`: the `(product_id, condition)`-keyed record, its invariants and mutations
//! - `filter`: the multi-predicate query composer used by every store

pub mod filter;
pub mod record;

pub use filter::{InventoryFilter, Predicate};
pub use record::{Condition, InventoryKey, InventoryRecord, StockUpdate};
