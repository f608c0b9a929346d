use serde::Deserialize;

use warehouse_core::{DomainError, DomainResult};
use warehouse_inventory::{Condition, InventoryRecord, StockUpdate};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/inventory`.
///
/// `restock_level` may be omitted or `null`; `available` defaults to `false`.
#[derive(Debug, Deserialize)]
pub struct CreateInventoryRequest {
    pub product_id: i64,
    pub condition: Condition,
    pub quantity: i64,
    #[serde(default)]
    pub restock_level: Option<i64>,
    #[serde(default)]
    pub available: bool,
}

impl From<CreateInventoryRequest> for InventoryRecord {
    fn from(req: CreateInventoryRequest) -> Self {
        InventoryRecord {
            product_id: req.product_id,
            condition: req.condition,
            quantity: req.quantity,
            restock_level: req.restock_level,
            available: req.available,
        }
    }
}

/// Body of `PUT /api/inventory/{product_id}/condition/{condition}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInventoryRequest {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub restock_level: Option<i64>,
    #[serde(default)]
    pub added_amount: Option<i64>,
}

/// Query string of the update endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    pub added_amount: Option<String>,
}

impl UpdateQuery {
    /// `?added_amount=true|false`; absent means `false`.
    pub fn increment_mode(&self) -> DomainResult<bool> {
        match self.added_amount.as_deref() {
            None => Ok(false),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(DomainError::validation(format!(
                    "added_amount must be true or false, got '{raw}'"
                ))),
            },
        }
    }
}

pub fn resolve_update(query: &UpdateQuery, body: &UpdateInventoryRequest) -> DomainResult<StockUpdate> {
    StockUpdate::resolve(
        query.increment_mode()?,
        body.quantity,
        body.restock_level,
        body.added_amount,
    )
}

// -------------------------
// Response helpers
// -------------------------

pub fn location_for(record: &InventoryRecord) -> String {
    format!(
        "/api/inventory/{}/condition/{}",
        record.product_id, record.condition
    )
}
