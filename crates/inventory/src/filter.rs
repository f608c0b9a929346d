//! Multi-predicate query composer.
//!
//! Turns the optional list filters of `GET /api/inventory` into an ordered
//! list of [`Predicate`]s. Stores evaluate the conjunction of that list in a
//! single pass (in memory) or a single `WHERE ... AND ...` query (SQL); the
//! ordering is fixed so traces and generated SQL are reproducible.

use std::collections::HashSet;

use warehouse_core::{DomainError, DomainResult};

use crate::record::{Condition, InventoryRecord};

pub const PRODUCT_ID: &str = "product_id";
pub const CONDITION: &str = "condition";
pub const QUANTITY: &str = "quantity";
pub const QUANTITY_LOW: &str = "quantity_low";
pub const QUANTITY_HIGH: &str = "quantity_high";
pub const RESTOCK_LEVEL: &str = "restock_level";
pub const AVAILABLE: &str = "available";

/// A single filter clause.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Predicate {
    Available(bool),
    ProductId(i64),
    Condition(Condition),
    Quantity(i64),
    /// Inclusive on both ends.
    QuantityRange { low: i64, high: i64 },
    RestockLevel(i64),
}

impl Predicate {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match *self {
            Predicate::Available(available) => record.available == available,
            Predicate::ProductId(product_id) => record.product_id == product_id,
            Predicate::Condition(condition) => record.condition == condition,
            Predicate::Quantity(quantity) => record.quantity == quantity,
            Predicate::QuantityRange { low, high } => (low..=high).contains(&record.quantity),
            Predicate::RestockLevel(level) => record.restock_level == Some(level),
        }
    }
}

/// Parsed list filters. `None` means "not supplied"; `Some(0)` is a real filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub available: Option<bool>,
    pub product_id: Option<i64>,
    pub condition: Option<Condition>,
    pub quantity: Option<i64>,
    pub quantity_low: Option<i64>,
    pub quantity_high: Option<i64>,
    pub restock_level: Option<i64>,
}

impl InventoryFilter {
    /// Parse raw query-string pairs.
    ///
    /// Every key must be recognised and appear at most once; values must parse
    /// as the filter's type. Any violation rejects the whole request.
    pub fn from_params<I, K, V>(params: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = InventoryFilter::default();
        let mut seen: HashSet<String> = HashSet::new();

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.as_ref();

            if !seen.insert(key.to_string()) {
                return Err(DomainError::validation(format!(
                    "query parameter '{key}' supplied more than once"
                )));
            }

            match key {
                AVAILABLE => filter.available = Some(parse_bool(key, value)?),
                PRODUCT_ID => filter.product_id = Some(parse_int(key, value)?),
                CONDITION => filter.condition = Some(value.parse()?),
                QUANTITY => filter.quantity = Some(parse_int(key, value)?),
                QUANTITY_LOW => filter.quantity_low = Some(parse_int(key, value)?),
                QUANTITY_HIGH => filter.quantity_high = Some(parse_int(key, value)?),
                RESTOCK_LEVEL => filter.restock_level = Some(parse_int(key, value)?),
                other => {
                    return Err(DomainError::validation(format!(
                        "unrecognized query parameter '{other}'"
                    )));
                }
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Supplied filters, in application order:
    /// available, product_id, condition, quantity, quantity range, restock_level.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::with_capacity(6);

        if let Some(available) = self.available {
            out.push(Predicate::Available(available));
        }
        if let Some(product_id) = self.product_id {
            out.push(Predicate::ProductId(product_id));
        }
        if let Some(condition) = self.condition {
            out.push(Predicate::Condition(condition));
        }
        if let Some(quantity) = self.quantity {
            out.push(Predicate::Quantity(quantity));
        }
        if self.quantity_low.is_some() || self.quantity_high.is_some() {
            out.push(Predicate::QuantityRange {
                low: self.quantity_low.unwrap_or(i64::MIN),
                high: self.quantity_high.unwrap_or(i64::MAX),
            });
        }
        if let Some(level) = self.restock_level {
            out.push(Predicate::RestockLevel(level));
        }

        out
    }

    /// Evaluate the filter over a collection in one pass.
    pub fn apply<'a, I>(&self, records: I) -> Vec<InventoryRecord>
    where
        I: IntoIterator<Item = &'a InventoryRecord>,
    {
        let predicates = self.predicates();
        for p in &predicates {
            tracing::debug!(predicate = ?p, "applying inventory filter");
        }

        records
            .into_iter()
            .filter(|r| predicates.iter().all(|p| p.matches(r)))
            .cloned()
            .collect()
    }
}

fn parse_int(key: &str, value: &str) -> DomainResult<i64> {
    value
        .parse()
        .map_err(|_| DomainError::validation(format!("{key} must be an integer, got '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> DomainResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DomainError::validation(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}
