use core::str::FromStr;

use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, DomainResult, Entity};

/// Physical condition of the stocked units. Part of the primary key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    OpenBox,
    Used,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::New, Condition::OpenBox, Condition::Used];

    /// Wire / column spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "NEW",
            Condition::OpenBox => "OPEN_BOX",
            Condition::Used => "USED",
        }
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    /// Exact, case-sensitive match: `new` is not `NEW`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "invalid condition '{s}': expected one of NEW, OPEN_BOX, USED"
                ))
            })
    }
}

/// Composite primary key `(product_id, condition)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InventoryKey {
    pub product_id: i64,
    pub condition: Condition,
}

impl InventoryKey {
    pub fn new(product_id: i64, condition: Condition) -> Self {
        Self {
            product_id,
            condition,
        }
    }

    /// Parse a key from raw path segments.
    pub fn parse(product_id: &str, condition: &str) -> DomainResult<Self> {
        let product_id: i64 = product_id
            .parse()
            .map_err(|_| DomainError::invalid_id(format!("product_id '{product_id}' is not an integer")))?;
        if product_id < 0 {
            return Err(DomainError::invalid_id(format!(
                "product_id must be >= 0, got {product_id}"
            )));
        }
        let condition = condition
            .parse::<Condition>()
            .map_err(|e| DomainError::invalid_id(e.to_string()))?;
        Ok(Self::new(product_id, condition))
    }
}

impl core::fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.product_id, self.condition)
    }
}

/// One row of warehouse stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: i64,
    pub condition: Condition,
    pub quantity: i64,
    pub restock_level: Option<i64>,
    pub available: bool,
}

impl Entity for InventoryRecord {
    type Id = InventoryKey;

    fn id(&self) -> InventoryKey {
        self.key()
    }
}

impl InventoryRecord {
    pub fn key(&self) -> InventoryKey {
        InventoryKey::new(self.product_id, self.condition)
    }

    /// Check the record invariants.
    ///
    /// `restock_level` is only enforced for `NEW` stock; other conditions
    /// accept any value (including none).
    pub fn validate(&self) -> DomainResult<()> {
        let mut bad_fields: Vec<&'static str> = Vec::new();

        if self.product_id < 0 {
            bad_fields.push("product_id");
        }
        if self.quantity < 0 {
            bad_fields.push("quantity");
        }
        if self.condition == Condition::New && !matches!(self.restock_level, Some(level) if level >= 0) {
            bad_fields.push("restock_level");
        }

        if bad_fields.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "invalid inventory data: [{}]",
                bad_fields.join(", ")
            )))
        }
    }

    /// Apply a stock update atomically: on error the record is left untouched.
    pub fn apply_update(&mut self, update: &StockUpdate) -> DomainResult<()> {
        let mut next = self.clone();

        match *update {
            StockUpdate::Replace {
                quantity,
                restock_level,
            } => {
                if restock_level.is_some() && self.condition != Condition::New {
                    return Err(DomainError::validation(format!(
                        "restock_level can only be updated for NEW inventory, not {}",
                        self.condition
                    )));
                }
                next.quantity = quantity;
                if restock_level.is_some() {
                    next.restock_level = restock_level;
                }
            }
            StockUpdate::Increment { amount } => {
                if amount <= 0 {
                    return Err(DomainError::validation(format!(
                        "added amount must be positive, got {amount}"
                    )));
                }
                next.quantity = self
                    .quantity
                    .checked_add(amount)
                    .ok_or_else(|| DomainError::validation("quantity overflow"))?;
            }
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn activate(&mut self) -> DomainResult<()> {
        if self.available {
            return Err(DomainError::conflict(format!(
                "Inventory {} is already available.",
                self.key()
            )));
        }
        self.available = true;
        Ok(())
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        if !self.available {
            return Err(DomainError::conflict(format!(
                "Inventory {} is already unavailable.",
                self.key()
            )));
        }
        self.available = false;
        Ok(())
    }
}

/// How an update request changes the stock level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockUpdate {
    /// Overwrite quantity (and restock level, when given).
    Replace {
        quantity: i64,
        restock_level: Option<i64>,
    },
    /// Add a positive amount to the current quantity. Restock level is untouched.
    Increment { amount: i64 },
}

impl StockUpdate {
    /// Resolve the update mode from the `added_amount` flag and the body fields.
    ///
    /// In increment mode the amount comes from `added_amount`, or from
    /// `quantity` for clients that send the delta there. Giving both is
    /// ambiguous and rejected, as is any increment outside increment mode.
    pub fn resolve(
        increment_mode: bool,
        quantity: Option<i64>,
        restock_level: Option<i64>,
        added_amount: Option<i64>,
    ) -> DomainResult<Self> {
        if increment_mode {
            if restock_level.is_some() {
                return Err(DomainError::validation(
                    "restock_level cannot be changed while adding to quantity",
                ));
            }
            let amount = match (quantity, added_amount) {
                (Some(_), Some(_)) => {
                    return Err(DomainError::validation(
                        "supply either quantity or added_amount, not both",
                    ));
                }
                (Some(amount), None) | (None, Some(amount)) => amount,
                (None, None) => {
                    return Err(DomainError::validation("missing amount to add to quantity"));
                }
            };
            return Ok(StockUpdate::Increment { amount });
        }

        if added_amount.is_some() {
            return Err(DomainError::validation(
                "added_amount conflicts with an absolute quantity update; pass ?added_amount=true",
            ));
        }
        let quantity = quantity.ok_or_else(|| DomainError::validation("missing quantity"))?;
        Ok(StockUpdate::Replace {
            quantity,
            restock_level,
        })
    }
}
