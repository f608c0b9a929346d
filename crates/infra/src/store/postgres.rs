//! Postgres-backed inventory store.
//!
//! One table, `inventory`, with primary key `(product_id, condition)`. The
//! condition column stores the upper-case wire spelling (`NEW`, `OPEN_BOX`,
//! `USED`) guarded by a CHECK constraint.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `AlreadyExists` | Concurrent create of the same key slipped past the existence check |
//! | Database (other) | Any other | `Storage` | Check constraint, connection reset, ... |
//! | PoolClosed / Other | N/A | `Storage` | Pool shut down, network errors |
//!
//! ## Filtering
//!
//! `find` compiles the filter's ordered predicate list into a single
//! `SELECT ... WHERE p1 AND p2 ...` with bound parameters, so the database
//! evaluates the conjunction directly.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use warehouse_core::Entity;
use warehouse_inventory::{Condition, InventoryFilter, InventoryKey, InventoryRecord, Predicate};

use super::{InventoryStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_create_inventory.sql");

const SELECT_COLUMNS: &str =
    "SELECT product_id, condition, quantity, restock_level, available FROM inventory";

/// Postgres-backed inventory store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; every statement runs
/// in its own implicit transaction.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", None, e))?;
        Ok(Self::new(pool))
    }

    /// Create the `inventory` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", None, e))?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), fields(key = %key), err)]
    async fn get(&self, key: InventoryKey) -> Result<Option<InventoryRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT product_id, condition, quantity, restock_level, available
            FROM inventory
            WHERE product_id = $1 AND condition = $2
            "#,
        )
        .bind(key.product_id)
        .bind(key.condition.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", Some(key), e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self, record), fields(key = %record.id()), err)]
    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let key = record.id();
        let row = sqlx::query(
            r#"
            INSERT INTO inventory (product_id, condition, quantity, restock_level, available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING product_id, condition, quantity, restock_level, available
            "#,
        )
        .bind(record.product_id)
        .bind(record.condition.as_str())
        .bind(record.quantity)
        .bind(record.restock_level)
        .bind(record.available)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", Some(key), e))?;

        record_from_row(&row)
    }

    #[instrument(skip(self, record), fields(key = %record.id()), err)]
    async fn update(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let key = record.id();
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = $3, restock_level = $4, available = $5
            WHERE product_id = $1 AND condition = $2
            RETURNING product_id, condition, quantity, restock_level, available
            "#,
        )
        .bind(record.product_id)
        .bind(record.condition.as_str())
        .bind(record.quantity)
        .bind(record.restock_level)
        .bind(record.available)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", Some(key), e))?;

        match row {
            Some(row) => record_from_row(&row),
            None => Err(StoreError::NotFound(key)),
        }
    }

    #[instrument(skip(self), fields(key = %key), err)]
    async fn delete(&self, key: InventoryKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM inventory WHERE product_id = $1 AND condition = $2")
            .bind(key.product_id)
            .bind(key.condition.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", Some(key), e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn find(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRecord>, StoreError> {
        let mut query = build_find_query(filter);
        let rows = query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", None, e))?;

        rows.iter().map(record_from_row).collect()
    }
}

/// Compile a filter into one compound `SELECT`.
fn build_find_query(filter: &InventoryFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(SELECT_COLUMNS);

    for (idx, predicate) in filter.predicates().into_iter().enumerate() {
        tracing::debug!(predicate = ?predicate, "applying inventory filter");
        qb.push(if idx == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Available(available) => {
                qb.push("available = ").push_bind(available);
            }
            Predicate::ProductId(product_id) => {
                qb.push("product_id = ").push_bind(product_id);
            }
            Predicate::Condition(condition) => {
                qb.push("condition = ").push_bind(condition.as_str());
            }
            Predicate::Quantity(quantity) => {
                qb.push("quantity = ").push_bind(quantity);
            }
            Predicate::QuantityRange { low, high } => {
                qb.push("quantity BETWEEN ")
                    .push_bind(low)
                    .push(" AND ")
                    .push_bind(high);
            }
            Predicate::RestockLevel(level) => {
                qb.push("restock_level = ").push_bind(level);
            }
        }
    }

    qb.push(" ORDER BY product_id, condition");
    qb
}

fn record_from_row(row: &PgRow) -> Result<InventoryRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Storage(format!("failed to decode inventory row: {e}"));

    let condition: String = row.try_get("condition").map_err(decode)?;
    let condition: Condition = condition
        .parse()
        .map_err(|e| StoreError::Storage(format!("failed to decode inventory row: {e}")))?;

    Ok(InventoryRecord {
        product_id: row.try_get("product_id").map_err(decode)?,
        condition,
        quantity: row.try_get("quantity").map_err(decode)?,
        restock_level: row.try_get("restock_level").map_err(decode)?,
        available: row.try_get("available").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, key: Option<InventoryKey>, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if let (Some("23505"), Some(key)) = (db_err.code().as_deref(), key) {
                // Unique violation on the primary key
                return StoreError::AlreadyExists(key);
            }
            StoreError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_selects_everything() {
        let qb = build_find_query(&InventoryFilter::default());
        assert_eq!(
            qb.sql(),
            "SELECT product_id, condition, quantity, restock_level, available FROM inventory \
             ORDER BY product_id, condition"
        );
    }

    #[test]
    fn predicates_become_one_conjunction_in_fixed_order() {
        let filter = InventoryFilter::from_params([
            ("restock_level", "0"),
            ("quantity_low", "2"),
            ("condition", "NEW"),
            ("available", "true"),
        ])
        .unwrap();
        let qb = build_find_query(&filter);
        assert_eq!(
            qb.sql(),
            "SELECT product_id, condition, quantity, restock_level, available FROM inventory \
             WHERE available = $1 AND condition = $2 AND quantity BETWEEN $3 AND $4 \
             AND restock_level = $5 ORDER BY product_id, condition"
        );
    }

    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "database error {}", self.code)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"inventory_pkey\""
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.code {
                "23505" => sqlx::error::ErrorKind::UniqueViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { code }))
    }

    #[test]
    fn unique_violation_on_a_keyed_write_is_already_exists() {
        let key = InventoryKey::new(1, Condition::New);
        let err = map_sqlx_error("insert", Some(key), db_error("23505"));
        assert!(matches!(err, StoreError::AlreadyExists(k) if k == key));
    }

    #[test]
    fn unique_violation_without_a_key_stays_a_storage_error() {
        let err = map_sqlx_error("find", None, db_error("23505"));
        assert!(matches!(err, StoreError::Storage(msg) if msg.contains("find")));

        let key = InventoryKey::new(1, Condition::New);
        let err = map_sqlx_error("insert", Some(key), db_error("23514"));
        assert!(matches!(err, StoreError::Storage(_)));

        let err = map_sqlx_error("get", Some(key), sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Storage(msg) if msg.contains("pool closed")));
    }

    /// Needs a reachable Postgres: `DATABASE_URL=... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn duplicate_insert_against_postgres_is_already_exists() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresInventoryStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();

        let record = InventoryRecord {
            product_id: 987_654_321,
            condition: Condition::Used,
            quantity: 3,
            restock_level: None,
            available: true,
        };
        let key = record.key();
        store.delete(key).await.unwrap();

        store.insert(record.clone()).await.unwrap();
        let err = store
            .insert(InventoryRecord {
                quantity: 99,
                ..record.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(k) if k == key));
        assert_eq!(store.get(key).await.unwrap(), Some(record));

        store.delete(key).await.unwrap();
    }

    #[test]
    fn schema_declares_composite_primary_key() {
        assert!(SCHEMA.contains("PRIMARY KEY (product_id, condition)"));
    }
}
