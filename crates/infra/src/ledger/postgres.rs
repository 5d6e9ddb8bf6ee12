//! Postgres-backed ledger store.
//!
//! Each mutation runs in one transaction: the scoped row is locked with
//! `SELECT ... FOR UPDATE`, changed, and the audit row is inserted before
//! commit. A failed audit insert rolls the mutation back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database / PoolClosed / Io / other | `Database` |
//! | Row decode (`ColumnDecode`, bad `action`) | `CorruptRow` |
//!
//! `Rejected` is not a SQLx error: it carries the domain error raised while
//! applying an update to the locked row, after which the transaction is
//! rolled back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use fieldtrack_core::OwnerId;
use fieldtrack_inventory::{
    AuditAction, AuditEntry, AuditEntryId, InventoryItem, InventoryItemId, ItemUpdate, ListFilter, NewItem,
};

use super::store::{LedgerStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_inventory_ledger.sql");

const ITEM_COLUMNS: &str =
    "id, name, quantity, unit, unit_cost, location, low_stock_alert, notes, created, owner_id";

/// Postgres ledger store.
///
/// Every query filters on `owner_id`, so rows of other owners (and rows with
/// a NULL owner) are unreachable through this type.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Create the ledger tables if missing. Safe to run on every start.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, item), fields(owner_id = %item.owner_id, item_id = tracing::field::Empty), err)]
    async fn insert(&self, item: NewItem, at: DateTime<Utc>) -> Result<(InventoryItem, AuditEntry), StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO inventory_item (
                name, quantity, unit, unit_cost, location, low_stock_alert, notes, created, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_cost)
        .bind(&item.location)
        .bind(item.low_stock_alert)
        .bind(&item.notes)
        .bind(at)
        .bind(item.owner_id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| corrupt("inventory_item", e))?;
        let id = InventoryItemId::new(id);
        let owner = item.owner_id;

        let entry = insert_audit(&mut tx, id, AuditAction::Create, owner, at).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("item_id", id.get());
        Ok((item.into_item(id, at), entry))
    }

    #[instrument(skip(self, update), fields(item_id = %id, owner_id = %owner), err)]
    async fn update(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        update: &ItemUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<(InventoryItem, AuditEntry)>, StoreError> {
        let mut tx = self.begin().await?;

        let Some(mut item) = lock_scoped(&mut tx, id, owner).await? else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };

        if let Err(err) = update.apply(&mut item) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Rejected(err));
        }

        sqlx::query(
            r#"
            UPDATE inventory_item
            SET name = $3,
                quantity = $4,
                unit = $5,
                unit_cost = $6,
                location = $7,
                low_stock_alert = $8,
                notes = $9
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_cost)
        .bind(&item.location)
        .bind(item.low_stock_alert)
        .bind(&item.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        let entry = insert_audit(&mut tx, id, AuditAction::Update, owner, at).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Some((item, entry)))
    }

    #[instrument(skip(self), fields(item_id = %id, owner_id = %owner), err)]
    async fn delete(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        at: DateTime<Utc>,
    ) -> Result<Option<AuditEntry>, StoreError> {
        let mut tx = self.begin().await?;

        if lock_scoped(&mut tx, id, owner).await?.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM inventory_item WHERE id = $1 AND owner_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        let entry = insert_audit(&mut tx, id, AuditAction::Delete, owner, at).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Some(entry))
    }

    #[instrument(skip(self), fields(item_id = %id, owner_id = %owner), err)]
    async fn get(&self, id: InventoryItemId, owner: OwnerId) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_item WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self, filter), fields(owner_id = %owner, item_count = tracing::field::Empty), err)]
    async fn list(&self, owner: OwnerId, filter: &ListFilter) -> Result<Vec<InventoryItem>, StoreError> {
        let location = filter.location.as_deref().filter(|l| !l.is_empty());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM inventory_item
            WHERE owner_id = $1
              AND ($2::TEXT IS NULL OR location = $2)
              AND (NOT $3 OR quantity <= low_stock_alert)
            ORDER BY id ASC
            "#
        ))
        .bind(owner.get())
        .bind(location)
        .bind(filter.low_stock)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let items = rows.iter().map(item_from_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("item_count", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(owner_id = %owner), err)]
    async fn audit_trail(
        &self,
        owner: OwnerId,
        item_id: Option<InventoryItemId>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, action, owner_id, timestamp
            FROM inventory_audit
            WHERE owner_id = $1
              AND ($2::BIGINT IS NULL OR item_id = $2)
            ORDER BY id ASC
            "#,
        )
        .bind(owner.get())
        .bind(item_id.map(|id| id.get()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("audit_trail", e))?;

        rows.iter().map(audit_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn highest_owner_id(&self) -> Result<Option<OwnerId>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT GREATEST(
                (SELECT MAX(owner_id) FROM inventory_item),
                (SELECT MAX(owner_id) FROM inventory_audit)
            ) AS highest
            "#,
        )
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("highest_owner_id", e))?;

        let highest: Option<i64> = row
            .try_get("highest")
            .map_err(|e| corrupt("inventory_item", e))?;
        Ok(highest.map(OwnerId::new))
    }
}

/// Lock and load the item if it belongs to `owner`.
async fn lock_scoped(
    tx: &mut Transaction<'_, Postgres>,
    id: InventoryItemId,
    owner: OwnerId,
) -> Result<Option<InventoryItem>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_item WHERE id = $1 AND owner_id = $2 FOR UPDATE"
    ))
    .bind(id.get())
    .bind(owner.get())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_item", e))?;

    row.as_ref().map(item_from_row).transpose()
}

async fn insert_audit(
    tx: &mut Transaction<'_, Postgres>,
    item_id: InventoryItemId,
    action: AuditAction,
    owner: OwnerId,
    at: DateTime<Utc>,
) -> Result<AuditEntry, StoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO inventory_audit (item_id, action, owner_id, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(item_id.get())
    .bind(action.as_str())
    .bind(owner.get())
    .bind(at)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_audit", e))?;

    let id: i64 = row
        .try_get("id")
        .map_err(|e| corrupt("inventory_audit", e))?;

    Ok(AuditEntry {
        id: AuditEntryId::new(id),
        item_id,
        action,
        owner_id: owner,
        timestamp: at,
    })
}

fn item_from_row(row: &sqlx::postgres::PgRow) -> Result<InventoryItem, StoreError> {
    let decode = |e| corrupt("inventory_item", e);
    Ok(InventoryItem {
        id: InventoryItemId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        quantity: row.try_get("quantity").map_err(decode)?,
        unit: row.try_get("unit").map_err(decode)?,
        unit_cost: row.try_get("unit_cost").map_err(decode)?,
        location: row.try_get("location").map_err(decode)?,
        low_stock_alert: row.try_get("low_stock_alert").map_err(decode)?,
        notes: row.try_get("notes").map_err(decode)?,
        created: row.try_get("created").map_err(decode)?,
        owner_id: row
            .try_get::<Option<i64>, _>("owner_id")
            .map_err(decode)?
            .map(OwnerId::new),
    })
}

fn audit_from_row(row: &sqlx::postgres::PgRow) -> Result<AuditEntry, StoreError> {
    let decode = |e| corrupt("inventory_audit", e);
    let action: String = row.try_get("action").map_err(decode)?;
    let action = action.parse::<AuditAction>().map_err(|e| StoreError::CorruptRow {
        table: "inventory_audit",
        message: e.to_string(),
    })?;

    Ok(AuditEntry {
        id: AuditEntryId::new(row.try_get("id").map_err(decode)?),
        item_id: InventoryItemId::new(row.try_get("item_id").map_err(decode)?),
        action,
        owner_id: OwnerId::new(row.try_get("owner_id").map_err(decode)?),
        timestamp: row.try_get("timestamp").map_err(decode)?,
    })
}

fn corrupt(table: &'static str, err: sqlx::Error) -> StoreError {
    StoreError::CorruptRow {
        table,
        message: err.to_string(),
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation,
            message: match db_err.code() {
                Some(code) => format!("{} (sqlstate {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::CorruptRow {
            table: operation,
            message: err.to_string(),
        },
        sqlx::Error::PoolClosed => StoreError::Database {
            operation,
            message: "connection pool closed".to_string(),
        },
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
