//! # Stock Repository
//!
//! Stock levels, receipts, adjustments and the movement ledger.
//!
//! ## Every Quantity Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  receive / adjust / sale                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockLocks::acquire(ids ascending, lock_timeout)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    re-read medicine + quantity                                          │
//! │    UPDATE stock_items ... WHERE quantity + delta >= 0                   │
//! │    INSERT stock_movements (kind, delta, quantity_after)                 │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  guards dropped                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no way to overwrite a quantity directly. Corrections are new
//! adjustment movements.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::locks::StockLocks;
use crate::repository::generate_id;
use crate::retry::{with_conflict_retry, RetryPolicy};
use medistock_core::query::{like_pattern, StockFilter};
use medistock_core::sale::StockSnapshot;
use medistock_core::validation::{validate_adjustment, validate_receipt, validate_reorder_threshold};
use medistock_core::{
    CoreError, MovementKind, Page, PageRequest, StockAdjustment, StockItem, StockMovement,
    StockReceipt,
};

const STOCK_ITEM_SELECT: &str = r#"
    SELECT
        s.medicine_id,
        m.code AS medicine_code,
        m.name AS medicine_name,
        s.quantity,
        s.reorder_threshold,
        s.updated_at
    FROM stock_items s
    JOIN medicines m ON m.id = s.medicine_id
    WHERE m.is_active = 1
"#;

const MOVEMENT_COLUMNS: &str = "id, medicine_id, kind, delta, quantity_after, supplier_id, \
     sale_id, note, user_id, created_at";

/// Repository for stock operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
    locks: Arc<StockLocks>,
    retry: RetryPolicy,
}

impl StockRepository {
    /// Creates a new StockRepository sharing the given lock registry.
    pub fn new(pool: SqlitePool, locks: Arc<StockLocks>, retry: RetryPolicy) -> Self {
        StockRepository { pool, locks, retry }
    }

    /// Gets the stock row of an active medicine.
    pub async fn get(&self, medicine_id: &str) -> DbResult<StockItem> {
        let sql = format!("{} AND s.medicine_id = ?1", STOCK_ITEM_SELECT);
        sqlx::query_as::<_, StockItem>(&sql)
            .bind(medicine_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Medicine", medicine_id))
    }

    /// Lists stock rows of active medicines, ordered by medicine name.
    pub async fn list(&self, filter: &StockFilter) -> DbResult<Page<StockItem>> {
        let request = filter.page_request();

        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM stock_items s JOIN medicines m ON m.id = s.medicine_id \
             WHERE m.is_active = 1",
        );
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(STOCK_ITEM_SELECT);
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY m.name ASC, m.id ASC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = select
            .build_query_as::<StockItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }

    /// Updates the reorder threshold. Last write wins; quantity is untouched.
    pub async fn set_reorder_threshold(&self, medicine_id: &str, threshold: i64) -> DbResult<StockItem> {
        validate_reorder_threshold(threshold)?;

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET reorder_threshold = ?2, updated_at = ?3
            WHERE medicine_id = ?1
              AND EXISTS (SELECT 1 FROM medicines WHERE id = ?1 AND is_active = 1)
            "#,
        )
        .bind(medicine_id)
        .bind(threshold)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", medicine_id));
        }

        debug!(medicine_id = %medicine_id, threshold, "Reorder threshold updated");
        self.get(medicine_id).await
    }

    /// Records goods received for a medicine.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a non-positive quantity or malformed supplier id
    /// - `NotFound` for an unknown/inactive medicine or supplier
    /// - `Conflict` when the medicine stayed locked through every attempt
    pub async fn receive(
        &self,
        medicine_id: &str,
        receipt: &StockReceipt,
        user_id: Option<&str>,
    ) -> DbResult<StockMovement> {
        let receipt = validate_receipt(receipt)?;

        with_conflict_retry(&self.retry, "stock_receipt", || {
            self.apply_once(StockChange {
                medicine_id,
                kind: MovementKind::Receipt,
                delta: receipt.quantity,
                supplier_id: receipt.supplier_id.as_deref(),
                note: receipt.reference.as_deref(),
                user_id,
            })
        })
        .await
    }

    /// Applies a signed correction with a mandatory reason.
    ///
    /// A correction that would take the quantity below zero fails with
    /// `InsufficientStock` and changes nothing.
    pub async fn adjust(
        &self,
        medicine_id: &str,
        adjustment: &StockAdjustment,
        user_id: Option<&str>,
    ) -> DbResult<StockMovement> {
        let adjustment = validate_adjustment(adjustment)?;

        with_conflict_retry(&self.retry, "stock_adjustment", || {
            self.apply_once(StockChange {
                medicine_id,
                kind: MovementKind::Adjustment,
                delta: adjustment.delta,
                supplier_id: None,
                note: Some(adjustment.reason.as_str()),
                user_id,
            })
        })
        .await
    }

    /// Ledger entries for a medicine, newest first.
    pub async fn movements(
        &self,
        medicine_id: &str,
        request: PageRequest,
    ) -> DbResult<Page<StockMovement>> {
        // NotFound for unknown or inactive medicines.
        self.get(medicine_id).await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE medicine_id = ?1")
                .bind(medicine_id)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {} FROM stock_movements WHERE medicine_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            MOVEMENT_COLUMNS
        );
        let items = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(medicine_id)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }

    async fn apply_once(&self, change: StockChange<'_>) -> DbResult<StockMovement> {
        let _guards = self
            .locks
            .acquire([change.medicine_id], self.retry.lock_timeout)
            .await?;

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let snapshot = load_snapshot(&mut *tx, change.medicine_id)
            .await?
            .ok_or_else(|| DbError::not_found("Medicine", change.medicine_id))?;

        if let Some(supplier_id) = change.supplier_id {
            let active: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM suppliers WHERE id = ?1 AND is_active = 1")
                    .bind(supplier_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if active.is_none() {
                return Err(DbError::not_found("Supplier", supplier_id));
            }
        }

        if snapshot.available + change.delta < 0 {
            return Err(CoreError::InsufficientStock {
                medicine_id: snapshot.medicine_id,
                code: snapshot.code,
                available: snapshot.available,
                requested: -change.delta,
            }
            .into());
        }

        let now = Utc::now();
        let quantity_after = apply_delta(&mut *tx, change.medicine_id, change.delta, now).await?;

        let movement = StockMovement {
            id: generate_id(),
            medicine_id: change.medicine_id.to_string(),
            kind: change.kind,
            delta: change.delta,
            quantity_after,
            supplier_id: change.supplier_id.map(str::to_string),
            sale_id: None,
            note: change.note.map(str::to_string),
            user_id: change.user_id.map(str::to_string),
            created_at: now,
        };
        insert_movement(&mut *tx, &movement).await?;

        tx.commit().await?;

        info!(
            medicine_id = %movement.medicine_id,
            kind = movement.kind.as_str(),
            delta = movement.delta,
            quantity_after,
            "Stock changed"
        );

        Ok(movement)
    }
}

/// One locked quantity change.
struct StockChange<'a> {
    medicine_id: &'a str,
    kind: MovementKind,
    delta: i64,
    supplier_id: Option<&'a str>,
    note: Option<&'a str>,
    user_id: Option<&'a str>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &StockFilter) {
    if filter.low_only {
        qb.push(" AND s.quantity <= s.reorder_threshold");
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (m.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR m.code LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

// =============================================================================
// Shared with the sale workflow (callers hold the stock locks)
// =============================================================================

/// Reads an active medicine and its on-hand quantity.
pub(crate) async fn load_snapshot(
    conn: &mut SqliteConnection,
    medicine_id: &str,
) -> DbResult<Option<StockSnapshot>> {
    let row: Option<(String, String, String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT m.id, m.code, m.name, m.unit_price_cents, s.quantity
        FROM medicines m
        JOIN stock_items s ON s.medicine_id = m.id
        WHERE m.id = ?1 AND m.is_active = 1
        "#,
    )
    .bind(medicine_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(
        |(medicine_id, code, name, unit_price_cents, available)| StockSnapshot {
            medicine_id,
            code,
            name,
            unit_price_cents,
            available,
        },
    ))
}

/// Adds `delta` to the quantity and returns the new value.
///
/// The `WHERE` guard refuses to go negative even if a caller skipped the
/// locks; that case surfaces as a retryable conflict.
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    medicine_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let quantity: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE stock_items
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE medicine_id = ?1 AND quantity + ?2 >= 0
        RETURNING quantity
        "#,
    )
    .bind(medicine_id)
    .bind(delta)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    quantity.ok_or_else(|| {
        DbError::Conflict(format!(
            "stock for medicine {} changed during the transaction",
            medicine_id
        ))
    })
}

/// Appends a ledger row.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, medicine_id, kind, delta, quantity_after,
            supplier_id, sale_id, note, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.medicine_id)
    .bind(movement.kind)
    .bind(movement.delta)
    .bind(movement.quantity_after)
    .bind(&movement.supplier_id)
    .bind(&movement.sale_id)
    .bind(&movement.note)
    .bind(&movement.user_id)
    .bind(movement.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
