//! # Sale Repository
//!
//! The sale transaction workflow and sale history.
//!
//! ## Sale Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_sale                                       │
//! │                                                                         │
//! │  1. VALIDATE (pure, nothing read yet)                                   │
//! │     └── validate_sale_request → ValidationError                         │
//! │                                                                         │
//! │  2. LOCK                                                                │
//! │     └── distinct medicine ids, ascending, each within lock_timeout      │
//! │                                                                         │
//! │  3. CHECK (one transaction)                                             │
//! │     └── re-read each medicine + quantity under its lock                 │
//! │     └── plan_sale → NotFound / InsufficientStock (rollback)             │
//! │                                                                         │
//! │  4. WRITE                                                               │
//! │     └── INSERT sales, sale_lines (code/name/price snapshots)            │
//! │     └── UPDATE stock_items guarded by quantity >= requested             │
//! │     └── INSERT stock_movements (kind = sale)                            │
//! │     └── COMMIT                                                          │
//! │                                                                         │
//! │  Lock timeout / SQLITE_BUSY at any step → retry from 2 with backoff,    │
//! │  then Conflict.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::locks::StockLocks;
use crate::repository::generate_id;
use crate::repository::stock::{apply_delta, insert_movement, load_snapshot};
use crate::retry::{with_conflict_retry, RetryPolicy};
use medistock_core::query::SaleFilter;
use medistock_core::sale::{distinct_medicine_ids, plan_sale, validate_sale_request, SalePlan};
use medistock_core::{
    MovementKind, Page, Sale, SaleDetail, SaleLine, SaleRequest, StockMovement,
};

const SALE_COLUMNS: &str = "id, sale_number, cashier_id, total_cents, notes, created_at";

const LINE_COLUMNS: &str = "id, sale_id, line_no, medicine_id, code_snapshot, name_snapshot, \
     quantity, unit_price_cents, line_total_cents";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    locks: Arc<StockLocks>,
    retry: RetryPolicy,
}

impl SaleRepository {
    /// Creates a new SaleRepository sharing the given lock registry.
    pub fn new(pool: SqlitePool, locks: Arc<StockLocks>, retry: RetryPolicy) -> Self {
        SaleRepository { pool, locks, retry }
    }

    /// Records a sale: all lines and stock decrements commit together, or
    /// nothing changes.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a malformed request, before any stock is read
    /// - `Core(MedicineNotFound)` for an unknown or inactive medicine
    /// - `Core(InsufficientStock)` for the first line that does not fit
    /// - `Conflict` once every attempt lost the race for a lock
    pub async fn create_sale(&self, cashier_id: &str, request: &SaleRequest) -> DbResult<SaleDetail> {
        let request = validate_sale_request(request)?;
        let medicine_ids = distinct_medicine_ids(&request.lines);

        debug!(
            cashier_id = %cashier_id,
            lines = request.lines.len(),
            medicines = medicine_ids.len(),
            "Recording sale"
        );

        with_conflict_retry(&self.retry, "create_sale", || {
            self.create_sale_once(cashier_id, &request, &medicine_ids)
        })
        .await
    }

    async fn create_sale_once(
        &self,
        cashier_id: &str,
        request: &SaleRequest,
        medicine_ids: &[String],
    ) -> DbResult<SaleDetail> {
        // Locks before the connection: a pooled connection is never held
        // while waiting on a stock lock.
        let _guards = self
            .locks
            .acquire(medicine_ids, self.retry.lock_timeout)
            .await?;

        // IMMEDIATE takes the write lock up front, so the busy timeout covers
        // it instead of a read-to-write upgrade failing straight away.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let mut stock = HashMap::with_capacity(medicine_ids.len());
        for id in medicine_ids {
            if let Some(snapshot) = load_snapshot(&mut *tx, id).await? {
                stock.insert(id.clone(), snapshot);
            }
        }

        // Dropping `tx` on error rolls back.
        let plan = plan_sale(&request.lines, &stock)?;

        let now = Utc::now();
        let sale = Sale {
            id: generate_id(),
            sale_number: generate_sale_number(now),
            cashier_id: cashier_id.to_string(),
            total_cents: plan.total.cents(),
            notes: request.notes.clone(),
            created_at: now,
        };

        let lines = write_sale(&mut *tx, &sale, &plan).await?;

        for (medicine_id, quantity) in &plan.decrements {
            let quantity_after = apply_delta(&mut *tx, medicine_id, -quantity, now).await?;
            insert_movement(
                &mut *tx,
                &StockMovement {
                    id: generate_id(),
                    medicine_id: medicine_id.clone(),
                    kind: MovementKind::Sale,
                    delta: -quantity,
                    quantity_after,
                    supplier_id: None,
                    sale_id: Some(sale.id.clone()),
                    note: None,
                    user_id: Some(cashier_id.to_string()),
                    created_at: now,
                },
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total_cents = sale.total_cents,
            units = plan.units(),
            "Sale recorded"
        );

        Ok(SaleDetail { sale, lines })
    }

    /// Gets a sale with its lines in original order.
    pub async fn get(&self, id: &str) -> DbResult<SaleDetail> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let lines = self.get_lines(id).await?;

        Ok(SaleDetail { sale, lines })
    }

    /// Gets the lines of a sale ordered by line number.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let sql = format!(
            "SELECT {} FROM sale_lines WHERE sale_id = ?1 ORDER BY line_no",
            LINE_COLUMNS
        );
        let lines = sqlx::query_as::<_, SaleLine>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Lists sales, newest first. `from` is inclusive, `to` exclusive.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Page<Sale>> {
        let request = filter.page_request();

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sales WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM sales WHERE 1 = 1", SALE_COLUMNS));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = select.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        Ok(Page::new(items, total, request))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at < ").push_bind(to);
    }
    if let Some(cashier_id) = filter.cashier_id.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND cashier_id = ").push_bind(cashier_id.to_string());
    }
}

/// Inserts the sale header and its lines, returning the stored lines.
async fn write_sale(
    conn: &mut SqliteConnection,
    sale: &Sale,
    plan: &SalePlan,
) -> DbResult<Vec<SaleLine>> {
    sqlx::query(
        r#"
        INSERT INTO sales (id, sale_number, cashier_id, total_cents, notes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(&sale.cashier_id)
    .bind(sale.total_cents)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("User", &sale.cashier_id),
        other => other,
    })?;

    let mut lines = Vec::with_capacity(plan.lines.len());
    for planned in &plan.lines {
        let line = SaleLine {
            id: generate_id(),
            sale_id: sale.id.clone(),
            line_no: planned.line_no,
            medicine_id: planned.medicine_id.clone(),
            code_snapshot: planned.code.clone(),
            name_snapshot: planned.name.clone(),
            quantity: planned.quantity,
            unit_price_cents: planned.unit_price.cents(),
            line_total_cents: planned.line_total.cents(),
        };

        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, line_no, medicine_id,
                code_snapshot, name_snapshot,
                quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(line.line_no)
        .bind(&line.medicine_id)
        .bind(&line.code_snapshot)
        .bind(&line.name_snapshot)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .execute(&mut *conn)
        .await?;

        lines.push(line);
    }

    Ok(lines)
}

/// Generates a sale number in format: `S-YYYYMMDD-XXXXXXXX`
///
/// The suffix is the first 8 hex digits of a random UUID, uppercased.
///
/// ## Example
/// `S-20260131-3F2A9C01`
fn generate_sale_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("S-{}-{}", now.format("%Y%m%d"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{medicine, quantity, test_db, user};
    use medistock_core::{CoreError, MedicineUpdate, Role, SaleLineRequest, ValidationError};

    fn request<S: AsRef<str>>(lines: &[(S, i64)]) -> SaleRequest {
        SaleRequest {
            lines: lines
                .iter()
                .map(|(id, quantity)| SaleLineRequest {
                    medicine_id: id.as_ref().to_string(),
                    quantity: *quantity,
                })
                .collect(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_exactly_and_nothing_else() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;
        let ibu = medicine(&db, "IBU-200", 199, 5).await;
        let para = medicine(&db, "PARA-1G", 350, 8).await;

        let detail = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&ibu.id, 2), (&amox.id, 3)]))
            .await
            .unwrap();

        assert_eq!(detail.sale.total_cents, 2 * 199 + 3 * 450);
        assert_eq!(detail.sale.cashier_id, cashier.id);
        assert!(detail.sale.sale_number.starts_with("S-"));
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].line_no, 1);
        assert_eq!(detail.lines[0].code_snapshot, "IBU-200");
        assert_eq!(detail.lines[1].line_total_cents, 1350);

        assert_eq!(quantity(&db, &amox.id).await, 7);
        assert_eq!(quantity(&db, &ibu.id).await, 3);
        assert_eq!(quantity(&db, &para.id).await, 8);

        let movements = db
            .stock()
            .movements(&amox.id, Default::default())
            .await
            .unwrap();
        assert_eq!(movements.items[0].kind, MovementKind::Sale);
        assert_eq!(movements.items[0].delta, -3);
        assert_eq!(movements.items[0].sale_id.as_deref(), Some(detail.sale.id.as_str()));
    }

    #[tokio::test]
    async fn test_insufficient_stock_applies_nothing() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;
        let ibu = medicine(&db, "IBU-200", 199, 5).await;

        let err = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 2), (&ibu.id, 6)]))
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::InsufficientStock {
                medicine_id,
                available,
                requested,
                ..
            }) => {
                assert_eq!(medicine_id, ibu.id);
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(quantity(&db, &amox.id).await, 10);
        assert_eq!(quantity(&db, &ibu.id).await, 5);
        assert_eq!(db.sales().list(&SaleFilter::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_repeated_lines_checked_cumulatively() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        let err = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 6), (&amox.id, 6)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock { available: 4, requested: 6, .. })
        ));

        let detail = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 6), (&amox.id, 4)]))
            .await
            .unwrap();
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(quantity(&db, &amox.id).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected_before_stock_is_touched() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        for bad in [0, -1] {
            let err = db
                .sales()
                .create_sale(&cashier.id, &request(&[(&amox.id, 1), (&amox.id, bad)]))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DbError::Core(CoreError::Validation(ValidationError::MustBePositive { .. }))
            ));
        }

        let err = db
            .sales()
            .create_sale(&cashier.id, &SaleRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::EmptySale))
        ));

        assert_eq!(quantity(&db, &amox.id).await, 10);
        // Validation runs before locking.
        assert_eq!(db.locks().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_medicine_is_not_found() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;
        let gone = medicine(&db, "GONE", 100, 10).await;
        db.medicines().soft_delete(&gone.id).await.unwrap();

        let err = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 1), (&gone.id, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::MedicineNotFound(_))));
        assert_eq!(quantity(&db, &amox.id).await, 10);
    }

    #[tokio::test]
    async fn test_unknown_medicine_reported_before_short_stock() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 1).await;
        let unknown = generate_id();

        let err = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 5), (&unknown, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::MedicineNotFound(id)) if id == unknown));
        assert_eq!(quantity(&db, &amox.id).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_cashier_is_not_found() {
        let db = test_db().await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        let err = db
            .sales()
            .create_sale(&generate_id(), &request(&[(&amox.id, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(quantity(&db, &amox.id).await, 10);
    }

    #[tokio::test]
    async fn test_sale_keeps_price_snapshot() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        let detail = db
            .sales()
            .create_sale(&cashier.id, &request(&[(&amox.id, 2)]))
            .await
            .unwrap();

        db.medicines()
            .update(
                &amox.id,
                &MedicineUpdate {
                    unit_price_cents: Some(999),
                    name: Some("Amoxicillin 500mg (new pack)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let first = db.sales().get(&detail.sale.id).await.unwrap();
        let second = db.sales().get(&detail.sale.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.lines[0].unit_price_cents, 450);
        assert_eq!(first.lines[0].name_snapshot, "AMOX-500 tablets");
        assert_eq!(first.sale.total_cents, 900);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_sales_never_oversell() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        let spawn_sale = |db: Database, cashier_id: String, medicine_id: String| {
            tokio::spawn(async move {
                db.sales()
                    .create_sale(&cashier_id, &request(&[(&medicine_id, 7)]))
                    .await
            })
        };
        let a = spawn_sale(db.clone(), cashier.id.clone(), amox.id.clone());
        let b = spawn_sale(db.clone(), cashier.id.clone(), amox.id.clone());

        let results = [a.await.unwrap(), b.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1);

        let failure = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(
            failure,
            DbError::Core(CoreError::InsufficientStock { available: 3, requested: 7, .. })
        ));
        assert_eq!(quantity(&db, &amox.id).await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_disjoint_concurrent_sales_both_commit() {
        let db = test_db().await;
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;
        let ibu = medicine(&db, "IBU-200", 199, 10).await;

        let sales = db.sales();
        let take_amox = request(&[(&amox.id, 4)]);
        let take_ibu = request(&[(&ibu.id, 6)]);
        let (left, right) = tokio::join!(
            sales.create_sale(&cashier.id, &take_amox),
            sales.create_sale(&cashier.id, &take_ibu),
        );

        assert!(left.is_ok());
        assert!(right.is_ok());
        assert_eq!(quantity(&db, &amox.id).await, 6);
        assert_eq!(quantity(&db, &ibu.id).await, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_sales_on_file_database() {
        let path = std::env::temp_dir().join(format!("medistock-{}.db", generate_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let cashier = user(&db, "cashier", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 5).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let cashier_id = cashier.id.clone();
            let medicine_id = amox.id.clone();
            handles.push(tokio::spawn(async move {
                db.sales()
                    .create_sale(&cashier_id, &request(&[(&medicine_id, 1)]))
                    .await
            }));
        }

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Core(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(quantity(&db, &amox.id).await, 0);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_disjoint_sales_on_file_database_never_conflict() {
        let path = std::env::temp_dir().join(format!("medistock-{}.db", generate_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();
        let cashier = user(&db, "cashier", Role::Cashier).await;

        let mut medicine_ids = Vec::new();
        for i in 0..40 {
            medicine_ids.push(medicine(&db, &format!("MED-{:03}", i), 100, 10).await.id);
        }

        for _round in 0..5 {
            let mut handles = Vec::new();
            for medicine_id in &medicine_ids {
                let db = db.clone();
                let cashier_id = cashier.id.clone();
                let medicine_id = medicine_id.clone();
                handles.push(tokio::spawn(async move {
                    db.sales()
                        .create_sale(&cashier_id, &request(&[(&medicine_id, 1)]))
                        .await
                }));
            }
            for handle in handles {
                if let Err(err) = handle.await.unwrap() {
                    panic!("disjoint sale failed: {err:?}");
                }
            }
        }

        for medicine_id in &medicine_ids {
            assert_eq!(quantity(&db, medicine_id).await, 5);
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_range_and_cashier() {
        let db = test_db().await;
        let alice = user(&db, "alice", Role::Cashier).await;
        let bob = user(&db, "bob", Role::Cashier).await;
        let amox = medicine(&db, "AMOX-500", 450, 10).await;

        let before = Utc::now();
        db.sales()
            .create_sale(&alice.id, &request(&[(&amox.id, 1)]))
            .await
            .unwrap();
        db.sales()
            .create_sale(&bob.id, &request(&[(&amox.id, 1)]))
            .await
            .unwrap();

        let bobs = db
            .sales()
            .list(&SaleFilter {
                cashier_id: Some(bob.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(bobs.total, 1);
        assert_eq!(bobs.items[0].cashier_id, bob.id);

        let none = db
            .sales()
            .list(&SaleFilter {
                to: Some(before),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(none.total, 0);

        assert!(matches!(
            db.sales().get(&generate_id()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sale_number_format() {
        let number = generate_sale_number(Utc::now());
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "S");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
