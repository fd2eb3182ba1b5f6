//! # Medicine Repository
//!
//! Database operations for the medicine catalog.
//!
//! ## Key Operations
//! - Create (together with the medicine's stock row)
//! - Get / partial update / soft delete
//! - Filtered, sorted, paginated listing
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DELETE /api/medicines/{id}                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  is_active = 0  (row stays; sale_lines keep their reference)           │
//! │       │                                                                 │
//! │       ├── get / sell / stock changes → NotFound                        │
//! │       ├── list → hidden unless include_inactive=true                   │
//! │       └── code stays reserved (UNIQUE covers inactive rows)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use medistock_core::query::{like_pattern, MedicineFilter};
use medistock_core::validation::{validate_medicine_update, validate_new_medicine};
use medistock_core::{Medicine, MedicineUpdate, NewMedicine, Page};

const MEDICINE_COLUMNS: &str = "m.id, m.code, m.name, m.manufacturer, m.category, m.description, \
     m.unit_price_cents, m.is_active, m.created_at, m.updated_at";

/// Repository for medicine database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.medicines();
/// let amox = repo.create(&new_medicine).await?;
/// let page = repo.list(&MedicineFilter { search: Some("amox".into()), ..Default::default() }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    /// Creates a new MedicineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// Creates a medicine and its stock row (quantity 0) in one transaction.
    ///
    /// ## Errors
    /// - `Core(Validation)` for invalid fields
    /// - `UniqueViolation { field: "code" }` when the code is taken, even by
    ///   a deleted medicine
    pub async fn create(&self, input: &NewMedicine) -> DbResult<Medicine> {
        let input = validate_new_medicine(input)?;
        let now = Utc::now();

        let medicine = Medicine {
            id: generate_id(),
            code: input.code,
            name: input.name,
            manufacturer: input.manufacturer,
            category: input.category,
            description: input.description,
            unit_price_cents: input.unit_price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %medicine.id, code = %medicine.code, "Creating medicine");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO medicines (
                id, code, name, manufacturer, category, description,
                unit_price_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(&medicine.id)
        .bind(&medicine.code)
        .bind(&medicine.name)
        .bind(&medicine.manufacturer)
        .bind(&medicine.category)
        .bind(&medicine.description)
        .bind(medicine.unit_price_cents)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&medicine.code))?;

        sqlx::query(
            r#"
            INSERT INTO stock_items (medicine_id, quantity, reorder_threshold, updated_at)
            VALUES (?1, 0, ?2, ?3)
            "#,
        )
        .bind(&medicine.id)
        .bind(input.reorder_threshold.unwrap_or(0))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %medicine.id, code = %medicine.code, "Medicine created");
        Ok(medicine)
    }

    /// Gets an active medicine by ID.
    pub async fn get(&self, id: &str) -> DbResult<Medicine> {
        self.find(id, false)
            .await?
            .ok_or_else(|| DbError::not_found("Medicine", id))
    }

    /// Gets a medicine by ID, optionally including soft-deleted ones.
    pub async fn find(&self, id: &str, include_inactive: bool) -> DbResult<Option<Medicine>> {
        let sql = format!(
            "SELECT {} FROM medicines m WHERE m.id = ?1 AND (m.is_active = 1 OR ?2)",
            MEDICINE_COLUMNS
        );
        let medicine = sqlx::query_as::<_, Medicine>(&sql)
            .bind(id)
            .bind(include_inactive)
            .fetch_optional(&self.pool)
            .await?;

        Ok(medicine)
    }

    /// Applies a partial update. Last write wins.
    ///
    /// Price changes never touch existing sale lines; those carry their own
    /// unit price snapshot.
    pub async fn update(&self, id: &str, changes: &MedicineUpdate) -> DbResult<Medicine> {
        let changes = validate_medicine_update(changes)?;
        let mut medicine = self.get(id).await?;

        if let Some(code) = changes.code {
            medicine.code = code;
        }
        if let Some(name) = changes.name {
            medicine.name = name;
        }
        if let Some(price) = changes.unit_price_cents {
            medicine.unit_price_cents = price;
        }
        if let Some(manufacturer) = changes.manufacturer {
            medicine.manufacturer = Some(manufacturer).filter(|v| !v.is_empty());
        }
        if let Some(category) = changes.category {
            medicine.category = Some(category).filter(|v| !v.is_empty());
        }
        if let Some(description) = changes.description {
            medicine.description = Some(description).filter(|v| !v.is_empty());
        }
        medicine.updated_at = Utc::now();

        debug!(id = %id, "Updating medicine");

        let result = sqlx::query(
            r#"
            UPDATE medicines SET
                code = ?2,
                name = ?3,
                manufacturer = ?4,
                category = ?5,
                description = ?6,
                unit_price_cents = ?7,
                updated_at = ?8
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(&medicine.id)
        .bind(&medicine.code)
        .bind(&medicine.name)
        .bind(&medicine.manufacturer)
        .bind(&medicine.category)
        .bind(&medicine.description)
        .bind(medicine.unit_price_cents)
        .bind(medicine.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&medicine.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id));
        }

        Ok(medicine)
    }

    /// Soft-deletes a medicine by setting is_active = false.
    ///
    /// Historical sale lines still reference the row.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting medicine");

        let result = sqlx::query(
            "UPDATE medicines SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id));
        }

        info!(id = %id, "Medicine deactivated");
        Ok(())
    }

    /// Lists medicines with filters, sorting and pagination.
    pub async fn list(&self, filter: &MedicineFilter) -> DbResult<Page<Medicine>> {
        let request = filter.page_request();

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM medicines m WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM medicines m WHERE 1 = 1",
            MEDICINE_COLUMNS
        ));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(filter.sort.column())
            .push(" ")
            .push(filter.order.as_sql())
            .push(", m.id ASC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = select
            .build_query_as::<Medicine>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }

    /// Counts active medicines (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MedicineFilter) {
    if !filter.include_inactive {
        qb.push(" AND m.is_active = 1");
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (m.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR m.code LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(category) = filter.category.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND m.category = ")
            .push_bind(category.trim().to_string())
            .push(" COLLATE NOCASE");
    }
    if let Some(manufacturer) = filter.manufacturer.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND m.manufacturer = ")
            .push_bind(manufacturer.trim().to_string())
            .push(" COLLATE NOCASE");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{medicine, test_db};
    use medistock_core::query::MedicineSort;
    use medistock_core::{CoreError, SortOrder};

    #[tokio::test]
    async fn test_create_creates_empty_stock_row() {
        let db = test_db().await;
        let created = db
            .medicines()
            .create(&NewMedicine {
                code: " PARA-1G ".to_string(),
                name: "Paracetamol 1g".to_string(),
                unit_price_cents: 350,
                category: Some("Analgesic".to_string()),
                reorder_threshold: Some(15),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.code, "PARA-1G");
        let stock = db.stock().get(&created.id).await.unwrap();
        assert_eq!(stock.quantity, 0);
        assert_eq!(stock.reorder_threshold, 15);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_even_when_inactive() {
        let db = test_db().await;
        let first = medicine(&db, "AMOX-500", 450, 0).await;
        db.medicines().soft_delete(&first.id).await.unwrap();

        let err = db
            .medicines()
            .create(&NewMedicine {
                code: "AMOX-500".to_string(),
                name: "Amoxicillin".to_string(),
                unit_price_cents: 450,
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "code");
                assert_eq!(value, "AMOX-500");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_is_validation_error() {
        let db = test_db().await;
        let err = db
            .medicines()
            .create(&NewMedicine {
                code: "".to_string(),
                name: "Nameless".to_string(),
                unit_price_cents: 100,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_clear_optional_field() {
        let db = test_db().await;
        let repo = db.medicines();
        let created = repo
            .create(&NewMedicine {
                code: "IBU-200".to_string(),
                name: "Ibuprofen".to_string(),
                unit_price_cents: 199,
                manufacturer: Some("Acme".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                &MedicineUpdate {
                    unit_price_cents: Some(249),
                    manufacturer: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.unit_price_cents, 249);
        assert_eq!(updated.manufacturer, None);
        assert_eq!(updated.name, "Ibuprofen");
        let reloaded = repo.get(&created.id).await.unwrap();
        assert_eq!(reloaded.unit_price_cents, 249);
        assert_eq!(reloaded.manufacturer, None);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_medicine() {
        let db = test_db().await;
        let repo = db.medicines();
        let created = medicine(&db, "VITC", 120, 0).await;

        repo.soft_delete(&created.id).await.unwrap();

        assert!(matches!(repo.get(&created.id).await, Err(DbError::NotFound { .. })));
        assert!(repo.find(&created.id, true).await.unwrap().is_some());
        assert!(matches!(
            repo.soft_delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_search_sort_and_paginate() {
        let db = test_db().await;
        medicine(&db, "AMOX-500", 450, 0).await;
        medicine(&db, "AMOX-250", 300, 0).await;
        medicine(&db, "IBU-200", 199, 0).await;
        let gone = medicine(&db, "AMOX-125", 150, 0).await;
        db.medicines().soft_delete(&gone.id).await.unwrap();

        let page = db
            .medicines()
            .list(&MedicineFilter {
                search: Some("amox".to_string()),
                sort: MedicineSort::UnitPrice,
                order: SortOrder::Desc,
                per_page: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].code, "AMOX-500");

        let all = db
            .medicines()
            .list(&MedicineFilter {
                include_inactive: true,
                sort: MedicineSort::Code,
                ..Default::default()
            })
            .await
            .unwrap();
        let codes: Vec<_> = all.items.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["AMOX-125", "AMOX-250", "AMOX-500", "IBU-200"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = test_db().await;
        medicine(&db, "ZINC", 100, 0).await;

        let page = db
            .medicines()
            .list(&MedicineFilter {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
