//! # Supplier Repository
//!
//! Database operations for suppliers. Suppliers are soft-deleted like
//! medicines so past receipts keep their reference.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use medistock_core::query::{like_pattern, SupplierFilter};
use medistock_core::validation::{validate_new_supplier, validate_supplier_update};
use medistock_core::{NewSupplier, Page, Supplier, SupplierUpdate};

const SUPPLIER_COLUMNS: &str =
    "id, name, contact_name, email, phone, address, is_active, created_at, updated_at";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn create(&self, input: &NewSupplier) -> DbResult<Supplier> {
        let input = validate_new_supplier(input)?;
        let now = Utc::now();

        let supplier = Supplier {
            id: generate_id(),
            name: input.name,
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_name, email, phone, address,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    /// Gets an active supplier by ID.
    pub async fn get(&self, id: &str) -> DbResult<Supplier> {
        let sql = format!(
            "SELECT {} FROM suppliers WHERE id = ?1 AND is_active = 1",
            SUPPLIER_COLUMNS
        );
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Applies a partial update. Last write wins.
    pub async fn update(&self, id: &str, changes: &SupplierUpdate) -> DbResult<Supplier> {
        let changes = validate_supplier_update(changes)?;
        let mut supplier = self.get(id).await?;

        if let Some(name) = changes.name {
            supplier.name = name;
        }
        // Some("") clears the field.
        for (target, change) in [
            (&mut supplier.contact_name, changes.contact_name),
            (&mut supplier.email, changes.email),
            (&mut supplier.phone, changes.phone),
            (&mut supplier.address, changes.address),
        ] {
            if let Some(value) = change {
                *target = Some(value).filter(|v| !v.is_empty());
            }
        }
        supplier.updated_at = Utc::now();

        debug!(id = %id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                contact_name = ?3,
                email = ?4,
                phone = ?5,
                address = ?6,
                updated_at = ?7
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(supplier)
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE suppliers SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        info!(id = %id, "Supplier deactivated");
        Ok(())
    }

    pub async fn list(&self, filter: &SupplierFilter) -> DbResult<Page<Supplier>> {
        let request = filter.page_request();

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM suppliers WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM suppliers WHERE 1 = 1",
            SUPPLIER_COLUMNS
        ));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(filter.sort.column())
            .push(" ")
            .push(filter.order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = select
            .build_query_as::<Supplier>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SupplierFilter) {
    if !filter.include_inactive {
        qb.push(" AND is_active = 1");
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND name LIKE ")
            .push_bind(like_pattern(search))
            .push(" ESCAPE '\\'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use medistock_core::query::SupplierSort;
    use medistock_core::{CoreError, SortOrder};

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            email: Some("orders@example.com".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let db = test_db().await;
        let repo = db.suppliers();

        let created = repo.create(&new_supplier("  MedSupply  ")).await.unwrap();
        assert_eq!(created.name, "MedSupply");

        let updated = repo
            .update(
                &created.id,
                &SupplierUpdate {
                    phone: Some("+1 555 0100".to_string()),
                    email: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(updated.email, None);

        repo.soft_delete(&created.id).await.unwrap();
        assert!(matches!(repo.get(&created.id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = test_db().await;
        let err = db
            .suppliers()
            .create(&NewSupplier {
                name: "Broken".to_string(),
                email: Some("not-an-email".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_search_and_inactive() {
        let db = test_db().await;
        let repo = db.suppliers();
        repo.create(&new_supplier("Alpha Pharma")).await.unwrap();
        repo.create(&new_supplier("Beta Health")).await.unwrap();
        let gone = repo.create(&new_supplier("Gamma Pharma")).await.unwrap();
        repo.soft_delete(&gone.id).await.unwrap();

        let pharma = repo
            .list(&SupplierFilter {
                search: Some("pharma".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pharma.total, 1);

        let all = repo
            .list(&SupplierFilter {
                include_inactive: true,
                sort: SupplierSort::Name,
                order: SortOrder::Desc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = all.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma Pharma", "Beta Health", "Alpha Pharma"]);
    }
}
