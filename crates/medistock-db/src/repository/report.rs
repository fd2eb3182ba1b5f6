//! # Report Repository
//!
//! Read-only aggregates. Reports take no stock locks; each query sees
//! whatever was committed when it ran.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use medistock_core::{DailySales, SalesSummary, StockItem, TopSeller, ValidationError};

/// Upper bound for `top_selling` result size.
pub const MAX_TOP_SELLING: i64 = 100;

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sale count, units sold and revenue for sales in `[from, to)`.
    pub async fn sales_summary(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<SalesSummary> {
        check_range(from, to)?;

        let (sale_count, revenue_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let units_sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(l.quantity), 0)
            FROM sale_lines l
            JOIN sales s ON s.id = l.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            from,
            to,
            sale_count,
            units_sold,
            revenue_cents,
        })
    }

    /// Active medicines at or below their reorder threshold, emptiest first.
    pub async fn low_stock(&self) -> DbResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT
                s.medicine_id,
                m.code AS medicine_code,
                m.name AS medicine_name,
                s.quantity,
                s.reorder_threshold,
                s.updated_at
            FROM stock_items s
            JOIN medicines m ON m.id = s.medicine_id
            WHERE m.is_active = 1 AND s.quantity <= s.reorder_threshold
            ORDER BY s.quantity ASC, m.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Medicines ranked by units sold in `[from, to)`; ties go to higher
    /// revenue, then name.
    pub async fn top_selling(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<TopSeller>> {
        check_range(from, to)?;
        if !(1..=MAX_TOP_SELLING).contains(&limit) {
            return Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: MAX_TOP_SELLING,
            }
            .into());
        }

        let rows = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                l.medicine_id AS medicine_id,
                m.code AS code,
                m.name AS name,
                SUM(l.quantity) AS units_sold,
                SUM(l.line_total_cents) AS revenue_cents
            FROM sale_lines l
            JOIN sales s ON s.id = l.sale_id
            JOIN medicines m ON m.id = l.medicine_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY l.medicine_id, m.code, m.name
            ORDER BY units_sold DESC, revenue_cents DESC, m.name ASC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-day (UTC) sale count and revenue for `[from, to)`, oldest first.
    /// Days without sales are omitted.
    pub async fn daily_sales(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<Vec<DailySales>> {
        check_range(from, to)?;

        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT
                substr(created_at, 1, 10) AS day,
                COUNT(*) AS sale_count,
                SUM(total_cents) AS revenue_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), ValidationError> {
    if to <= from {
        return Err(ValidationError::InvalidFormat {
            field: "to".to_string(),
            reason: "must be later than from".to_string(),
        });
    }
    Ok(())
}
