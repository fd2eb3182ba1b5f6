//! # List Queries
//!
//! Filter, sort and pagination parameters shared by every list operation.
//!
//! The filter structs are flat so they can be deserialised straight from a
//! URL query string (`?search=amox&sort=name&order=desc&page=2`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MedicineSort {
    #[default]
    Name,
    Code,
    UnitPrice,
    CreatedAt,
}

impl MedicineSort {
    /// Whitelisted column; never interpolate user input into ORDER BY.
    pub fn column(&self) -> &'static str {
        match self {
            MedicineSort::Name => "m.name",
            MedicineSort::Code => "m.code",
            MedicineSort::UnitPrice => "m.unit_price_cents",
            MedicineSort::CreatedAt => "m.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SupplierSort {
    #[default]
    Name,
    CreatedAt,
}

impl SupplierSort {
    pub fn column(&self) -> &'static str {
        match self {
            SupplierSort::Name => "name",
            SupplierSort::CreatedAt => "created_at",
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Requested page, 1-based. Only built through [`PageRequest::new`], so
/// `page >= 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Clamps raw query values: page ≥ 1, per_page in 1..=MAX_PER_PAGE.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let per_page = i64::from(request.per_page);
        let total_pages = ((total.max(0) + per_page - 1) / per_page) as u32;
        Page {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages,
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Medicine list parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineFilter {
    /// Substring match on name or code.
    pub search: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub sort: MedicineSort,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MedicineFilter {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Supplier list parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierFilter {
    /// Substring match on name.
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub sort: SupplierSort,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SupplierFilter {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Stock list parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockFilter {
    /// Substring match on medicine name or code.
    pub search: Option<String>,
    /// Only rows at or below their reorder threshold.
    #[serde(default)]
    pub low_only: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl StockFilter {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Sale history parameters. `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cashier_id: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SaleFilter {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Wraps a substring for a SQL `LIKE` pattern, escaping `%`, `_` and `\`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), MAX_PER_PAGE);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_zero_page_offset_does_not_underflow() {
        let req = PageRequest { page: 0, per_page: 20 };
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let page: Page<i32> = Page::new(vec![], 41, PageRequest::new(Some(1), Some(20)));
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("amox"), "%amox%");
        assert_eq!(like_pattern("50%_"), "%50\\%\\_%");
    }

    #[test]
    fn test_filters_have_safe_defaults() {
        let filter = MedicineFilter::default();
        assert_eq!(filter.sort, MedicineSort::Name);
        assert_eq!(filter.order, SortOrder::Asc);
        assert!(!filter.include_inactive);
        assert_eq!(filter.page_request(), PageRequest::default());
    }
}
