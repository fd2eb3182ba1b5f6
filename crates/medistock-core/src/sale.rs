//! # Sale Planning
//!
//! The pure half of the sale workflow. The database layer locks the affected
//! medicines, loads a [`StockSnapshot`] for each, and hands them to
//! [`plan_sale`]. Whatever this module returns is written back verbatim.
//!
//! ## Flow
//! ```text
//! SaleRequest ──► validate_sale_request ──► distinct_medicine_ids (sorted)
//!                                                 │
//!                                   lock each id in this order
//!                                                 │
//!                                 load StockSnapshot per medicine
//!                                                 │
//!                                                 ▼
//!                                  plan_sale ──► SalePlan
//!                                   │  lines in input order
//!                                   │  decrements per medicine
//!                                   └─ total
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{SaleLineRequest, SaleRequest};
use crate::validation::{normalize_sale_notes, validate_quantity, validate_uuid};
use crate::MAX_SALE_LINES;

// =============================================================================
// Request Validation
// =============================================================================

/// Checks the shape of a sale request without touching stock.
///
/// Returns a normalised copy: trimmed ids, trimmed notes (blank becomes `None`).
///
/// ## Example
/// ```rust
/// use medistock_core::sale::validate_sale_request;
/// use medistock_core::types::{SaleLineRequest, SaleRequest};
///
/// let request = SaleRequest {
///     lines: vec![SaleLineRequest {
///         medicine_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
///         quantity: 0,
///     }],
///     notes: None,
/// };
/// assert!(validate_sale_request(&request).is_err());
/// ```
pub fn validate_sale_request(request: &SaleRequest) -> Result<SaleRequest, ValidationError> {
    if request.lines.is_empty() {
        return Err(ValidationError::EmptySale);
    }

    if request.lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        let medicine_id = line.medicine_id.trim();
        validate_uuid("medicine_id", medicine_id).map_err(|e| e.at_line(index))?;
        validate_quantity(line.quantity).map_err(|e| e.at_line(index))?;

        lines.push(SaleLineRequest {
            medicine_id: medicine_id.to_string(),
            quantity: line.quantity,
        });
    }

    Ok(SaleRequest {
        lines,
        notes: normalize_sale_notes(request.notes.as_deref())?,
    })
}

/// Distinct medicine ids of the request in ascending order.
///
/// Every writer locks medicines in this order, so two sales can never wait
/// on each other in a cycle.
pub fn distinct_medicine_ids(lines: &[SaleLineRequest]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.medicine_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Planning
// =============================================================================

/// A medicine row and its on-hand quantity, read under the medicine's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
    pub medicine_id: String,
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub available: i64,
}

/// One sale line, priced and frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    /// 1-based position in the request.
    pub line_no: i64,
    pub medicine_id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Result of a successful stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    pub lines: Vec<PlannedLine>,
    /// Total quantity to take from each medicine, keyed in lock order.
    pub decrements: BTreeMap<String, i64>,
    pub total: Money,
}

impl SalePlan {
    pub fn units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Checks stock for every line and prices the sale.
///
/// Every medicine must be present in `stock` before any quantity is checked,
/// so an unknown medicine wins over a short line. Lines are walked in input order against a running remainder per medicine,
/// so two lines for the same medicine must fit in its stock together. The
/// first line that does not fit fails the whole plan.
pub fn plan_sale(
    lines: &[SaleLineRequest],
    stock: &HashMap<String, StockSnapshot>,
) -> CoreResult<SalePlan> {
    let mut remaining: HashMap<&str, i64> = HashMap::with_capacity(stock.len());
    let mut decrements: BTreeMap<String, i64> = BTreeMap::new();
    let mut planned = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    if let Some(missing) = lines.iter().find(|l| !stock.contains_key(&l.medicine_id)) {
        return Err(CoreError::MedicineNotFound(missing.medicine_id.clone()));
    }

    for (index, line) in lines.iter().enumerate() {
        let snapshot = stock
            .get(&line.medicine_id)
            .ok_or_else(|| CoreError::MedicineNotFound(line.medicine_id.clone()))?;

        let left = remaining
            .entry(snapshot.medicine_id.as_str())
            .or_insert(snapshot.available);

        if line.quantity > *left {
            return Err(CoreError::InsufficientStock {
                medicine_id: snapshot.medicine_id.clone(),
                code: snapshot.code.clone(),
                available: *left,
                requested: line.quantity,
            });
        }
        *left -= line.quantity;
        *decrements.entry(snapshot.medicine_id.clone()).or_insert(0) += line.quantity;

        let unit_price = Money::from_cents(snapshot.unit_price_cents);
        let line_total = unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: format!("lines[{}].quantity", index),
                min: 1,
                max: i64::MAX / snapshot.unit_price_cents.max(1),
            })?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        planned.push(PlannedLine {
            line_no: index as i64 + 1,
            medicine_id: snapshot.medicine_id.clone(),
            code: snapshot.code.clone(),
            name: snapshot.name.clone(),
            quantity: line.quantity,
            unit_price,
            line_total,
        });
    }

    Ok(SalePlan {
        lines: planned,
        decrements,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const AMOX: &str = "11111111-1111-4111-8111-111111111111";
    const IBU: &str = "22222222-2222-4222-8222-222222222222";

    fn line(id: &str, quantity: i64) -> SaleLineRequest {
        SaleLineRequest {
            medicine_id: id.to_string(),
            quantity,
        }
    }

    fn snapshot(id: &str, code: &str, price: i64, available: i64) -> (String, StockSnapshot) {
        (
            id.to_string(),
            StockSnapshot {
                medicine_id: id.to_string(),
                code: code.to_string(),
                name: format!("{} tablets", code),
                unit_price_cents: price,
                available,
            },
        )
    }

    fn stock() -> HashMap<String, StockSnapshot> {
        HashMap::from([
            snapshot(AMOX, "AMOX-500", 450, 10),
            snapshot(IBU, "IBU-200", 199, 5),
        ])
    }

    #[test]
    fn test_validate_rejects_empty_sale() {
        let err = validate_sale_request(&SaleRequest::default()).unwrap_err();
        assert!(matches!(err, ValidationError::EmptySale));
    }

    #[test]
    fn test_validate_reports_line_index() {
        let request = SaleRequest {
            lines: vec![line(AMOX, 1), line(IBU, 0)],
            notes: None,
        };
        let err = validate_sale_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "lines[1].quantity must be positive");
    }

    #[test]
    fn test_validate_rejects_bad_uuid_and_too_many_lines() {
        let request = SaleRequest {
            lines: vec![line("abc", 1)],
            notes: None,
        };
        assert!(matches!(
            validate_sale_request(&request),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let request = SaleRequest {
            lines: (0..=MAX_SALE_LINES).map(|_| line(AMOX, 1)).collect(),
            notes: None,
        };
        assert!(matches!(
            validate_sale_request(&request),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_normalises_notes() {
        let request = SaleRequest {
            lines: vec![line(&format!("  {}  ", AMOX), 2)],
            notes: Some("   ".to_string()),
        };
        let valid = validate_sale_request(&request).unwrap();
        assert_eq!(valid.lines[0].medicine_id, AMOX);
        assert_eq!(valid.notes, None);
    }

    #[test]
    fn test_distinct_ids_sorted() {
        let ids = distinct_medicine_ids(&[line(IBU, 1), line(AMOX, 1), line(IBU, 2)]);
        assert_eq!(ids, vec![AMOX.to_string(), IBU.to_string()]);
    }

    #[test]
    fn test_plan_prices_lines_in_input_order() {
        let plan = plan_sale(&[line(IBU, 2), line(AMOX, 3)], &stock()).unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].line_no, 1);
        assert_eq!(plan.lines[0].code, "IBU-200");
        assert_eq!(plan.lines[0].line_total.cents(), 398);
        assert_eq!(plan.lines[1].line_total.cents(), 1350);
        assert_eq!(plan.total.cents(), 1748);
        assert_eq!(plan.units(), 5);
        assert_eq!(plan.decrements[AMOX], 3);
        assert_eq!(plan.decrements[IBU], 2);
    }

    #[test]
    fn test_plan_checks_repeated_lines_cumulatively() {
        let err = plan_sale(&[line(AMOX, 6), line(AMOX, 6)], &stock()).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                code,
                available,
                requested,
                ..
            } => {
                assert_eq!(code, "AMOX-500");
                assert_eq!(available, 4);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let plan = plan_sale(&[line(AMOX, 6), line(AMOX, 4)], &stock()).unwrap();
        assert_eq!(plan.decrements[AMOX], 10);
    }

    #[test]
    fn test_plan_fails_on_first_short_line() {
        let err = plan_sale(&[line(AMOX, 1), line(IBU, 6)], &stock()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 6, .. }
        ));
    }

    #[test]
    fn test_plan_missing_medicine() {
        let err = plan_sale(
            &[line("33333333-3333-4333-8333-333333333333", 1)],
            &stock(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::MedicineNotFound(_)));
    }

    #[test]
    fn test_plan_unknown_medicine_wins_over_short_line() {
        let unknown = "33333333-3333-4333-8333-333333333333";
        let err = plan_sale(&[line(AMOX, 500), line(unknown, 1)], &stock()).unwrap_err();
        assert!(matches!(err, CoreError::MedicineNotFound(id) if id == unknown));
    }

    #[test]
    fn test_plan_overflow_is_validation_error() {
        let stock = HashMap::from([snapshot(AMOX, "BIG", i64::MAX, 10)]);
        let err = plan_sale(&[line(AMOX, 2)], &stock).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
