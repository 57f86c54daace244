//! Server-side pricing of a cart against the product catalog.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{DomainError, UnknownVariant};
use super::order::{LineItem, ProductPricing};

/// What to do with a line item whose product is not in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedProductPolicy {
    /// Leave the item out of the totals and place the order anyway.
    #[default]
    Skip,
    /// Refuse the whole order.
    Reject,
}

impl FromStr for UnresolvedProductPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(UnresolvedProductPolicy::Skip),
            "reject" => Ok(UnresolvedProductPolicy::Reject),
            _ => Err(UnknownVariant::new("unresolved product policy", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub total: BigDecimal,
    pub loyalty_points: i64,
    /// Distinct product ids that could not be priced, in first-seen order.
    pub unresolved: Vec<Uuid>,
}

/// Reject carts that must never reach the database.
pub fn validate(items: &[LineItem], address: &Value) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidOrderInput(
            "order must contain at least one item".to_string(),
        ));
    }
    if let Some(item) = items.iter().find(|i| i.quantity <= 0) {
        return Err(DomainError::InvalidOrderInput(format!(
            "quantity for product {} must be positive, got {}",
            item.product_id, item.quantity
        )));
    }
    if address.is_null() {
        return Err(DomainError::InvalidOrderInput(
            "shipping address is required".to_string(),
        ));
    }
    Ok(())
}

/// Product ids referenced by `items`, each once, in first-seen order.
pub fn distinct_product_ids(items: &[LineItem]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .map(|i| i.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Sum `price × quantity` and `rate × quantity` over every item whose product
/// appears in `catalog`.
/// Largest total an order row can hold (`NUMERIC(14,2)`).
pub fn max_order_total() -> BigDecimal {
    BigDecimal::new(99_999_999_999_999i64.into(), 2)
}

pub fn price_items(
    items: &[LineItem],
    catalog: &[ProductPricing],
    policy: UnresolvedProductPolicy,
) -> Result<OrderTotals, DomainError> {
    let by_id: HashMap<Uuid, &ProductPricing> = catalog.iter().map(|p| (p.id, p)).collect();

    let mut total = BigDecimal::from(0);
    let mut loyalty_points: i64 = 0;
    let mut unresolved: Vec<Uuid> = Vec::new();

    for item in items {
        let Some(product) = by_id.get(&item.product_id) else {
            if !unresolved.contains(&item.product_id) {
                unresolved.push(item.product_id);
            }
            continue;
        };

        total += &product.price * &BigDecimal::from(item.quantity);
        if total > max_order_total() {
            return Err(DomainError::InvalidOrderInput(format!(
                "order total exceeds {}",
                max_order_total()
            )));
        }

        let earned = i64::from(product.loyalty_point_rate) * i64::from(item.quantity);
        loyalty_points = loyalty_points.checked_add(earned).ok_or_else(|| {
            DomainError::InvalidOrderInput("loyalty points overflow".to_string())
        })?;
    }

    if policy == UnresolvedProductPolicy::Reject && !unresolved.is_empty() {
        return Err(DomainError::ProductResolutionGap(unresolved));
    }

    Ok(OrderTotals {
        total,
        loyalty_points,
        unresolved,
    })
}
