use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::{DomainError, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMode {
    #[serde(rename = "COD")]
    CashOnDelivery,
    #[serde(rename = "CARD")]
    Card,
    #[serde(rename = "UPI")]
    Upi,
}

impl PaymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::CashOnDelivery => "COD",
            PaymentMode::Card => "CARD",
            PaymentMode::Upi => "UPI",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMode::CashOnDelivery),
            "CARD" => Ok(PaymentMode::Card),
            "UPI" => Ok(PaymentMode::Upi),
            other => Err(UnknownVariant::new("payment mode", other)),
        }
    }
}

/// Fulfilment state of an order. New orders start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    Dispatched,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Dispatched => "Dispatched",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Statuses reachable in a single step from `self`.
    pub fn next_states(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Dispatched, Cancelled],
            Dispatched => &[OutForDelivery, Cancelled],
            OutForDelivery => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Dispatched" => Ok(OrderStatus::Dispatched),
            "Out for delivery" => Ok(OrderStatus::OutForDelivery),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownVariant::new("order status", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A checkout request as received from the client.
///
/// `client_total` is whatever the client believes the total to be. It is
/// never persisted; the authoritative total is recomputed from the catalog.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub address: Value,
    pub payment_mode: PaymentMode,
    pub client_total: Option<BigDecimal>,
}

/// A fully priced order, ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub address: Value,
    pub payment_mode: PaymentMode,
    pub total: BigDecimal,
    pub loyalty_points_earned: i64,
}

/// Outcome of a committed order/balance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub order_id: Uuid,
    pub new_total_points: i64,
}

#[derive(Debug, Clone)]
pub struct ProductPricing {
    pub id: Uuid,
    pub price: BigDecimal,
    pub loyalty_point_rate: i32,
}

#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub image_url: Option<String>,
    pub loyalty_point_rate: i32,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_id: Uuid,
    pub quantity: i32,
    /// `None` when the product no longer exists.
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemView>,
    pub address: Value,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub loyalty_points_earned: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderView,
    pub loyalty_points_earned: i64,
    pub new_total_points: i64,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Dispatched,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn allowed_transitions_follow_the_table() {
        use OrderStatus::*;
        let allowed = [
            (Pending, Dispatched),
            (Pending, Cancelled),
            (Dispatched, OutForDelivery),
            (Dispatched, Cancelled),
            (OutForDelivery, Delivered),
        ];

        for from in ALL {
            for to in ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(OrderStatus::Delivered.next_states().is_empty());
        assert!(OrderStatus::Cancelled.next_states().is_empty());
    }

    #[test]
    fn illegal_transition_reports_both_ends() {
        let err = OrderStatus::Delivered
            .transition_to(OrderStatus::Pending)
            .unwrap_err();
        match err {
            DomainError::InvalidTransition { from, to } => {
                assert_eq!(from, OrderStatus::Delivered);
                assert_eq!(to, OrderStatus::Pending);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_parses_its_own_label() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_label() {
        assert_eq!(
            serde_json::to_value(OrderStatus::OutForDelivery).unwrap(),
            serde_json::json!("Out for delivery")
        );
    }

    #[test]
    fn payment_mode_uses_short_codes() {
        assert_eq!(
            serde_json::from_value::<PaymentMode>(serde_json::json!("UPI")).unwrap(),
            PaymentMode::Upi
        );
        assert_eq!("COD".parse::<PaymentMode>(), Ok(PaymentMode::CashOnDelivery));
        assert_eq!(PaymentMode::Card.as_str(), "CARD");
        assert!("PAYPAL".parse::<PaymentMode>().is_err());
    }
}
