//! Order models
//!
//! Order status transitions are owned by the server: clients only request
//! creation, payment, and cancellation, and poll for the result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Order record
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resource_id: Uuid,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order status machine
///
/// pending -> paid | completed | cancelled | failed
/// paid -> completed | refunded
/// completed -> refunded
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// Whether a transition to `next` is allowed
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Pending, Failed)
                | (Paid, Completed)
                | (Paid, Refunded)
                | (Completed, Refunded)
        )
    }

    /// Whether the order counts as an active purchase
    pub fn is_purchase(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Completed)
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Create an order for a resource
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub resource_id: Uuid,
    pub payment_method: Option<String>,
}

/// Order list filters
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Order rendered for clients
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resource_id: Uuid,
    pub resource_title: String,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_order(order: Order, resource_title: String) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            resource_id: order.resource_id,
            resource_title,
            amount: order.amount,
            status: order.status,
            payment_method: order.payment_method,
            payment_ref: order.payment_ref,
            expires_at: order.expires_at,
            completed_at: order.completed_at,
            created_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Failed));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Refunded));
        assert!(OrderStatus::Completed.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Refunded.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Paid));
    }

    #[test]
    fn test_purchase_statuses() {
        assert!(OrderStatus::Paid.is_purchase());
        assert!(OrderStatus::Completed.is_purchase());
        assert!(!OrderStatus::Pending.is_purchase());
        assert!(!OrderStatus::Refunded.is_purchase());
    }
}
