//! Order service - purchase lifecycle
//!
//! Creation snapshots the resource price and stamps an expiry; all status
//! changes go through `transition`, which enforces the status machine.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    CreateOrderRequest, Order, OrderListQuery, OrderResponse, OrderStatus, Paginated,
    ResourceStatus,
};

/// Errors that need distinct HTTP mappings at the handler layer
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Resource is not available for purchase")]
    ResourceNotAvailable,

    #[error("Resource already purchased")]
    AlreadyPurchased,

    #[error("An unpaid order for this resource already exists")]
    DuplicatePending,

    #[error("Not allowed to access this order")]
    Forbidden,

    #[error("Order is expired")]
    Expired,

    #[error("Invalid status transition: {0} -> {1}")]
    InvalidTransition(String, String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Order lifecycle service
pub struct OrderService {
    db_pool: PgPool,
    order_ttl_minutes: i64,
}

impl OrderService {
    pub fn new(db_pool: PgPool, order_ttl_minutes: i64) -> Self {
        Self {
            db_pool,
            order_ttl_minutes,
        }
    }

    /// Create a pending order for a resource
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        let resource: Option<(String, rust_decimal::Decimal, ResourceStatus)> =
            sqlx::query_as("SELECT title, price, status FROM resources WHERE id = $1")
                .bind(request.resource_id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Failed to load resource")?;

        let (title, price, status) = resource.ok_or(OrderError::ResourceNotFound)?;
        if status != ResourceStatus::Approved {
            return Err(OrderError::ResourceNotAvailable);
        }

        let (active,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE user_id = $1 AND resource_id = $2 AND status IN ('paid', 'completed')
            "#,
        )
        .bind(user_id)
        .bind(request.resource_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to check existing purchase")?;
        if active > 0 {
            return Err(OrderError::AlreadyPurchased);
        }

        let (open,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE user_id = $1 AND resource_id = $2 AND status = 'pending' AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .bind(request.resource_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to check open orders")?;
        if open > 0 {
            return Err(OrderError::DuplicatePending);
        }

        let expires_at = Utc::now() + Duration::minutes(self.order_ttl_minutes);

        let order: Order = sqlx::query_as(
            r#"
            INSERT INTO orders (id, user_id, resource_id, amount, status, payment_method, expires_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.resource_id)
        .bind(price)
        .bind(&request.payment_method)
        .bind(expires_at)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to insert order")?;

        tracing::info!(order_id = %order.id, user_id = %user_id, "Order created");
        Ok(OrderResponse::from_order(order, title))
    }

    /// Load one order; `viewer` of None means no ownership check (admin path)
    pub async fn get(&self, order_id: Uuid, viewer: Option<Uuid>) -> Result<Order, OrderError> {
        let order: Order = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load order")?
            .ok_or(OrderError::NotFound)?;

        if let Some(viewer_id) = viewer {
            if order.user_id != viewer_id {
                return Err(OrderError::Forbidden);
            }
        }

        Ok(order)
    }

    /// Order detail with the resource title resolved
    pub async fn get_response(
        &self,
        order_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<OrderResponse, OrderError> {
        let order = self.get(order_id, viewer).await?;
        let title = self.resource_title(order.resource_id).await?;
        Ok(OrderResponse::from_order(order, title))
    }

    /// List one user's orders with filters and paging
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &OrderListQuery,
    ) -> Result<Paginated<OrderResponse>> {
        self.list_filtered(Some(user_id), query).await
    }

    /// List all orders (admin)
    pub async fn list_all(&self, query: &OrderListQuery) -> Result<Paginated<OrderResponse>> {
        self.list_filtered(None, query).await
    }

    async fn list_filtered(
        &self,
        user_id: Option<Uuid>,
        query: &OrderListQuery,
    ) -> Result<Paginated<OrderResponse>> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * page_size;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM orders WHERE TRUE");
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE TRUE");

        for b in [&mut builder, &mut count_builder] {
            if let Some(uid) = user_id {
                b.push(" AND user_id = ").push_bind(uid);
            }
            if let Some(status) = query.status {
                b.push(" AND status = ").push_bind(status);
            }
            if let Some(start) = query.start_date {
                b.push(" AND created_at >= ").push_bind(start);
            }
            if let Some(end) = query.end_date {
                b.push(" AND created_at <= ").push_bind(end);
            }
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let orders: Vec<Order> = builder
            .build_query_as()
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list orders")?;

        let (total,): (i64,) = count_builder
            .build_query_as()
            .fetch_one(&self.db_pool)
            .await
            .context("Failed to count orders")?;

        let mut items = Vec::with_capacity(orders.len());
        for order in orders {
            let title = self.resource_title(order.resource_id).await?;
            items.push(OrderResponse::from_order(order, title));
        }

        Ok(Paginated::new(items, total, page, page_size))
    }

    /// User-initiated cancellation of a pending order
    pub async fn cancel(&self, order_id: Uuid, user_id: Uuid) -> Result<(), OrderError> {
        let order = self.get(order_id, Some(user_id)).await?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition(
                format!("{:?}", order.status).to_lowercase(),
                "cancelled".to_string(),
            ));
        }

        self.transition(order_id, OrderStatus::Cancelled).await?;
        Ok(())
    }

    /// Apply a guarded status transition
    pub async fn transition(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, OrderError> {
        let order = self.get(order_id, None).await?;

        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition(
                format!("{:?}", order.status).to_lowercase(),
                format!("{:?}", next).to_lowercase(),
            ));
        }

        let completed_at = matches!(next, OrderStatus::Completed).then(Utc::now);

        let order: Order = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $1,
                completed_at = COALESCE($2, completed_at),
                updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(next)
        .bind(completed_at)
        .bind(order_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update order status")?;

        tracing::info!(order_id = %order_id, status = ?next, "Order status changed");
        Ok(order)
    }

    /// Record the chosen payment method and provider reference on the order
    pub async fn attach_payment(
        &self,
        order_id: Uuid,
        payment_method: &str,
        payment_ref: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET payment_method = $1, payment_ref = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(payment_method)
        .bind(payment_ref)
        .bind(order_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to attach payment info")?;
        Ok(())
    }

    /// Cancel pending orders past their expiry; returns how many were swept
    pub async fn cancel_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled', notes = 'expired', updated_at = NOW()
            WHERE status = 'pending' AND expires_at < NOW()
            "#,
        )
        .execute(&self.db_pool)
        .await
        .context("Failed to sweep expired orders")?;

        Ok(result.rows_affected())
    }

    async fn resource_title(&self, resource_id: Uuid) -> Result<String> {
        let title: Option<(String,)> = sqlx::query_as("SELECT title FROM resources WHERE id = $1")
            .bind(resource_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load resource title")?;

        // Orders must keep rendering after their resource is deleted
        Ok(title
            .map(|(t,)| t)
            .unwrap_or_else(|| "[deleted resource]".to_string()))
    }

    /// Reject payment attempts on orders already past expiry, cancelling as
    /// a side effect so the sweep cannot race a late payment.
    pub async fn ensure_payable(&self, order: &Order) -> Result<(), OrderError> {
        if order.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition(
                format!("{:?}", order.status).to_lowercase(),
                "paid".to_string(),
            ));
        }

        if order.expires_at < Utc::now() {
            self.transition(order.id, OrderStatus::Cancelled).await?;
            return Err(OrderError::Expired);
        }

        Ok(())
    }
}
