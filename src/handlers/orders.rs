//! Order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{CreateOrderRequest, OrderListQuery, OrderResponse, Paginated};
use crate::state::AppState;

/// POST /api/orders - Create a pending order
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.order_service.create(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - Caller's orders
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Paginated<OrderResponse>>, ApiError> {
    let page = state
        .order_service
        .list_for_user(user.user_id, &query)
        .await?;
    Ok(Json(page))
}

/// GET /api/orders/:id - Order detail
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .order_service
        .get_response(id, Some(user.user_id))
        .await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/cancel - Cancel a pending order
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.order_service.cancel(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
