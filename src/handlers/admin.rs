//! Admin console HTTP handlers
//!
//! All endpoints except login require the admin role via the `AdminUser`
//! extractor.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AdminUser;
use crate::models::{
    AdminResourceListQuery, AdminUpdateUserRequest, AdminUserListQuery, AuthTokensResponse,
    ChainSettings, DashboardStats, LoginRequest, OrderListQuery, OrderResponse, Paginated,
    PaymentMethodEntry, PaypalSettings, Resource, ResourceDetail, ResourceStats, RevenueStats,
    SiteSetting, UpdateChainSettingsRequest, UpdateOrderStatusRequest, UpdatePaymentMethodRequest,
    UpdatePaypalSettingsRequest, UpdateSiteSettingsRequest, UserResponse, UserStats,
};
use crate::state::AppState;

use super::auth::client_meta;

/// POST /api/admin/auth/login - Admin login (rejects non-admin accounts)
pub async fn admin_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    req.validate()?;

    let (ip, user_agent) = client_meta(&headers);
    let tokens = state
        .auth_service
        .admin_login(&req.email, &req.password, ip, user_agent)
        .await?;

    Ok(Json(tokens))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/admin/users - List users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminUserListQuery>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    let page = state.admin_service.list_users(&query).await?;
    Ok(Json(page))
}

/// GET /api/admin/users/:id - User detail
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.admin_service.get_user(id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/admin/users/:id - Edit a user record
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let user = state.admin_service.update_user(id, req).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/admin/users/:id - Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.admin_service.delete_user(id, admin.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/users/:id/ban - Ban a user and revoke their sessions
pub async fn ban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.admin_service.ban_user(id).await?;
    Ok(Json(user.into()))
}

/// POST /api/admin/users/:id/unban - Restore a banned user
pub async fn unban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.admin_service.unban_user(id).await?;
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// GET /api/admin/resources - List resources across all statuses
pub async fn list_resources(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminResourceListQuery>,
) -> Result<Json<Paginated<Resource>>, ApiError> {
    let page = state.admin_service.list_resources(&query).await?;
    Ok(Json(page))
}

/// GET /api/admin/resources/:id - Resource detail
pub async fn get_resource(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceDetail>, ApiError> {
    let resource = state.resource_service.get(id).await?;
    Ok(Json(resource.into()))
}

/// DELETE /api/admin/resources/:id - Remove a listing and its file
pub async fn delete_resource(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .resource_service
        .delete(id, admin.user_id, admin.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/resources/:id/approve - Approve a pending listing
pub async fn approve_resource(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceDetail>, ApiError> {
    let resource = state.admin_service.approve_resource(id).await?;
    Ok(Json(resource.into()))
}

/// POST /api/admin/resources/:id/reject - Reject a pending listing
pub async fn reject_resource(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceDetail>, ApiError> {
    let resource = state.admin_service.reject_resource(id).await?;
    Ok(Json(resource.into()))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// GET /api/admin/orders - List all orders
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Paginated<OrderResponse>>, ApiError> {
    let page = state.order_service.list_all(&query).await?;
    Ok(Json(page))
}

/// GET /api/admin/orders/:id - Order detail
pub async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.get_response(id, None).await?;
    Ok(Json(order))
}

/// PUT /api/admin/orders/:id/status - Force a status transition
pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    state.order_service.transition(id, req.status).await?;
    let order = state.order_service.get_response(id, None).await?;
    Ok(Json(order))
}

/// POST /api/admin/orders/:id/refund - Refund a paid/completed order
pub async fn refund_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    state.payment_service.refund(id).await?;
    let order = state.order_service.get_response(id, None).await?;
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// Payment configuration
// ---------------------------------------------------------------------------

/// GET /api/admin/config/paypal - Current PayPal settings (secret omitted)
pub async fn get_paypal_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Option<PaypalSettings>>, ApiError> {
    let settings = state.settings_service.paypal().await?;
    Ok(Json(settings))
}

/// PUT /api/admin/config/paypal - Update PayPal settings
pub async fn update_paypal_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UpdatePaypalSettingsRequest>,
) -> Result<Json<PaypalSettings>, ApiError> {
    req.validate()?;

    let settings = state
        .settings_service
        .update_paypal(req)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(settings))
}

/// GET /api/admin/config/blockchain - All configured networks
pub async fn list_chain_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ChainSettings>>, ApiError> {
    let settings = state.settings_service.chains().await?;
    Ok(Json(settings))
}

/// PUT /api/admin/config/blockchain/:network - Update one network
pub async fn update_chain_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(network): Path<String>,
    Json(req): Json<UpdateChainSettingsRequest>,
) -> Result<Json<ChainSettings>, ApiError> {
    req.validate()?;

    let settings = state
        .settings_service
        .update_chain(&network, req)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(settings))
}

/// GET /api/admin/config/payment-methods - Checkout method catalog
pub async fn list_payment_methods(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PaymentMethodEntry>>, ApiError> {
    let methods = state.settings_service.payment_methods().await?;
    Ok(Json(methods))
}

/// PUT /api/admin/config/payment-methods/:method_id - Update a catalog entry
pub async fn update_payment_method(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(method_id): Path<String>,
    Json(req): Json<UpdatePaymentMethodRequest>,
) -> Result<Json<PaymentMethodEntry>, ApiError> {
    req.validate()?;

    let entry = state
        .settings_service
        .update_payment_method(&method_id, req)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(entry))
}

// ---------------------------------------------------------------------------
// Site configuration
// ---------------------------------------------------------------------------

/// GET /api/admin/config - All site settings
pub async fn get_site_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<SiteSetting>>, ApiError> {
    let settings = state.settings_service.site_settings().await?;
    Ok(Json(settings))
}

/// PUT /api/admin/config - Batch update site settings
pub async fn update_site_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UpdateSiteSettingsRequest>,
) -> Result<StatusCode, ApiError> {
    state.settings_service.update_site_settings(req).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// GET /api/admin/stats/dashboard - Summary cards
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = state.admin_service.dashboard_stats().await?;
    Ok(Json(stats))
}

/// GET /api/admin/stats/users - Signup series
pub async fn user_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.admin_service.user_stats().await?;
    Ok(Json(stats))
}

/// GET /api/admin/stats/revenue - Revenue series
pub async fn revenue_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<RevenueStats>, ApiError> {
    let stats = state.admin_service.revenue_stats().await?;
    Ok(Json(stats))
}

/// GET /api/admin/stats/resources - Catalog breakdown
pub async fn resource_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ResourceStats>, ApiError> {
    let stats = state.admin_service.resource_stats().await?;
    Ok(Json(stats))
}
