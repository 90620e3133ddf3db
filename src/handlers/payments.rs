//! Payment HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    PayOrderRequest, PayOrderResponse, PaymentMethodInfo, PaymentQrResponse,
    VerifyPaymentResponse,
};
use crate::state::AppState;

/// GET /api/payments/methods - Payment rails offered at checkout
pub async fn get_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethodInfo>>, ApiError> {
    let methods = state.payment_service.methods().await?;
    Ok(Json(methods))
}

/// POST /api/orders/:id/pay - Start payment on a pending order
pub async fn pay_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PayOrderRequest>,
) -> Result<Json<PayOrderResponse>, ApiError> {
    let response = state.payment_service.pay(id, user.user_id, req).await?;
    Ok(Json(response))
}

/// GET /api/payments/:payment_ref/verify - Poll a payment's status
pub async fn verify_payment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(payment_ref): Path<String>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let response = state.payment_service.verify(&payment_ref).await?;
    Ok(Json(response))
}

/// GET /api/payments/qrcode/:order_id - Re-issue the QR for a USDT order
pub async fn get_payment_qr(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<PaymentQrResponse>, ApiError> {
    let response = state
        .payment_service
        .qr_for_order(order_id, user.user_id)
        .await?;
    Ok(Json(response))
}
