//! Payment route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments/methods", get(get_payment_methods))
        .route("/api/payments/qrcode/:order_id", get(get_payment_qr))
        .route("/api/payments/:payment_ref/verify", get(verify_payment))
}
