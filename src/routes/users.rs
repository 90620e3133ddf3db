//! User profile route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/profile", get(get_profile).put(update_profile))
        .route("/api/user/password", put(change_password))
        .route("/api/user/email/send-code", post(send_email_change_code))
        .route("/api/user/email/verify", post(verify_email_change))
        .route("/api/user/wallet", get(get_wallet))
        .route("/api/user/purchases", get(get_purchases))
        .route("/api/user/transactions", get(get_transactions))
        .route(
            "/api/user/payout-accounts",
            get(list_payout_accounts).post(create_payout_account),
        )
        .route(
            "/api/user/payout-accounts/:id/default",
            put(set_default_payout_account),
        )
        .route("/api/user/payout-accounts/:id", delete(delete_payout_account))
}
