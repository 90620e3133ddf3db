//! Admin console route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::admin;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth/login", post(admin::admin_login))
        // Users
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/api/admin/users/:id/ban", post(admin::ban_user))
        .route("/api/admin/users/:id/unban", post(admin::unban_user))
        // Resources
        .route("/api/admin/resources", get(admin::list_resources))
        .route(
            "/api/admin/resources/:id",
            get(admin::get_resource).delete(admin::delete_resource),
        )
        .route(
            "/api/admin/resources/:id/approve",
            post(admin::approve_resource),
        )
        .route(
            "/api/admin/resources/:id/reject",
            post(admin::reject_resource),
        )
        // Orders
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/:id", get(admin::get_order))
        .route(
            "/api/admin/orders/:id/status",
            put(admin::update_order_status),
        )
        .route("/api/admin/orders/:id/refund", post(admin::refund_order))
        // Payment configuration
        .route(
            "/api/admin/config/paypal",
            get(admin::get_paypal_settings).put(admin::update_paypal_settings),
        )
        .route(
            "/api/admin/config/blockchain",
            get(admin::list_chain_settings),
        )
        .route(
            "/api/admin/config/blockchain/:network",
            put(admin::update_chain_settings),
        )
        .route(
            "/api/admin/config/payment-methods",
            get(admin::list_payment_methods),
        )
        .route(
            "/api/admin/config/payment-methods/:method_id",
            put(admin::update_payment_method),
        )
        // Site configuration
        .route(
            "/api/admin/config",
            get(admin::get_site_settings).put(admin::update_site_settings),
        )
        // Statistics
        .route("/api/admin/stats/dashboard", get(admin::dashboard_stats))
        .route("/api/admin/stats/users", get(admin::user_stats))
        .route("/api/admin/stats/revenue", get(admin::revenue_stats))
        .route("/api/admin/stats/resources", get(admin::resource_stats))
}
