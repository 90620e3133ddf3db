//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::admin::AdminService;
use crate::auth::AuthService;
use crate::config::Config;
use crate::orders::OrderService;
use crate::payments::PaymentService;
use crate::resources::ResourceService;
use crate::settings::SettingsService;
use crate::users::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub resource_service: Arc<ResourceService>,
    pub order_service: Arc<OrderService>,
    pub payment_service: Arc<PaymentService>,
    pub settings_service: Arc<SettingsService>,
    pub admin_service: Arc<AdminService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<UserService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<ResourceService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.resource_service.clone()
    }
}

impl FromRef<AppState> for Arc<OrderService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.order_service.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.payment_service.clone()
    }
}

impl FromRef<AppState> for Arc<SettingsService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.settings_service.clone()
    }
}

impl FromRef<AppState> for Arc<AdminService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.admin_service.clone()
    }
}
