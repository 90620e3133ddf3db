//! Public configuration route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/api/config/public", get(get_public_config))
        .route("/api/config/categories", get(get_categories))
        .route("/api/config/tags", get(get_tags))
}
