//! Resource catalog route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/resources",
            get(list_resources).post(upload_resource),
        )
        .route("/api/resources/mine", get(list_own_resources))
        .route(
            "/api/resources/:id",
            get(get_resource)
                .put(update_resource)
                .delete(delete_resource),
        )
        .route("/api/resources/:id/download", get(download_resource))
}
