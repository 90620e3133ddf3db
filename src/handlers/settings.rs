//! Public configuration HTTP handlers

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::models::{Category, PublicConfigResponse, Tag};
use crate::state::AppState;

/// GET /api/config/public - Site configuration for the portal
pub async fn get_public_config(
    State(state): State<AppState>,
) -> Result<Json<PublicConfigResponse>, ApiError> {
    let config = state.settings_service.public_config().await?;
    Ok(Json(config))
}

/// GET /api/config/categories - Category catalog
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.settings_service.categories().await?;
    Ok(Json(categories))
}

/// GET /api/config/tags - Tag catalog
pub async fn get_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.settings_service.tags().await?;
    Ok(Json(tags))
}
