//! Resource catalog HTTP handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::models::{
    CreateResourceRequest, Paginated, ResourceDetail, ResourceListQuery, ResourceSummary,
    UpdateResourceRequest,
};
use crate::state::AppState;

/// GET /api/resources - Public catalog listing
pub async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceListQuery>,
) -> Result<Json<Paginated<ResourceSummary>>, ApiError> {
    let page = state.resource_service.list_public(&query).await?;
    Ok(Json(page))
}

/// GET /api/resources/mine - Caller's own listings, any status
pub async fn list_own_resources(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ResourceDetail>>, ApiError> {
    let resources = state.resource_service.list_owned(user.user_id).await?;
    Ok(Json(resources.into_iter().map(ResourceDetail::from).collect()))
}

/// GET /api/resources/:id - Resource detail
pub async fn get_resource(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceDetail>, ApiError> {
    let viewer = viewer.map(|u| (u.user_id, u.role));
    let resource = state.resource_service.get_visible(id, viewer).await?;
    Ok(Json(resource.into()))
}

/// POST /api/resources - Upload a resource (multipart: metadata + file)
pub async fn upload_resource(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResourceDetail>), ApiError> {
    let mut metadata: Option<CreateResourceRequest> = None;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("metadata") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid metadata: {}", e)))?;
                metadata = Some(serde_json::from_str(&text)?);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::BadRequest("File name required".to_string()))?;
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    let metadata =
        metadata.ok_or_else(|| ApiError::BadRequest("metadata field required".to_string()))?;
    metadata.validate()?;

    let (file_name, content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("file field required".to_string()))?;

    if data.len() > state.config.max_upload_bytes {
        return Err(ApiError::BadRequest("Uploaded file too large".to_string()));
    }

    let resource = state
        .resource_service
        .create(user.user_id, user.role, metadata, &file_name, content_type, &data)
        .await?;

    Ok((StatusCode::CREATED, Json(resource.into())))
}

/// PUT /api/resources/:id - Owner update (re-enters moderation)
pub async fn update_resource(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceDetail>, ApiError> {
    req.validate()?;

    let resource = state
        .resource_service
        .update(id, user.user_id, req)
        .await?;

    Ok(Json(resource.into()))
}

/// DELETE /api/resources/:id - Owner (or admin) delete
pub async fn delete_resource(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .resource_service
        .delete(id, user.user_id, user.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/resources/:id/download - Purchase-gated file download
pub async fn download_resource(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (data, file_name, content_type) = state
        .resource_service
        .download(id, user.user_id, user.role)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    let mut response = Response::new(Body::from(data));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().extend(headers);
    Ok(response)
}
