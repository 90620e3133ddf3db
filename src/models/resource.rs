//! Resource catalog models
//!
//! A resource is a purchasable digital artifact: the uploaded file plus the
//! listing fields the portal renders (detail description, specifications,
//! usage guide, display images).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Resource record
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Resource {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub detail_description: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub usage_guide: Option<String>,
    pub precautions: Option<String>,
    pub display_images: Vec<String>,
    pub file_name: String,
    pub storage_name: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: ResourceStatus,
    pub provider: ResourceProvider,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Moderation lifecycle
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "resource_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Pending,
    Approved,
    Rejected,
}

/// Who receives the proceeds of a sale
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "resource_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceProvider {
    /// Listed by the platform; sale proceeds go to the system account
    Platform,
    /// Listed by a user; proceeds settle to the seller minus commission
    User,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Listing metadata submitted alongside the uploaded file
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub detail_description: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub usage_guide: Option<String>,
    pub precautions: Option<String>,
    #[serde(default)]
    pub display_images: Vec<String>,
    pub price: Decimal,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial listing update (owner only; resets moderation to pending)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    pub detail_description: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub usage_guide: Option<String>,
    pub precautions: Option<String>,
    pub display_images: Option<Vec<String>>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Catalog listing filters
#[derive(Debug, Deserialize)]
pub struct ResourceListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<ResourceSort>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Catalog sort orders
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSort {
    Newest,
    PriceAsc,
    PriceDesc,
    Downloads,
}

/// Public listing card
#[derive(Debug, Serialize)]
pub struct ResourceSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub display_images: Vec<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Resource> for ResourceSummary {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            display_images: r.display_images,
            price: r.price,
            category: r.category,
            tags: r.tags,
            download_count: r.download_count,
            created_at: r.created_at,
        }
    }
}

/// Full resource detail
#[derive(Debug, Serialize)]
pub struct ResourceDetail {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub detail_description: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub usage_guide: Option<String>,
    pub precautions: Option<String>,
    pub display_images: Vec<String>,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: ResourceStatus,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Resource> for ResourceDetail {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            title: r.title,
            description: r.description,
            detail_description: r.detail_description,
            specifications: r.specifications,
            usage_guide: r.usage_guide,
            precautions: r.precautions,
            display_images: r.display_images,
            file_name: r.file_name,
            file_size: r.file_size,
            content_type: r.content_type,
            price: r.price,
            category: r.category,
            tags: r.tags,
            status: r.status,
            download_count: r.download_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A purchase the current user holds
#[derive(Debug, Serialize)]
pub struct PurchaseSummary {
    pub order_id: Uuid,
    pub resource_id: Uuid,
    pub resource_title: String,
    pub amount: Decimal,
    pub purchased_at: DateTime<Utc>,
}
