//! Resource catalog service - listings, uploads, moderation, downloads

use anyhow::{anyhow, Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    CreateResourceRequest, Paginated, PurchaseSummary, Resource, ResourceListQuery,
    ResourceProvider, ResourceSort, ResourceStatus, ResourceSummary, UpdateResourceRequest,
    UserRole,
};

use super::storage::FileStore;

/// Resource catalog service
pub struct ResourceService {
    db_pool: PgPool,
    store: FileStore,
}

/// Errors that need distinct HTTP mappings at the handler layer
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource not found")]
    NotFound,

    #[error("Not allowed to access this resource")]
    Forbidden,

    #[error("Resource has not been purchased")]
    NotPurchased,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResourceService {
    pub fn new(db_pool: PgPool, store: FileStore) -> Self {
        Self { db_pool, store }
    }

    /// Public catalog listing: approved resources with filters and paging
    pub async fn list_public(
        &self,
        query: &ResourceListQuery,
    ) -> Result<Paginated<ResourceSummary>> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * page_size;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM resources WHERE status = 'approved'");
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM resources WHERE status = 'approved'");

        for b in [&mut builder, &mut count_builder] {
            if let Some(q) = &query.q {
                let pattern = format!("%{}%", q);
                b.push(" AND (title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(category) = &query.category {
                b.push(" AND category = ").push_bind(category.clone());
            }
            if let Some(tag) = &query.tag {
                b.push(" AND ").push_bind(tag.clone()).push(" = ANY(tags)");
            }
            if let Some(min) = query.min_price {
                b.push(" AND price >= ").push_bind(min);
            }
            if let Some(max) = query.max_price {
                b.push(" AND price <= ").push_bind(max);
            }
        }

        let order = match query.sort.unwrap_or(ResourceSort::Newest) {
            ResourceSort::Newest => " ORDER BY created_at DESC",
            ResourceSort::PriceAsc => " ORDER BY price ASC",
            ResourceSort::PriceDesc => " ORDER BY price DESC",
            ResourceSort::Downloads => " ORDER BY download_count DESC",
        };
        builder
            .push(order)
            .push(" LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let resources: Vec<Resource> = builder
            .build_query_as()
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list resources")?;

        let (total,): (i64,) = count_builder
            .build_query_as()
            .fetch_one(&self.db_pool)
            .await
            .context("Failed to count resources")?;

        let items = resources.into_iter().map(ResourceSummary::from).collect();
        Ok(Paginated::new(items, total, page, page_size))
    }

    /// Load one resource enforcing visibility rules: non-approved listings
    /// are visible only to their owner and admins.
    pub async fn get_visible(
        &self,
        id: Uuid,
        viewer: Option<(Uuid, UserRole)>,
    ) -> Result<Resource, ResourceError> {
        let resource = self.get(id).await?;

        if resource.status != ResourceStatus::Approved {
            match viewer {
                Some((viewer_id, _)) if viewer_id == resource.owner_id => {}
                Some((_, UserRole::Admin)) => {}
                _ => return Err(ResourceError::NotFound),
            }
        }

        Ok(resource)
    }

    /// Load one resource with no visibility filtering
    pub async fn get(&self, id: Uuid) -> Result<Resource, ResourceError> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load resource")?
            .ok_or(ResourceError::NotFound)
    }

    /// Create a listing from metadata plus the uploaded payload.
    ///
    /// Admin uploads become platform resources (proceeds to the system
    /// account); user uploads settle to the seller and start in pending
    /// moderation.
    pub async fn create(
        &self,
        owner_id: Uuid,
        owner_role: UserRole,
        request: CreateResourceRequest,
        file_name: &str,
        content_type: Option<String>,
        data: &[u8],
    ) -> Result<Resource> {
        if data.is_empty() {
            return Err(anyhow!("Uploaded file is empty"));
        }

        let storage_name = self.store.save(file_name, data).await?;

        let (provider, status) = match owner_role {
            UserRole::Admin => (ResourceProvider::Platform, ResourceStatus::Approved),
            UserRole::User => (ResourceProvider::User, ResourceStatus::Pending),
        };

        let resource: Resource = sqlx::query_as(
            r#"
            INSERT INTO resources (
                id, owner_id, title, description, detail_description, specifications,
                usage_guide, precautions, display_images, file_name, storage_name,
                file_size, content_type, price, category, tags, status, provider
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.detail_description)
        .bind(&request.specifications)
        .bind(&request.usage_guide)
        .bind(&request.precautions)
        .bind(&request.display_images)
        .bind(file_name)
        .bind(&storage_name)
        .bind(data.len() as i64)
        .bind(&content_type)
        .bind(request.price)
        .bind(&request.category)
        .bind(&request.tags)
        .bind(status)
        .bind(provider)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to insert resource")?;

        tracing::info!(resource_id = %resource.id, owner_id = %owner_id, "Resource uploaded");
        Ok(resource)
    }

    /// Owner update; any change sends the listing back to moderation
    pub async fn update(
        &self,
        id: Uuid,
        caller_id: Uuid,
        request: UpdateResourceRequest,
    ) -> Result<Resource, ResourceError> {
        let existing = self.get(id).await?;
        if existing.owner_id != caller_id {
            return Err(ResourceError::Forbidden);
        }

        let resource: Resource = sqlx::query_as(
            r#"
            UPDATE resources
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                detail_description = COALESCE($3, detail_description),
                specifications = COALESCE($4, specifications),
                usage_guide = COALESCE($5, usage_guide),
                precautions = COALESCE($6, precautions),
                display_images = COALESCE($7, display_images),
                price = COALESCE($8, price),
                category = COALESCE($9, category),
                tags = COALESCE($10, tags),
                status = 'pending',
                updated_at = NOW()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.detail_description)
        .bind(request.specifications)
        .bind(request.usage_guide)
        .bind(request.precautions)
        .bind(request.display_images)
        .bind(request.price)
        .bind(request.category)
        .bind(request.tags)
        .bind(id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ResourceError::Other(anyhow!("Failed to update resource: {}", e)))?;

        Ok(resource)
    }

    /// Delete a listing and its stored file (owner or admin)
    pub async fn delete(
        &self,
        id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> Result<(), ResourceError> {
        let existing = self.get(id).await?;
        if existing.owner_id != caller_id && caller_role != UserRole::Admin {
            return Err(ResourceError::Forbidden);
        }

        sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Failed to delete resource")?;

        self.store.remove(&existing.storage_name).await?;

        tracing::info!(resource_id = %id, "Resource deleted");
        Ok(())
    }

    /// Purchase-gated download; owners and admins bypass the purchase check.
    /// Returns the payload plus (file_name, content_type) and bumps the
    /// download counter.
    pub async fn download(
        &self,
        id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> Result<(Vec<u8>, String, Option<String>), ResourceError> {
        let resource = self.get(id).await?;

        let bypass = resource.owner_id == caller_id || caller_role == UserRole::Admin;
        if !bypass {
            if resource.status != ResourceStatus::Approved {
                return Err(ResourceError::NotFound);
            }
            if !self.has_purchased(caller_id, id).await? {
                return Err(ResourceError::NotPurchased);
            }
        }

        let data = self.store.read(&resource.storage_name).await?;

        sqlx::query("UPDATE resources SET download_count = download_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Failed to bump download count")?;

        Ok((data, resource.file_name, resource.content_type))
    }

    /// Whether the user holds a paid/completed order for the resource
    pub async fn has_purchased(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE user_id = $1 AND resource_id = $2 AND status IN ('paid', 'completed')
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to check purchase")?;

        Ok(count > 0)
    }

    /// Everything the user has bought, newest first
    pub async fn list_purchases(&self, user_id: Uuid) -> Result<Vec<PurchaseSummary>> {
        let rows: Vec<(Uuid, Uuid, Option<String>, rust_decimal::Decimal, chrono::DateTime<chrono::Utc>)> =
            sqlx::query_as(
                r#"
                SELECT o.id, o.resource_id, r.title, o.amount, o.updated_at
                FROM orders o
                LEFT JOIN resources r ON r.id = o.resource_id
                WHERE o.user_id = $1 AND o.status IN ('paid', 'completed')
                ORDER BY o.updated_at DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list purchases")?;

        Ok(rows
            .into_iter()
            .map(
                |(order_id, resource_id, title, amount, purchased_at)| PurchaseSummary {
                    order_id,
                    resource_id,
                    resource_title: title.unwrap_or_else(|| "[deleted resource]".to_string()),
                    amount,
                    purchased_at,
                },
            )
            .collect())
    }

    /// Listings owned by the caller, any status
    pub async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Resource>> {
        sqlx::query_as("SELECT * FROM resources WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list owned resources")
    }
}
