//! Admin service - user management, moderation, and statistics

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use sqlx::types::chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    AdminResourceListQuery, AdminUpdateUserRequest, AdminUserListQuery, CategoryCount, DailyCount,
    DailyRevenue, DashboardStats, Paginated, Resource, ResourceStats, ResourceStatus, RevenueStats,
    StatusCount, TopResource, User, UserResponse, UserStats, UserStatus,
};

/// Errors that need distinct HTTP mappings at the handler layer
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("User not found")]
    UserNotFound,

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Cannot modify another admin account")]
    AdminTarget,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Admin service
pub struct AdminService {
    db_pool: PgPool,
}

impl AdminService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// List users with search and filters
    pub async fn list_users(&self, query: &AdminUserListQuery) -> Result<Paginated<UserResponse>> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE TRUE");

        for b in [&mut builder, &mut count_builder] {
            if let Some(q) = &query.q {
                let pattern = format!("%{}%", q);
                b.push(" AND (email ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR username ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(status) = query.status {
                b.push(" AND status = ").push_bind(status);
            }
            if let Some(role) = query.role {
                b.push(" AND role = ").push_bind(role);
            }
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind((page - 1) * page_size);

        let users: Vec<User> = builder
            .build_query_as()
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list users")?;

        let (total,): (i64,) = count_builder
            .build_query_as()
            .fetch_one(&self.db_pool)
            .await
            .context("Failed to count users")?;

        let items = users.into_iter().map(UserResponse::from).collect();
        Ok(Paginated::new(items, total, page, page_size))
    }

    /// Load one user
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AdminError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load user")?
            .ok_or(AdminError::UserNotFound)
    }

    /// Admin edit of a user record
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: AdminUpdateUserRequest,
    ) -> Result<User, AdminError> {
        // Existence check first for a clean 404
        self.get_user(user_id).await?;

        let user: User = sqlx::query_as(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                role = COALESCE($3, role),
                status = COALESCE($4, status),
                level = COALESCE($5, level),
                balance = COALESCE($6, balance),
                updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(request.username)
        .bind(request.email)
        .bind(request.role)
        .bind(request.status)
        .bind(request.level)
        .bind(request.balance)
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update user")?;

        tracing::info!(user_id = %user_id, "User updated by admin");
        Ok(user)
    }

    /// Delete a user account outright
    pub async fn delete_user(&self, user_id: Uuid, acting_admin: Uuid) -> Result<(), AdminError> {
        let user = self.get_user(user_id).await?;

        if user.role == crate::models::UserRole::Admin && user.id != acting_admin {
            return Err(AdminError::AdminTarget);
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to delete user")?;

        tracing::info!(user_id = %user_id, "User deleted by admin");
        Ok(())
    }

    /// Ban a user and revoke every live session
    pub async fn ban_user(&self, user_id: Uuid) -> Result<User, AdminError> {
        let user = self.set_user_status(user_id, UserStatus::Banned).await?;

        sqlx::query(
            "UPDATE auth_sessions SET revoked = TRUE, revoked_at = NOW() WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to revoke sessions")?;

        tracing::info!(user_id = %user_id, "User banned");
        Ok(user)
    }

    /// Restore a banned user
    pub async fn unban_user(&self, user_id: Uuid) -> Result<User, AdminError> {
        let user = self.set_user_status(user_id, UserStatus::Active).await?;
        tracing::info!(user_id = %user_id, "User unbanned");
        Ok(user)
    }

    async fn set_user_status(
        &self,
        user_id: Uuid,
        status: UserStatus,
    ) -> Result<User, AdminError> {
        let user: Option<User> = sqlx::query_as(
            "UPDATE users SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to update user status")?;

        user.ok_or(AdminError::UserNotFound)
    }

    // ------------------------------------------------------------------
    // Resource moderation
    // ------------------------------------------------------------------

    /// List resources across all statuses
    pub async fn list_resources(
        &self,
        query: &AdminResourceListQuery,
    ) -> Result<Paginated<Resource>> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM resources WHERE TRUE");
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM resources WHERE TRUE");

        for b in [&mut builder, &mut count_builder] {
            if let Some(q) = &query.q {
                let pattern = format!("%{}%", q);
                b.push(" AND title ILIKE ").push_bind(pattern);
            }
            if let Some(status) = query.status {
                b.push(" AND status = ").push_bind(status);
            }
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind((page - 1) * page_size);

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

        Ok(Paginated::new(resources, total, page, page_size))
    }

    /// Approve a pending resource
    pub async fn approve_resource(&self, resource_id: Uuid) -> Result<Resource, AdminError> {
        self.set_resource_status(resource_id, ResourceStatus::Approved)
            .await
    }

    /// Reject a pending resource
    pub async fn reject_resource(&self, resource_id: Uuid) -> Result<Resource, AdminError> {
        self.set_resource_status(resource_id, ResourceStatus::Rejected)
            .await
    }

    async fn set_resource_status(
        &self,
        resource_id: Uuid,
        status: ResourceStatus,
    ) -> Result<Resource, AdminError> {
        let resource: Option<Resource> = sqlx::query_as(
            "UPDATE resources SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(resource_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to update resource status")?;

        let resource = resource.ok_or(AdminError::ResourceNotFound)?;
        tracing::info!(resource_id = %resource_id, status = ?status, "Resource moderated");
        Ok(resource)
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Dashboard summary cards
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db_pool)
            .await?;
        let (total_resources,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resources")
            .fetch_one(&self.db_pool)
            .await?;
        let (pending_resources,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM resources WHERE status = 'pending'")
                .fetch_one(&self.db_pool)
                .await?;
        let (total_orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db_pool)
            .await?;
        let (completed_orders,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = 'completed'")
                .fetch_one(&self.db_pool)
                .await?;
        let (total_revenue,): (Option<Decimal>,) = sqlx::query_as(
            "SELECT SUM(amount) FROM orders WHERE status IN ('paid', 'completed')",
        )
        .fetch_one(&self.db_pool)
        .await?;
        let (users_today,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at >= CURRENT_DATE")
                .fetch_one(&self.db_pool)
                .await?;
        let (orders_today,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE created_at >= CURRENT_DATE")
                .fetch_one(&self.db_pool)
                .await?;

        Ok(DashboardStats {
            total_users,
            total_resources,
            pending_resources,
            total_orders,
            completed_orders,
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
            users_today,
            orders_today,
        })
    }

    /// Signups per day over the trailing 30 days
    pub async fn user_stats(&self) -> Result<UserStats> {
        let signups: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT created_at::date AS day, COUNT(*)
            FROM users
            WHERE created_at >= CURRENT_DATE - INTERVAL '30 days'
            GROUP BY day
            ORDER BY day
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to load signup series")?;

        let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db_pool)
            .await?;
        let (banned_users,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE status = 'banned'")
                .fetch_one(&self.db_pool)
                .await?;

        Ok(UserStats {
            signups: signups
                .into_iter()
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
            total_users,
            banned_users,
        })
    }

    /// Revenue per day over the trailing 30 days
    pub async fn revenue_stats(&self) -> Result<RevenueStats> {
        let daily: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
            r#"
            SELECT updated_at::date AS day, SUM(amount)
            FROM orders
            WHERE status IN ('paid', 'completed')
              AND updated_at >= CURRENT_DATE - INTERVAL '30 days'
            GROUP BY day
            ORDER BY day
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to load revenue series")?;

        let (total_revenue,): (Option<Decimal>,) = sqlx::query_as(
            "SELECT SUM(amount) FROM orders WHERE status IN ('paid', 'completed')",
        )
        .fetch_one(&self.db_pool)
        .await?;

        let (total_commission,): (Option<Decimal>,) = sqlx::query_as(
            "SELECT SUM(commission_amount) FROM commission_records WHERE status = 'paid'",
        )
        .fetch_one(&self.db_pool)
        .await?;

        Ok(RevenueStats {
            daily: daily
                .into_iter()
                .map(|(date, revenue)| DailyRevenue { date, revenue })
                .collect(),
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
            total_commission: total_commission.unwrap_or(Decimal::ZERO),
        })
    }

    /// Catalog breakdown: status, category, top downloads
    pub async fn resource_stats(&self) -> Result<ResourceStats> {
        let by_status: Vec<(ResourceStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM resources GROUP BY status")
                .fetch_all(&self.db_pool)
                .await
                .context("Failed to load status counts")?;

        let by_category: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM resources GROUP BY category ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to load category counts")?;

        let top_downloads: Vec<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT id, title, download_count
            FROM resources
            WHERE status = 'approved'
            ORDER BY download_count DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to load top downloads")?;

        Ok(ResourceStats {
            by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_category: by_category
                .into_iter()
                .map(|(category, count)| CategoryCount {
                    category: category.unwrap_or_else(|| "uncategorized".to_string()),
                    count,
                })
                .collect(),
            top_downloads: top_downloads
                .into_iter()
                .map(|(id, title, download_count)| TopResource {
                    id,
                    title,
                    download_count,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_messages() {
        assert_eq!(AdminError::UserNotFound.to_string(), "User not found");
        assert!(AdminError::Other(anyhow!("boom")).to_string().contains("boom"));
    }
}
