//! Admin console DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::NaiveDate;
use validator::Validate;

use super::{OrderStatus, ResourceStatus, UserRole, UserStatus};

/// Admin user-list filters
#[derive(Debug, Deserialize)]
pub struct AdminUserListQuery {
    /// Matches against email and username
    pub q: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Admin edit of a user record
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    #[validate(length(min = 2, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    #[validate(range(min = 1, max = 100))]
    pub level: Option<i32>,
    pub balance: Option<Decimal>,
}

/// Admin resource-list filters
#[derive(Debug, Deserialize)]
pub struct AdminResourceListQuery {
    pub q: Option<String>,
    pub status: Option<ResourceStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Admin override of an order's status
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Dashboard summary card values
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_resources: i64,
    pub pending_resources: i64,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub total_revenue: Decimal,
    pub users_today: i64,
    pub orders_today: i64,
}

/// One day of a time series
#[derive(Debug, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// One day of revenue
#[derive(Debug, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

/// User growth over the trailing window
#[derive(Debug, Serialize)]
pub struct UserStats {
    pub signups: Vec<DailyCount>,
    pub total_users: i64,
    pub banned_users: i64,
}

/// Revenue over the trailing window
#[derive(Debug, Serialize)]
pub struct RevenueStats {
    pub daily: Vec<DailyRevenue>,
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
}

/// Resource catalog breakdown
#[derive(Debug, Serialize)]
pub struct ResourceStats {
    pub by_status: Vec<StatusCount>,
    pub by_category: Vec<CategoryCount>,
    pub top_downloads: Vec<TopResource>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: ResourceStatus,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct TopResource {
    pub id: uuid::Uuid,
    pub title: String,
    pub download_count: i64,
}
