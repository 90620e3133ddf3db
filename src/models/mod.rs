//! Data models for the Tradepost backend

use serde::{Deserialize, Serialize};

pub mod admin;
pub mod order;
pub mod payment;
pub mod resource;
pub mod settings;
pub mod user;

pub use admin::*;
pub use order::*;
pub use payment::*;
pub use resource::*;
pub use settings::*;
pub use user::*;

/// Common pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// Clamped page number (1-based)
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Clamped page size
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    /// Row offset for the current page
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery {
            page: None,
            page_size: None,
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_page_query_clamps() {
        let q = PageQuery {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 100);

        let q = PageQuery {
            page: Some(3),
            page_size: Some(10),
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_paginated_total_pages() {
        let p: Paginated<i32> = Paginated::new(vec![], 41, 1, 20);
        assert_eq!(p.total_pages, 3);

        let p: Paginated<i32> = Paginated::new(vec![], 40, 1, 20);
        assert_eq!(p.total_pages, 2);

        let p: Paginated<i32> = Paginated::new(vec![], 0, 1, 20);
        assert_eq!(p.total_pages, 0);
    }
}
