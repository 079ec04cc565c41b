//! Shared pagination parameters
//!
//! Listing procedures take `page` and `per_page` as their last two
//! arguments and do the OFFSET arithmetic themselves.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i32 = 10;
pub const MAX_PER_PAGE: i32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i32>,

    /// Items per page. Defaults to 10, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i32>,
}

impl PaginationParams {
    pub fn new(page: Option<i32>, per_page: Option<i32>) -> Self {
        Self { page, per_page }
    }

    pub fn page(&self) -> i32 {
        self.page.unwrap_or(1)
    }

    pub fn per_page(&self) -> i32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.page() < 1 {
            return Err("Page must be greater than 0");
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page()) {
            return Err("Per page must be between 1 and 100");
        }
        Ok(())
    }
}
