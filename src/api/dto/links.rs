//! DTOs for the owner's link listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Validates pagination parameters and converts to offset/limit.
    ///
    /// Defaults: page 1, page size 25. Page size is capped at 100.
    pub fn validate_and_get_offset_limit(&self) -> Result<(i64, i64), String> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(25);

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=100).contains(&page_size) {
            return Err("Page size must be between 1 and 100".to_string());
        }

        let offset = ((page - 1) * page_size) as i64;
        let limit = page_size as i64;

        Ok((offset, limit))
    }
}

/// Pagination metadata echoed back to the caller.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

/// One link in the listing.
#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub code: String,
    pub destination_url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub has_access_code: bool,
    pub allowed_emails: Vec<String>,
    pub click_limit: Option<i64>,
    pub current_clicks: i64,
}

impl From<Link> for LinkItem {
    fn from(link: Link) -> Self {
        LinkItem {
            code: link.code,
            destination_url: link.destination_url,
            visits: link.visits,
            created_at: link.created_at,
            expires_at: link.expires_at,
            last_visited_at: link.last_visited_at,
            // the secret itself never leaves the service
            has_access_code: link.access_code.is_some(),
            allowed_emails: link.allowed_emails,
            click_limit: link.click_limit,
            current_clicks: link.current_clicks,
        }
    }
}

/// Paginated link listing response.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.validate_and_get_offset_limit().unwrap(), (0, 25));
    }

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams {
            page: Some(3),
            page_size: Some(10),
        };
        assert_eq!(params.validate_and_get_offset_limit().unwrap(), (20, 10));
    }

    #[test]
    fn test_pagination_rejects_zero_page() {
        let params = PaginationParams {
            page: Some(0),
            page_size: None,
        };
        assert!(params.validate_and_get_offset_limit().is_err());
    }

    #[test]
    fn test_pagination_rejects_oversized_page() {
        let params = PaginationParams {
            page: None,
            page_size: Some(1000),
        };
        assert!(params.validate_and_get_offset_limit().is_err());
    }
}
