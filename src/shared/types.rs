use axum::http::Uri;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Uniform response envelope every handler returns.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            message: message.unwrap_or_else(|| "Operation successful".to_string()),
            data,
            errors: None,
        }
    }

    pub fn created(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            message: message.unwrap_or_else(|| "Resource created successfully".to_string()),
            data,
            errors: None,
        }
    }

    pub fn error(message: String, errors: Option<serde_json::Value>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            message,
            data: None,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Get clamped page_size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of results plus the metadata the list endpoints expose.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, pagination: &PaginationQuery, uri: &Uri) -> Self {
        let page_size = pagination.limit();
        let current_page = pagination.page.max(1);
        let total_pages = ((count + page_size - 1) / page_size).max(1);

        let next = (current_page < total_pages).then(|| page_link(uri, current_page + 1));
        let previous = (current_page > 1).then(|| page_link(uri, current_page - 1));

        Self {
            count,
            total_pages,
            current_page,
            page_size,
            next,
            previous,
            results,
        }
    }
}

/// Rebuild the request URI with the `page` parameter replaced, keeping every
/// other query parameter intact.
fn page_link(uri: &Uri, page: i64) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("page=") && *p != "page")
        .map(|p| p.to_string())
        .collect();
    params.push(format!("page={}", page));

    format!("{}?{}", uri.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_limit_derive_from_page() {
        let q = PaginationQuery {
            page: 3,
            page_size: 20,
        };
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn page_size_is_clamped_to_max() {
        let q = PaginationQuery {
            page: 1,
            page_size: 500,
        };
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn negative_page_is_treated_as_first() {
        let q = PaginationQuery {
            page: -2,
            page_size: 10,
        };
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn page_links_preserve_other_params() {
        let uri: Uri = "/records/?search=report&page=2&page_size=5"
            .parse()
            .unwrap();
        let q = PaginationQuery {
            page: 2,
            page_size: 5,
        };
        let page: Page<i32> = Page::new(vec![1, 2, 3, 4, 5], 12, &q, &uri);

        assert_eq!(page.count, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(
            page.next.as_deref(),
            Some("/records/?search=report&page_size=5&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/records/?search=report&page_size=5&page=1")
        );
    }

    #[test]
    fn first_and_last_pages_have_no_dangling_links() {
        let uri: Uri = "/records/".parse().unwrap();
        let q = PaginationQuery::default();
        let page: Page<i32> = Page::new(vec![], 0, &q, &uri);

        assert_eq!(page.total_pages, 1);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn success_envelope_defaults_message() {
        let resp = ApiResponse::success(Some(1), None);
        assert!(resp.success);
        assert_eq!(resp.message, "Operation successful");

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn error_envelope_carries_errors() {
        let resp = ApiResponse::<()>::error(
            "Validation error".to_string(),
            Some(serde_json::json!({"title": ["This field is required."]})),
        );
        assert!(!resp.success);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["errors"]["title"][0], "This field is required.");
    }
}
