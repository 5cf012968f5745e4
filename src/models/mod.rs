//! Domain models for the document management server.

use utoipa::ToSchema;

pub mod document;
pub mod ingestion;
pub mod user;

// Re-export commonly used types
pub use document::{
    DocumentListResponse, DocumentQueryParams, DocumentResponse, DocumentSortKey, MetadataEntry,
};
pub use ingestion::{
    IngestionListResponse, IngestionQueryParams, IngestionSortKey, IngestionState,
    IngestionStatusResponse, TriggerPayload, TriggerResponse,
};
pub use user::{AccessClaims, AuthResponse, LoginRequest, RegisterRequest, Role};

/// Default page number for paginated queries (1-indexed).
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for paginated queries.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum page size accepted from callers.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination metadata for responses.
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata.
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total as f64) / (page_size as f64)).ceil() as u32
        };

        Pagination {
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

/// Resolve raw page/page_size query values to (page, page_size, offset).
///
/// Pages are 1-indexed; a zero page is coerced to 1, page size is clamped
/// to [`MAX_PAGE_SIZE`].
pub fn resolve_page(page: Option<u32>, page_size: Option<u32>) -> (u32, u32, u64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page as u64 - 1) * page_size as u64;
    (page, page_size, offset)
}

/// Simple message body for endpoints that return no resource.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
