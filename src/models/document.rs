//! Document DTOs and query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{document, document_metadata};

/// A single key-value metadata entry.
///
/// Duplicate keys are permitted within one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl From<document_metadata::Model> for MetadataEntry {
    fn from(m: document_metadata::Model) -> Self {
        Self {
            key: m.key,
            value: m.value,
        }
    }
}

/// Document returned by the API, enriched with the uploader's display name.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    pub uploaded_by_user_id: Uuid,
    pub uploaded_by_user_name: Option<String>,
    pub metadata: Vec<MetadataEntry>,
}

impl DocumentResponse {
    /// Assemble a response from the entity row, the uploader's display name,
    /// and the document's metadata entries.
    pub fn from_parts(
        doc: document::Model,
        uploaded_by_user_name: Option<String>,
        metadata: Vec<MetadataEntry>,
    ) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            description: doc.description,
            file_path: doc.file_path,
            content_type: doc.content_type,
            file_size: doc.file_size,
            upload_date: doc.upload_date,
            last_modified: doc.last_modified,
            uploaded_by_user_id: doc.uploaded_by_user_id,
            uploaded_by_user_name,
            metadata,
        }
    }

    /// As [`Self::from_parts`], but from raw metadata rows.
    pub fn from_rows(
        doc: document::Model,
        uploaded_by_user_name: Option<String>,
        metadata: Vec<document_metadata::Model>,
    ) -> Self {
        let metadata = metadata.into_iter().map(MetadataEntry::from).collect();
        Self::from_parts(doc, uploaded_by_user_name, metadata)
    }
}

/// Document list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
    pub pagination: super::Pagination,
}

/// Sort keys accepted by the document listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentSortKey {
    Name,
    #[default]
    UploadDate,
    FileSize,
}

impl DocumentSortKey {
    /// Parse a sort key, case-insensitively. Unknown keys fall back to the
    /// default (upload date).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "name" => Self::Name,
            "uploaddate" => Self::UploadDate,
            "filesize" => Self::FileSize,
            _ => Self::default(),
        }
    }
}

/// Query parameters for the document listing.
///
/// All filters are optional and AND-combined. Substring filters match
/// case-insensitively.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DocumentQueryParams {
    /// Substring filter on name (also gates the description filter)
    pub file_name: Option<String>,
    /// Substring filter on description, applied together with `file_name`
    pub description: Option<String>,
    /// Substring filter on the value of the reserved "FileType" metadata key
    pub file_type: Option<String>,
    /// Substring filter on the value of the reserved "Category" metadata key
    pub category: Option<String>,
    /// Inclusive lower bound on upload date
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on upload date
    pub to_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// One of name, uploaddate, filesize; unknown keys fall back to uploaddate
    pub sort_by: Option<String>,
    /// Defaults to true
    pub sort_descending: Option<bool>,
}

impl DocumentQueryParams {
    pub fn sort_key(&self) -> DocumentSortKey {
        self.sort_by
            .as_deref()
            .map(DocumentSortKey::parse)
            .unwrap_or_default()
    }

    pub fn sort_descending(&self) -> bool {
        self.sort_descending.unwrap_or(true)
    }
}
