//! Ingestion status DTOs, query parameters, and the status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::ingestion_status;

/// Ingestion status values.
///
/// Initial state is `InProgress`, set at trigger time. `Completed` and
/// `Failed` are terminal; cancellation transitions to `Failed` (there is no
/// distinct cancelled state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IngestionState {
    InProgress,
    Completed,
    Failed,
}

impl IngestionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// Parse a status value, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inprogress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for IngestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ingestion status returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestionStatusResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: IngestionState,
    pub triggered_at: DateTime<Utc>,
}

impl From<ingestion_status::Model> for IngestionStatusResponse {
    fn from(m: ingestion_status::Model) -> Self {
        // Rows only ever hold values accepted by the CHECK constraint
        let status = IngestionState::parse(&m.status).unwrap_or(IngestionState::Failed);
        Self {
            id: m.id,
            document_id: m.document_id,
            status,
            triggered_at: m.triggered_at,
        }
    }
}

/// Ingestion status list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestionListResponse {
    pub statuses: Vec<IngestionStatusResponse>,
    pub pagination: super::Pagination,
}

/// Sort keys accepted by the status listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestionSortKey {
    #[default]
    TriggeredAt,
    Status,
}

impl IngestionSortKey {
    /// Parse a sort key, case-insensitively. Unknown keys fall back to the
    /// default (trigger date).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "triggeredat" => Self::TriggeredAt,
            "status" => Self::Status,
            _ => Self::default(),
        }
    }
}

/// Query parameters for the status listing.
///
/// Empty-string filters are treated as "no filter".
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IngestionQueryParams {
    /// Exact document id match
    pub document_id: Option<String>,
    /// Exact status match (InProgress, Completed, Failed)
    pub status: Option<String>,
    /// Inclusive lower bound on trigger date
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on trigger date
    pub to_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// One of TriggeredAt, Status; unknown keys fall back to TriggeredAt
    pub sort_by: Option<String>,
    /// Defaults to true
    pub sort_descending: Option<bool>,
}

impl IngestionQueryParams {
    /// Document id filter with empty strings normalized away.
    pub fn document_id_filter(&self) -> Option<&str> {
        self.document_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Status filter with empty strings normalized away.
    pub fn status_filter(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }

    pub fn sort_key(&self) -> IngestionSortKey {
        self.sort_by
            .as_deref()
            .map(IngestionSortKey::parse)
            .unwrap_or_default()
    }

    pub fn sort_descending(&self) -> bool {
        self.sort_descending.unwrap_or(true)
    }
}

/// Payload POSTed to the external ingestion endpoint.
#[derive(Debug, Serialize)]
pub struct TriggerPayload {
    #[serde(rename = "documentId")]
    pub document_id: String,
}

/// Expected success response body from the external endpoint.
#[derive(Debug, Deserialize)]
pub struct TriggerResponse {
    pub status: Option<String>,
}
