//! Ingestion tracking: trigger, listing, retrieval, and cancellation.
//!
//! A trigger commits its InProgress row before the outbound call, so the
//! record exists even when the call fails. The pre-call and post-call writes
//! are separate transactions; rows left InProgress by a crash in between are
//! recovered by the reaper sweep.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::IngestionSettings;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    IngestionListResponse, IngestionQueryParams, IngestionState, IngestionStatusResponse,
    Pagination, TriggerPayload, TriggerResponse, resolve_page,
};

/// HTTP connect timeout for the ingestion endpoint.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the external ingestion endpoint.
#[derive(Clone)]
pub struct IngestionClient {
    http: reqwest::Client,
    trigger_url: String,
}

impl IngestionClient {
    /// Build a client with explicit timeouts from configuration.
    pub fn new(settings: &IngestionSettings) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to build HTTP client for ingestion");

        Self {
            http,
            trigger_url: settings.trigger_url.clone(),
        }
    }

    /// POST the trigger payload. Returns the response's success flag and
    /// body; transport failures surface as ingestion errors.
    async fn post_trigger(&self, document_id: &str) -> AppResult<(bool, String)> {
        let response = self
            .http
            .post(&self.trigger_url)
            .json(&TriggerPayload {
                document_id: document_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| AppError::Ingestion(format!("Ingestion endpoint unreachable: {}", e)))?;

        let success = response.status().is_success();
        let body = response.text().await.map_err(|e| {
            AppError::Ingestion(format!("Failed to read ingestion response: {}", e))
        })?;

        Ok((success, body))
    }
}

/// Trigger ingestion for a document.
///
/// The status row is inserted and committed first. The external response
/// then drives the transition: a recognized status value is stored; a
/// non-2xx response, an unreachable endpoint, or an unparseable body store
/// Failed. An unrecognized-but-parseable status stores Failed without
/// failing the request.
pub async fn trigger(
    pool: &DbPool,
    client: &IngestionClient,
    document_id: &str,
) -> AppResult<IngestionStatusResponse> {
    let doc_id = Uuid::parse_str(document_id)
        .map_err(|_| AppError::Validation("Invalid document ID".to_string()))?;

    let document = db::documents::find_by_id(pool.connection(), doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    let status = db::ingestion_statuses::insert(pool.connection(), document.id).await?;
    info!(
        "Triggered ingestion {} for document {}",
        status.id, document.id
    );

    let (success, body) = match client.post_trigger(document_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            db::ingestion_statuses::set_state(pool.connection(), status, IngestionState::Failed)
                .await?;
            return Err(e);
        }
    };

    if !success {
        db::ingestion_statuses::set_state(pool.connection(), status, IngestionState::Failed)
            .await?;
        return Err(AppError::Ingestion(format!(
            "Ingestion API failed. Response: {}",
            body
        )));
    }

    match serde_json::from_str::<TriggerResponse>(&body) {
        Ok(parsed) => {
            let state = parsed
                .status
                .as_deref()
                .and_then(IngestionState::parse)
                .unwrap_or(IngestionState::Failed);

            if state == IngestionState::Failed {
                warn!(
                    "Ingestion {} response carried no recognized status: {:?}",
                    status.id, parsed.status
                );
            }

            let updated =
                db::ingestion_statuses::set_state(pool.connection(), status, state).await?;
            Ok(updated.into())
        }
        Err(e) => {
            db::ingestion_statuses::set_state(pool.connection(), status, IngestionState::Failed)
                .await?;
            Err(AppError::Ingestion(format!(
                "Failed to parse ingestion response: {}",
                e
            )))
        }
    }
}

/// List status rows with filtering, sorting, and pagination.
pub async fn list_statuses(
    pool: &DbPool,
    params: &IngestionQueryParams,
) -> AppResult<IngestionListResponse> {
    let (rows, total) = db::ingestion_statuses::query(pool.connection(), params).await?;

    // Resolve the referenced documents for the page; only the ids already on
    // the rows are surfaced to the caller.
    let documents =
        db::ingestion_statuses::documents_for_statuses(pool.connection(), &rows).await?;
    debug!(
        "Resolved {} documents for {} status rows",
        documents.len(),
        rows.len()
    );

    let statuses = rows.into_iter().map(IngestionStatusResponse::from).collect();
    let (page, page_size, _) = resolve_page(params.page, params.page_size);

    Ok(IngestionListResponse {
        statuses,
        pagination: Pagination::new(page, page_size, total),
    })
}

/// Get a single status row by id.
pub async fn get_status_by_id(pool: &DbPool, id: &str) -> AppResult<IngestionStatusResponse> {
    let status_id = Uuid::parse_str(id)
        .map_err(|_| AppError::Validation("Invalid ingestion status ID".to_string()))?;

    let status = db::ingestion_statuses::find_by_id(pool.connection(), status_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingestion status".to_string()))?;

    Ok(status.into())
}

/// Cancel an in-progress ingestion.
///
/// Cancellation is modeled as a transition to Failed and is only legal from
/// InProgress; terminal rows are left untouched.
pub async fn cancel(pool: &DbPool, ingestion_id: &str) -> AppResult<IngestionStatusResponse> {
    let status_id = Uuid::parse_str(ingestion_id)
        .map_err(|_| AppError::Validation("Invalid ingestion status ID".to_string()))?;

    let status = db::ingestion_statuses::find_by_id(pool.connection(), status_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingestion record".to_string()))?;

    if status.status != IngestionState::InProgress.as_str() {
        return Err(AppError::Conflict(
            "Only in-progress ingestions can be cancelled".to_string(),
        ));
    }

    let updated =
        db::ingestion_statuses::set_state(pool.connection(), status, IngestionState::Failed)
            .await?;

    info!("Cancelled ingestion {}", updated.id);

    Ok(updated.into())
}
