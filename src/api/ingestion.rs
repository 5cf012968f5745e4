//! Ingestion API handlers.

use actix_web::{HttpResponse, get, post, web};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::IngestionQueryParams;
use crate::services::{self, IngestionClient};

/// Trigger ingestion for a document.
///
/// POST /api/v1/ingestion/trigger/{document_id}
///
/// The status row is committed before the external call; the response
/// carries the row after the external outcome was applied.
#[utoipa::path(
    post,
    path = "/api/v1/ingestion/trigger/{document_id}",
    tag = "Ingestion",
    params(
        ("document_id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Ingestion triggered", body = crate::models::IngestionStatusResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse),
        (status = 502, description = "External ingestion endpoint failed", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[post("/ingestion/trigger/{document_id}")]
pub async fn trigger_ingestion(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    client: web::Data<IngestionClient>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let response =
        services::ingestion::trigger(pool.get_ref(), client.get_ref(), &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// List ingestion statuses with filtering, sorting, and pagination.
///
/// GET /api/v1/ingestion/statuses
#[utoipa::path(
    get,
    path = "/api/v1/ingestion/statuses",
    tag = "Ingestion",
    params(
        ("document_id" = Option<String>, Query, description = "Exact document id match (empty means no filter)"),
        ("status" = Option<String>, Query, description = "Exact status match (empty means no filter)"),
        ("from_date" = Option<String>, Query, description = "Inclusive lower bound on trigger date (RFC 3339)"),
        ("to_date" = Option<String>, Query, description = "Inclusive upper bound on trigger date (RFC 3339)"),
        ("page" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Items per page (default: 10, max: 100)"),
        ("sort_by" = Option<String>, Query, description = "TriggeredAt or Status (default: TriggeredAt)"),
        ("sort_descending" = Option<bool>, Query, description = "Sort direction (default: true)")
    ),
    responses(
        (status = 200, description = "Page of ingestion statuses", body = crate::models::IngestionListResponse)
    ),
    security(("bearer_token" = []))
)]
#[get("/ingestion/statuses")]
pub async fn list_statuses(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<IngestionQueryParams>,
) -> AppResult<HttpResponse> {
    let response = services::ingestion::list_statuses(pool.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single ingestion status by id.
///
/// GET /api/v1/ingestion/status/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ingestion/status/{id}",
    tag = "Ingestion",
    params(
        ("id" = String, Path, description = "Ingestion status UUID")
    ),
    responses(
        (status = 200, description = "Ingestion status", body = crate::models::IngestionStatusResponse),
        (status = 404, description = "Ingestion status not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[get("/ingestion/status/{id}")]
pub async fn get_status(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let response = services::ingestion::get_status_by_id(pool.get_ref(), &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Cancel an in-progress ingestion.
///
/// POST /api/v1/ingestion/cancel/{ingestion_id}
#[utoipa::path(
    post,
    path = "/api/v1/ingestion/cancel/{ingestion_id}",
    tag = "Ingestion",
    params(
        ("ingestion_id" = String, Path, description = "Ingestion status UUID")
    ),
    responses(
        (status = 200, description = "Ingestion cancelled", body = crate::models::IngestionStatusResponse),
        (status = 404, description = "Ingestion record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Ingestion is not in progress", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[post("/ingestion/cancel/{ingestion_id}")]
pub async fn cancel_ingestion(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let response = services::ingestion::cancel(pool.get_ref(), &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Configure ingestion routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(trigger_ingestion)
        .service(list_statuses)
        .service(get_status)
        .service(cancel_ingestion);
}
