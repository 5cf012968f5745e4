//! Database queries for ingestion status rows.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::{document, ingestion_status};
use crate::error::{AppError, AppResult};
use crate::models::{IngestionQueryParams, IngestionSortKey, IngestionState, resolve_page};

/// Insert a fresh status row for a trigger, in state InProgress.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
) -> AppResult<ingestion_status::Model> {
    let model = ingestion_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        document_id: Set(document_id),
        status: Set(IngestionState::InProgress.as_str().to_string()),
        triggered_at: Set(Utc::now()),
    };

    let inserted = model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert ingestion status: {}", e)))?;

    Ok(inserted)
}

/// Find a status row by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<ingestion_status::Model>> {
    let result = ingestion_status::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find ingestion status: {}", e)))?;

    Ok(result)
}

/// Transition a status row to a new state.
pub async fn set_state<C: ConnectionTrait>(
    db: &C,
    row: ingestion_status::Model,
    state: IngestionState,
) -> AppResult<ingestion_status::Model> {
    let mut active: ingestion_status::ActiveModel = row.into();
    active.status = Set(state.as_str().to_string());

    let result = active
        .update(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update ingestion status: {}", e)))?;

    Ok(result)
}

/// Query status rows with filtering, sorting, and pagination.
///
/// The document id filter is an exact match; a value that is not a UUID can
/// never match a row, so it short-circuits to an empty page.
pub async fn query<C: ConnectionTrait>(
    db: &C,
    params: &IngestionQueryParams,
) -> AppResult<(Vec<ingestion_status::Model>, u64)> {
    let mut select = ingestion_status::Entity::find();

    if let Some(document_id) = params.document_id_filter() {
        match Uuid::parse_str(document_id) {
            Ok(uuid) => {
                select = select.filter(ingestion_status::Column::DocumentId.eq(uuid));
            }
            Err(_) => return Ok((Vec::new(), 0)),
        }
    }

    if let Some(status) = params.status_filter() {
        select = select.filter(ingestion_status::Column::Status.eq(status));
    }

    if let Some(from_date) = params.from_date {
        select = select.filter(ingestion_status::Column::TriggeredAt.gte(from_date));
    }

    if let Some(to_date) = params.to_date {
        select = select.filter(ingestion_status::Column::TriggeredAt.lte(to_date));
    }

    // Count total before pagination
    let total = select
        .clone()
        .count(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count ingestion statuses: {}", e)))?;

    let sort_column = match params.sort_key() {
        IngestionSortKey::TriggeredAt => ingestion_status::Column::TriggeredAt,
        IngestionSortKey::Status => ingestion_status::Column::Status,
    };
    select = if params.sort_descending() {
        select.order_by_desc(sort_column)
    } else {
        select.order_by_asc(sort_column)
    };

    let (_, page_size, offset) = resolve_page(params.page, params.page_size);

    let rows = select
        .offset(offset)
        .limit(page_size as u64)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to query ingestion statuses: {}", e)))?;

    Ok((rows, total))
}

/// Resolve the documents referenced by a page of status rows.
pub async fn documents_for_statuses<C: ConnectionTrait>(
    db: &C,
    rows: &[ingestion_status::Model],
) -> AppResult<Vec<document::Model>> {
    let mut ids: Vec<Uuid> = rows.iter().map(|r| r.document_id).collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let documents = document::Entity::find()
        .filter(document::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to resolve documents: {}", e)))?;

    Ok(documents)
}

/// Sweep InProgress rows older than `older_than` to Failed.
///
/// Recovery for rows left stuck when the process dies between the pre-call
/// and post-call commits of a trigger. Returns the number of rows swept.
pub async fn mark_stuck_failed<C: ConnectionTrait>(
    db: &C,
    older_than: DateTime<Utc>,
) -> AppResult<u64> {
    let result = ingestion_status::Entity::update_many()
        .col_expr(
            ingestion_status::Column::Status,
            Expr::value(IngestionState::Failed.as_str()),
        )
        .filter(ingestion_status::Column::Status.eq(IngestionState::InProgress.as_str()))
        .filter(ingestion_status::Column::TriggeredAt.lt(older_than))
        .exec(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to sweep stuck ingestions: {}", e)))?;

    Ok(result.rows_affected)
}
