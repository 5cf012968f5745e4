//! Database queries for documents and their metadata.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::{document, document_metadata, user};
use crate::error::{AppError, AppResult};
use crate::models::{DocumentQueryParams, DocumentSortKey, MetadataEntry, resolve_page};

/// Reserved metadata key filtered by the `file_type` query parameter.
pub const FILE_TYPE_KEY: &str = "FileType";

/// Reserved metadata key filtered by the `category` query parameter.
pub const CATEGORY_KEY: &str = "Category";

fn like_pattern(s: &str) -> String {
    format!("%{}%", s)
}

/// EXISTS filter on a reserved metadata key whose value contains `needle`.
fn metadata_value_filter(key: &str, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::cust_with_values(
        "EXISTS (SELECT 1 FROM document_metadata m \
         WHERE m.document_id = documents.id AND m.key = $1 AND m.value ILIKE $2)",
        [key.to_string(), like_pattern(needle)],
    )
}

/// Insert a new document together with its metadata entries, inside the
/// caller's transaction.
#[allow(clippy::too_many_arguments)]
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
    file_path: &str,
    content_type: &str,
    file_size: i64,
    uploaded_by_user_id: Uuid,
    metadata: &[MetadataEntry],
) -> AppResult<document::Model> {
    let model = document::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        file_path: Set(file_path.to_string()),
        content_type: Set(content_type.to_string()),
        file_size: Set(file_size),
        upload_date: Set(chrono::Utc::now()),
        last_modified: Set(None),
        uploaded_by_user_id: Set(uploaded_by_user_id),
    };

    let inserted = model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert document: {}", e)))?;

    insert_metadata(db, inserted.id, metadata).await?;

    Ok(inserted)
}

/// Find a document by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<document::Model>> {
    let result = document::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find document: {}", e)))?;

    Ok(result)
}

/// Find a document together with its uploader.
pub async fn find_with_uploader<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<(document::Model, Option<user::Model>)>> {
    let result = document::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find document: {}", e)))?;

    Ok(result)
}

/// Metadata rows for a single document.
pub async fn metadata_for_document<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
) -> AppResult<Vec<document_metadata::Model>> {
    let rows = document_metadata::Entity::find()
        .filter(document_metadata::Column::DocumentId.eq(document_id))
        .order_by_asc(document_metadata::Column::Id)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load document metadata: {}", e)))?;

    Ok(rows)
}

/// Metadata rows for a page of documents, grouped by document id.
pub async fn metadata_for_documents<C: ConnectionTrait>(
    db: &C,
    document_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<document_metadata::Model>>> {
    if document_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = document_metadata::Entity::find()
        .filter(document_metadata::Column::DocumentId.is_in(document_ids.to_vec()))
        .order_by_asc(document_metadata::Column::Id)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load document metadata: {}", e)))?;

    let mut grouped: HashMap<Uuid, Vec<document_metadata::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.document_id).or_default().push(row);
    }

    Ok(grouped)
}

/// Insert metadata entries for a document.
pub async fn insert_metadata<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
    entries: &[MetadataEntry],
) -> AppResult<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let models: Vec<document_metadata::ActiveModel> = entries
        .iter()
        .map(|entry| document_metadata::ActiveModel {
            document_id: Set(document_id),
            key: Set(entry.key.clone()),
            value: Set(entry.value.clone()),
            ..Default::default()
        })
        .collect();

    document_metadata::Entity::insert_many(models)
        .exec(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert document metadata: {}", e)))?;

    Ok(())
}

/// Delete every metadata row of a document and insert the replacement set,
/// inside the caller's transaction.
pub async fn replace_metadata<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
    entries: &[MetadataEntry],
) -> AppResult<()> {
    document_metadata::Entity::delete_many()
        .filter(document_metadata::Column::DocumentId.eq(document_id))
        .exec(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete document metadata: {}", e)))?;

    insert_metadata(db, document_id, entries).await
}

/// Persist a mutated document.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    active: document::ActiveModel,
) -> AppResult<document::Model> {
    let result = active
        .update(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update document: {}", e)))?;

    Ok(result)
}

/// Delete a document row. Metadata rows cascade with the foreign key.
pub async fn delete<C: ConnectionTrait>(db: &C, doc: document::Model) -> AppResult<()> {
    doc.delete(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete document: {}", e)))?;

    Ok(())
}

/// Query documents with filtering, sorting, and pagination.
///
/// Filters are AND-combined; substring filters match case-insensitively.
/// Returns the page (each row with its uploader) and the total match count.
pub async fn query<C: ConnectionTrait>(
    db: &C,
    params: &DocumentQueryParams,
) -> AppResult<(Vec<(document::Model, Option<user::Model>)>, u64)> {
    let mut select = document::Entity::find();

    // The name filter gates the description filter as well
    let name_filter = params.file_name.as_deref().filter(|s| !s.is_empty());
    let description_filter = params.description.as_deref().filter(|s| !s.is_empty());
    if let Some(name) = name_filter {
        select = match description_filter {
            Some(description) => select.filter(Expr::cust_with_values(
                "(documents.name ILIKE $1 OR documents.description ILIKE $2)",
                [like_pattern(name), like_pattern(description)],
            )),
            None => select.filter(Expr::cust_with_values(
                "documents.name ILIKE $1",
                [like_pattern(name)],
            )),
        };
    }

    if let Some(file_type) = params.file_type.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(metadata_value_filter(FILE_TYPE_KEY, file_type));
    }

    if let Some(category) = params.category.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(metadata_value_filter(CATEGORY_KEY, category));
    }

    if let Some(from_date) = params.from_date {
        select = select.filter(document::Column::UploadDate.gte(from_date));
    }

    if let Some(to_date) = params.to_date {
        select = select.filter(document::Column::UploadDate.lte(to_date));
    }

    // Count total before pagination
    let total = select
        .clone()
        .count(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count documents: {}", e)))?;

    let sort_column = match params.sort_key() {
        DocumentSortKey::Name => document::Column::Name,
        DocumentSortKey::UploadDate => document::Column::UploadDate,
        DocumentSortKey::FileSize => document::Column::FileSize,
    };
    select = if params.sort_descending() {
        select.order_by_desc(sort_column)
    } else {
        select.order_by_asc(sort_column)
    };

    let (_, page_size, offset) = resolve_page(params.page, params.page_size);

    let rows = select
        .find_also_related(user::Entity)
        .offset(offset)
        .limit(page_size as u64)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to query documents: {}", e)))?;

    Ok((rows, total))
}
