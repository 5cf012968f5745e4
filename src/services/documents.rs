//! Document lifecycle: upload, listing, retrieval, update, delete.
//!
//! Mutations are authorized against the database (owner or Admin role), not
//! against token claims. Row writes for one operation share a transaction;
//! the stored file is managed outside it, which leaves the acknowledged
//! partial-failure window between file and row operations.

use sea_orm::Set;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MAX_UPLOAD_SIZE;
use crate::db::{self, DbPool};
use crate::entity::{document, user};
use crate::error::{AppError, AppResult};
use crate::models::{
    DocumentListResponse, DocumentQueryParams, DocumentResponse, MetadataEntry, Pagination, Role,
    resolve_page,
};
use crate::services::storage::FileStorage;

/// An uploaded file part, fully buffered by the API layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Fields of an update request. Absent fields leave the current values.
#[derive(Debug, Default)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Non-empty replaces the document's whole metadata set
    pub metadata: Vec<MetadataEntry>,
    /// Non-empty replaces the stored file
    pub file: Option<UploadedFile>,
}

fn display_name(user: &user::Model) -> String {
    format!("{} {}", user.first_name, user.last_name)
}

/// Validate an uploaded payload: present, non-empty, at most 10 MiB.
fn validate_upload(file: &UploadedFile) -> AppResult<()> {
    if file.data.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }

    if file.data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::Validation(
            "File size exceeds the maximum limit of 10MB".to_string(),
        ));
    }

    Ok(())
}

/// Overwrite name and description only when replacements are supplied, and
/// always refresh the last-modified timestamp.
fn apply_field_updates(
    doc: document::Model,
    name: Option<String>,
    description: Option<String>,
) -> document::ActiveModel {
    let mut active: document::ActiveModel = doc.into();

    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    active.last_modified = Set(Some(chrono::Utc::now()));

    active
}

/// Caller must own the document or hold the Admin role.
async fn authorize_owner_or_admin(
    pool: &DbPool,
    doc: &document::Model,
    caller_id: Uuid,
    action: &str,
) -> AppResult<()> {
    if doc.uploaded_by_user_id == caller_id {
        return Ok(());
    }

    if db::users::has_role(pool.connection(), caller_id, Role::Admin).await? {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "You don't have permission to {} this document",
        action
    )))
}

/// Get a document by id, enriched with the uploader's display name and its
/// metadata. Reads are open to any authenticated caller.
pub async fn get_document(pool: &DbPool, id: Uuid) -> AppResult<DocumentResponse> {
    let (doc, uploader) = db::documents::find_with_uploader(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    let metadata = db::documents::metadata_for_document(pool.connection(), doc.id).await?;
    let uploader_name = uploader.as_ref().map(display_name);

    Ok(DocumentResponse::from_rows(doc, uploader_name, metadata))
}

/// List documents with filtering, sorting, and pagination.
pub async fn list_documents(
    pool: &DbPool,
    params: &DocumentQueryParams,
) -> AppResult<DocumentListResponse> {
    let (rows, total) = db::documents::query(pool.connection(), params).await?;

    let ids: Vec<Uuid> = rows.iter().map(|(doc, _)| doc.id).collect();
    let mut metadata = db::documents::metadata_for_documents(pool.connection(), &ids).await?;

    let documents = rows
        .into_iter()
        .map(|(doc, uploader)| {
            let entries = metadata.remove(&doc.id).unwrap_or_default();
            let uploader_name = uploader.as_ref().map(display_name);
            DocumentResponse::from_rows(doc, uploader_name, entries)
        })
        .collect();

    let (page, page_size, _) = resolve_page(params.page, params.page_size);

    Ok(DocumentListResponse {
        documents,
        pagination: Pagination::new(page, page_size, total),
    })
}

/// Upload a new document.
///
/// The payload is stored first; the document row and its metadata are then
/// inserted in one transaction, with content type and size taken from the
/// file, never from the client independently of it.
pub async fn upload_document(
    pool: &DbPool,
    storage: &FileStorage,
    name: String,
    description: String,
    metadata: Vec<MetadataEntry>,
    file: UploadedFile,
    owner_id: Uuid,
) -> AppResult<DocumentResponse> {
    validate_upload(&file)?;

    let file_path = storage.save(&file.filename, &file.data).await?;

    let txn = pool.begin().await?;
    let doc = db::documents::insert(
        &txn,
        &name,
        &description,
        &file_path,
        &file.content_type,
        file.data.len() as i64,
        owner_id,
        &metadata,
    )
    .await?;
    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit upload: {}", e)))?;

    info!(
        "Uploaded document {} ({} bytes) for user {}",
        doc.id, doc.file_size, owner_id
    );

    Ok(DocumentResponse::from_parts(doc, None, metadata))
}

/// Update a document.
///
/// Absent name/description leave the stored values; the last-modified
/// timestamp is always refreshed. A non-empty metadata set replaces every
/// existing entry. A non-empty file replaces the stored file, deleting the
/// old one first (a failed delete is logged and ignored).
pub async fn update_document(
    pool: &DbPool,
    storage: &FileStorage,
    id: Uuid,
    update: DocumentUpdate,
    caller_id: Uuid,
) -> AppResult<DocumentResponse> {
    let doc = db::documents::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    authorize_owner_or_admin(pool, &doc, caller_id, "update").await?;

    let old_file_path = doc.file_path.clone();
    let mut active = apply_field_updates(doc, update.name, update.description);

    if let Some(file) = update.file.filter(|f| !f.data.is_empty()) {
        if let Err(e) = storage.delete(&old_file_path).await {
            warn!("Failed to delete replaced file {}: {}", old_file_path, e);
        }

        let file_path = storage.save(&file.filename, &file.data).await?;
        active.file_path = Set(file_path);
        active.content_type = Set(file.content_type);
        active.file_size = Set(file.data.len() as i64);
    }

    let txn = pool.begin().await?;
    let updated = db::documents::update(&txn, active).await?;
    if !update.metadata.is_empty() {
        db::documents::replace_metadata(&txn, updated.id, &update.metadata).await?;
    }
    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit update: {}", e)))?;

    let metadata = db::documents::metadata_for_document(pool.connection(), updated.id).await?;

    info!("Updated document {} by user {}", updated.id, caller_id);

    Ok(DocumentResponse::from_rows(updated, None, metadata))
}

/// Delete a document, its metadata, and its stored file.
///
/// The id is validated before any repository access. The stored file is
/// deleted before the row; the row delete and the metadata cascade share one
/// commit.
pub async fn delete_document(
    pool: &DbPool,
    storage: &FileStorage,
    id: &str,
    caller_id: Uuid,
) -> AppResult<()> {
    let document_id = Uuid::parse_str(id)
        .map_err(|_| AppError::Validation("Invalid document ID".to_string()))?;

    let doc = db::documents::find_by_id(pool.connection(), document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    authorize_owner_or_admin(pool, &doc, caller_id, "delete").await?;

    storage.delete(&doc.file_path).await?;

    let txn = pool.begin().await?;
    db::documents::delete(&txn, doc).await?;
    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))?;

    info!("Deleted document {} by user {}", document_id, caller_id);

    Ok(())
}

/// Fetch a document's stored bytes for download.
pub async fn download_document(
    pool: &DbPool,
    storage: &FileStorage,
    id: Uuid,
) -> AppResult<(document::Model, Vec<u8>)> {
    let doc = db::documents::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    let data = storage.load(&doc.file_path).await?;

    Ok((doc, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_file(len: usize) -> UploadedFile {
        UploadedFile {
            filename: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![0u8; len],
        }
    }

    #[test]
    fn test_validate_upload_rejects_empty_file() {
        let result = validate_upload(&sample_file(0));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_upload_boundary() {
        // Exactly 10 MiB passes
        assert!(validate_upload(&sample_file(10 * 1024 * 1024)).is_ok());
        // One byte over fails
        assert!(matches!(
            validate_upload(&sample_file(10 * 1024 * 1024 + 1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_with_absent_name_leaves_name_unchanged() {
        let doc = other_users_document(Uuid::new_v4());
        let original_name = doc.name.clone();

        let active = apply_field_updates(doc, None, Some("new description".to_string()));

        assert!(matches!(active.name, sea_orm::ActiveValue::Unchanged(_)));
        assert_eq!(active.name.as_ref(), &original_name);
        assert_eq!(active.description.as_ref().as_str(), "new description");
        assert!(matches!(
            active.last_modified,
            sea_orm::ActiveValue::Set(Some(_))
        ));
    }

    #[test]
    fn test_update_with_supplied_name_overwrites() {
        let doc = other_users_document(Uuid::new_v4());

        let active = apply_field_updates(doc, Some("renamed.pdf".to_string()), None);

        assert!(matches!(active.name, sea_orm::ActiveValue::Set(_)));
        assert_eq!(active.name.as_ref().as_str(), "renamed.pdf");
        assert!(matches!(
            active.description,
            sea_orm::ActiveValue::Unchanged(_)
        ));
    }

    fn other_users_document(owner: Uuid) -> document::Model {
        document::Model {
            id: Uuid::new_v4(),
            name: "quarterly.pdf".to_string(),
            description: "Q3 numbers".to_string(),
            file_path: "stored.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 128,
            upload_date: chrono::Utc::now(),
            last_modified: None,
            uploaded_by_user_id: owner,
        }
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_id_before_any_query() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        // No query results registered: any repository access would fail loudly
        let pool =
            DbPool::from_connection(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = delete_document(&pool, &storage, "not-a-guid", Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<document::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let id = Uuid::new_v4().to_string();
        let result = delete_document(&pool, &storage, &id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_without_admin_is_forbidden() {
        use crate::entity::user_role;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();

        let owner = Uuid::new_v4();
        let doc = other_users_document(owner);
        let doc_id = doc.id.to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![doc]])
            // Role membership lookup comes back empty: caller is not Admin
            .append_query_results([Vec::<user_role::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let result = delete_document(&pool, &storage, &doc_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<document::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let result = update_document(
            &pool,
            &storage,
            Uuid::new_v4(),
            DocumentUpdate::default(),
            Uuid::new_v4(),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upload_oversized_file_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let pool =
            DbPool::from_connection(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = upload_document(
            &pool,
            &storage,
            "big.bin".to_string(),
            String::new(),
            Vec::new(),
            sample_file(10 * 1024 * 1024 + 1),
            Uuid::new_v4(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        // Nothing was written to storage
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 0);
    }
}
