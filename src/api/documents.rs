//! Document API handlers.
//!
//! Uploads and updates arrive as multipart forms with text fields `name`,
//! `description`, a JSON-encoded `metadata` array, and a `file` part. Fields
//! are buffered here; the services own validation and authorization.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures_util::StreamExt;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{DocumentQueryParams, MetadataEntry};
use crate::services::{self, DocumentUpdate, FileStorage, UploadedFile};

/// Parsed multipart form for uploads and updates.
#[derive(Default)]
struct DocumentForm {
    name: Option<String>,
    description: Option<String>,
    metadata: Vec<MetadataEntry>,
    file: Option<UploadedFile>,
}

/// Buffer the remaining chunks of a field.
async fn read_bytes(field: &mut actix_multipart::Field) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| AppError::Validation(format!("Read error: {}", e)))?;
        data.extend_from_slice(&bytes);
    }
    Ok(data)
}

/// Buffer a text field as UTF-8.
async fn read_text(field: &mut actix_multipart::Field) -> AppResult<String> {
    let data = read_bytes(field).await?;
    String::from_utf8(data)
        .map_err(|e| AppError::Validation(format!("Invalid UTF-8 in form field: {}", e)))
}

/// Read the multipart payload into a [`DocumentForm`].
async fn read_document_form(payload: &mut Multipart) -> AppResult<DocumentForm> {
    let mut form = DocumentForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::Validation("Missing content disposition".to_string()))?;

        let field_name = content_disposition
            .get_name()
            .map(|name| name.to_string())
            .unwrap_or_default();

        match field_name.as_str() {
            "name" => form.name = Some(read_text(&mut field).await?),
            "description" => form.description = Some(read_text(&mut field).await?),
            "metadata" => {
                let raw = read_text(&mut field).await?;
                if !raw.is_empty() {
                    form.metadata = serde_json::from_str(&raw).map_err(|e| {
                        AppError::Validation(format!("Invalid metadata JSON: {}", e))
                    })?;
                }
            }
            "file" => {
                let filename = content_disposition
                    .get_filename()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = read_bytes(&mut field).await?;

                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {
                // Drain unknown fields
                while let Some(chunk) = field.next().await {
                    let _ = chunk;
                }
            }
        }
    }

    Ok(form)
}

/// List documents with filtering, sorting, and pagination.
///
/// GET /api/v1/documents
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "Documents",
    params(
        ("file_name" = Option<String>, Query, description = "Substring filter on document name"),
        ("description" = Option<String>, Query, description = "Substring filter on description (applied with file_name)"),
        ("file_type" = Option<String>, Query, description = "Substring filter on the FileType metadata value"),
        ("category" = Option<String>, Query, description = "Substring filter on the Category metadata value"),
        ("from_date" = Option<String>, Query, description = "Inclusive lower bound on upload date (RFC 3339)"),
        ("to_date" = Option<String>, Query, description = "Inclusive upper bound on upload date (RFC 3339)"),
        ("page" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Items per page (default: 10, max: 100)"),
        ("sort_by" = Option<String>, Query, description = "name, uploaddate, or filesize (default: uploaddate)"),
        ("sort_descending" = Option<bool>, Query, description = "Sort direction (default: true)")
    ),
    responses(
        (status = 200, description = "Page of documents", body = crate::models::DocumentListResponse)
    ),
    security(("bearer_token" = []))
)]
#[get("/documents")]
pub async fn list_documents(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<DocumentQueryParams>,
) -> AppResult<HttpResponse> {
    let response = services::documents::list_documents(pool.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Get a document by id.
///
/// GET /api/v1/documents/{id}
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document detail", body = crate::models::DocumentResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[get("/documents/{id}")]
pub async fn get_document(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path.into_inner())?;
    let response = services::documents::get_document(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Download a document's stored file.
///
/// GET /api/v1/documents/{id}/download
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/download",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "Document or stored file not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[get("/documents/{id}/download")]
pub async fn download_document(
    _auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<FileStorage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path.into_inner())?;
    let (doc, data) =
        services::documents::download_document(pool.get_ref(), storage.get_ref(), id).await?;

    Ok(HttpResponse::Ok()
        .content_type(doc.content_type)
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", doc.name.replace('"', "")),
        ))
        .body(data))
}

/// Upload a new document.
///
/// POST /api/v1/documents
/// Content-Type: multipart/form-data
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "Documents",
    responses(
        (status = 201, description = "Document created", body = crate::models::DocumentResponse),
        (status = 400, description = "Empty or oversized file", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[post("/documents")]
pub async fn upload_document(
    auth: AuthUser,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    storage: web::Data<FileStorage>,
) -> AppResult<HttpResponse> {
    let form = read_document_form(&mut payload).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::Validation("File is empty".to_string()))?;

    let response = services::documents::upload_document(
        pool.get_ref(),
        storage.get_ref(),
        form.name.unwrap_or_default(),
        form.description.unwrap_or_default(),
        form.metadata,
        file,
        auth.user_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(response))
}

/// Update a document.
///
/// PUT /api/v1/documents/{id}
/// Content-Type: multipart/form-data
#[utoipa::path(
    put,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document updated", body = crate::models::DocumentResponse),
        (status = 403, description = "Caller is not owner or Admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[put("/documents/{id}")]
pub async fn update_document(
    auth: AuthUser,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    storage: web::Data<FileStorage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path.into_inner())?;
    let form = read_document_form(&mut payload).await?;

    let update = DocumentUpdate {
        name: form.name,
        description: form.description,
        metadata: form.metadata,
        file: form.file,
    };

    let response = services::documents::update_document(
        pool.get_ref(),
        storage.get_ref(),
        id,
        update,
        auth.user_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Delete a document, its metadata, and its stored file.
///
/// DELETE /api/v1/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 400, description = "Malformed document id", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not owner or Admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[delete("/documents/{id}")]
pub async fn delete_document(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<FileStorage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    // Id validation is the service's first step, before any repository access
    services::documents::delete_document(
        pool.get_ref(),
        storage.get_ref(),
        &path.into_inner(),
        auth.user_id,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure document routes.
/// Note: More specific routes must be registered before generic ones.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_documents)
        // Specific paths first
        .service(download_document)
        // Generic paths last
        .service(get_document)
        .service(upload_document)
        .service(update_document)
        .service(delete_document);
}
