//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Management Server",
        version = "0.3.0",
        description = "API server for uploading and managing documents with external ingestion tracking"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::register,
        api::auth::login,
        // Document endpoints
        api::documents::list_documents,
        api::documents::get_document,
        api::documents::download_document,
        api::documents::upload_document,
        api::documents::update_document,
        api::documents::delete_document,
        // Ingestion endpoints
        api::ingestion::trigger_ingestion,
        api::ingestion::list_statuses,
        api::ingestion::get_status,
        api::ingestion::cancel_ingestion,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            models::Pagination,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::Role,
            models::RegisterRequest,
            models::LoginRequest,
            models::AuthResponse,
            // Documents
            models::MetadataEntry,
            models::DocumentResponse,
            models::DocumentListResponse,
            models::DocumentQueryParams,
            // Ingestion
            models::IngestionState,
            models::IngestionStatusResponse,
            models::IngestionListResponse,
            models::IngestionQueryParams,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration and login"),
        (name = "Documents", description = "Document upload and management"),
        (name = "Ingestion", description = "Ingestion triggering and status tracking")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
