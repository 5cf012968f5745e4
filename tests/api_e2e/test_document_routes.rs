//! API tests: document endpoints.

use actix_web::test;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_list_documents_requires_token() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api/v1/documents").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn test_garbage_token_is_rejected() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/documents")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn test_get_document_rejects_malformed_id() {
    // 400 from id parsing; the empty pool proves no repository access happened
    let pool = empty_pool();
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::get()
        .uri("/api/v1/documents/not-a-guid")
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn test_delete_document_rejects_malformed_id_before_any_query() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::delete()
        .uri("/api/v1/documents/not-a-guid")
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_delete_missing_document_is_not_found() {
    use docman_lib::entity::document;

    let pool = pool_from(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<document::Model>::new()]),
    );
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/documents/{}", Uuid::new_v4()))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_rt::test]
async fn test_upload_requires_token() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post().uri("/api/v1/documents").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}
