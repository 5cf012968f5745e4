//! API tests: ingestion endpoints.

use actix_web::test;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use uuid::Uuid;

use docman_lib::entity::{document, ingestion_status};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_statuses_require_token() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/ingestion/statuses")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn test_get_status_rejects_malformed_id() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::get()
        .uri("/api/v1/ingestion/status/not-a-guid")
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn test_trigger_missing_document_is_not_found() {
    let pool = pool_from(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<document::Model>::new()]),
    );
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/ingestion/trigger/{}", Uuid::new_v4()))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_cancel_completed_ingestion_is_conflict() {
    let row = ingestion_status::Model {
        id: Uuid::new_v4(),
        document_id: Uuid::new_v4(),
        status: "Completed".to_string(),
        triggered_at: chrono::Utc::now(),
    };
    let row_id = row.id;

    let pool = pool_from(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
    );
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/ingestion/cancel/{}", row_id))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[actix_rt::test]
async fn test_cancel_missing_ingestion_is_not_found() {
    let pool = pool_from(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ingestion_status::Model>::new()]),
    );
    let app = create_test_app(&pool).await;
    let (_, bearer) = bearer();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/ingestion/cancel/{}", Uuid::new_v4()))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 404);
}
