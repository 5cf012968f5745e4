//! API tests: health and auth endpoints.

use actix_web::test;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_is_public() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_register_rejects_mismatched_passwords() {
    // Validation fires before any repository access
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(serde_json::json!({
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "password": "longenough1",
            "confirm_password": "different1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_register_rejects_weak_password() {
    let pool = empty_pool();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(serde_json::json!({
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "password": "short1",
            "confirm_password": "short1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn test_login_unknown_email_is_unauthorized() {
    use docman_lib::entity::user;

    let pool = pool_from(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]),
    );
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({
            "email": "ghost@example.com",
            "password": "whatever1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}
