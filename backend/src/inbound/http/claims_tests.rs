//! Tests for claim HTTP handlers.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    TestService, login, memory_state, seed_admin, seed_user, send, test_app,
};

struct Fixture<S> {
    app: S,
    admin: Cookie<'static>,
    user: Cookie<'static>,
    category: i64,
}

async fn setup() -> Fixture<impl TestService> {
    let (store, state) = memory_state();
    seed_admin(&state, "admin@example.com").await;
    seed_user(&state, "user@example.com").await;
    let category = store
        .category_ids()
        .await
        .first()
        .copied()
        .expect("seeded category")
        .get();
    let app = actix_test::init_service(test_app(state)).await;
    let admin = login(&app, "admin@example.com").await;
    let user = login(&app, "user@example.com").await;
    Fixture {
        app,
        admin,
        user,
        category,
    }
}

async fn file_claim<S: TestService>(fixture: &Fixture<S>, subject: &str) -> i64 {
    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post().uri("/api/v1/claims").set_json(json!({
            "categoryId": fixture.category,
            "subject": subject,
            "description": "The technician never arrived"
        })),
        Some(&fixture.user),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("numeric id")
}

async fn patch<S: TestService>(
    fixture: &Fixture<S>,
    uri: &str,
    body: Value,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    send(
        &fixture.app,
        actix_test::TestRequest::patch().uri(uri).set_json(body),
        Some(cookie),
    )
    .await
}

#[actix_web::test]
async fn create_and_list_own() {
    let fixture = setup().await;
    let id = file_claim(&fixture, "Missed visit").await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/user-claims?include=category"),
        Some(&fixture.user),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id);
    assert_eq!(body[0]["status"], "pending");
    assert_eq!(body[0]["answeredAt"], Value::Null);
    assert!(body[0]["category"]["name"].is_string());

    let (_, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/user-claims"),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(body, json!([]));
}

#[rstest]
#[case(json!({ "subject": "x", "description": "y" }), "categoryId")]
#[case(json!({ "categoryId": 1, "subject": " ", "description": "y" }), "subject")]
#[case(json!({ "categoryId": 1, "subject": "x", "description": "" }), "description")]
#[actix_web::test]
async fn create_validates_fields(#[case] payload: Value, #[case] field: &str) {
    let fixture = setup().await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/claims")
            .set_json(payload),
        Some(&fixture.user),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn answering_marks_claim_answered_and_can_repeat() {
    let fixture = setup().await;
    let id = file_claim(&fixture, "Missed visit").await;
    let uri = format!("/api/v1/claims/{id}/answer");

    let (status, body) = patch(&fixture, &uri, json!({ "answer": "Rescheduled" }), &fixture.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "answered");
    assert_eq!(body["answer"], "Rescheduled");
    assert!(body["answeredAt"].is_string());

    let (status, body) = patch(&fixture, &uri, json!({ "answer": "  " }), &fixture.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "answered");
    assert_eq!(body["answer"], Value::Null);
    assert!(body["answeredAt"].is_string());

    let (status, _) = patch(&fixture, &uri, json!({ "answer": "hi" }), &fixture.user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn closed_claims_cannot_be_answered() {
    let fixture = setup().await;
    let id = file_claim(&fixture, "Missed visit").await;

    let (status, body) = patch(
        &fixture,
        &format!("/api/v1/claims/{id}/status"),
        json!({ "status": "completed" }),
        &fixture.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answeredAt"], Value::Null);

    let (status, body) = patch(
        &fixture,
        &format!("/api/v1/claims/{id}/answer"),
        json!({ "answer": "late" }),
        &fixture.admin,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["from"], "completed");
}

#[actix_web::test]
async fn update_changes_fields_and_rejects_unknown_status() {
    let fixture = setup().await;
    let id = file_claim(&fixture, "Missed visit").await;
    let uri = format!("/api/v1/claims/{id}");

    let (status, body) = patch(
        &fixture,
        &uri,
        json!({ "subject": "Missed visit on Monday", "status": "answered", "answer": "Sorry" }),
        &fixture.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["subject"], "Missed visit on Monday");
    assert_eq!(body["status"], "answered");
    assert!(body["answeredAt"].is_string());

    let (status, body) = patch(&fixture, &uri, json!({ "status": "archived" }), &fixture.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["value"], "archived");
}

#[actix_web::test]
async fn admin_listing_pages_and_counts() {
    let fixture = setup().await;
    for n in 0..3 {
        file_claim(&fixture, &format!("Claim {n}")).await;
    }
    let answered = file_claim(&fixture, "Noisy fridge").await;
    patch(
        &fixture,
        &format!("/api/v1/claims/{answered}/answer"),
        json!({}),
        &fixture.admin,
    )
    .await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/admin/all?page=2&perPage=3"),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 3);
    assert_eq!(body["lastPage"], 2);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/admin/all?search=fridge&include=requester"),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["requester"]["email"], "user@example.com");

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/admin/stats"),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total": 4,
            "byStatus": { "pending": 3, "completed": 0, "cancelled": 0, "answered": 1 }
        })
    );

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/claims/admin/all"),
        Some(&fixture.user),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn delete_removes_claim() {
    let fixture = setup().await;
    let id = file_claim(&fixture, "Missed visit").await;
    let uri = format!("/api/v1/claims/{id}");

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::delete().uri(&uri),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::delete().uri(&uri),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
