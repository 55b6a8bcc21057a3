//! Tests for technician directory and review handlers.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    Cast, PASSWORD, TestService, login, memory_state, request_payload, seed_cast, send, test_app,
};

struct Fixture<S> {
    app: S,
    cast: Cast,
    admin: Cookie<'static>,
    user: Cookie<'static>,
    other_user: Cookie<'static>,
    technician: Cookie<'static>,
    other_technician: Cookie<'static>,
    category: i64,
}

async fn setup() -> Fixture<impl TestService> {
    let (store, state) = memory_state();
    let cast = seed_cast(&state).await;
    let category = store
        .category_ids()
        .await
        .first()
        .copied()
        .expect("seeded category")
        .get();
    let app = actix_test::init_service(test_app(state)).await;
    Fixture {
        admin: login(&app, "admin@example.com").await,
        user: login(&app, "user@example.com").await,
        other_user: login(&app, "other@example.com").await,
        technician: login(&app, "tech@example.com").await,
        other_technician: login(&app, "tech2@example.com").await,
        app,
        cast,
        category,
    }
}

/// A request opened by `user` and claimed by `technician`.
async fn served_request<S: TestService>(fixture: &Fixture<S>) -> i64 {
    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/service-requests")
            .set_json(request_payload(fixture.category)),
        Some(&fixture.user),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().expect("numeric id");
    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::patch().uri(&format!("/api/v1/service-requests/{id}/assign-to-myself")),
        Some(&fixture.technician),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

async fn review<S: TestService>(
    fixture: &Fixture<S>,
    technician: i64,
    body: Value,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/technicians/{technician}/reviews"))
            .set_json(body),
        Some(cookie),
    )
    .await
}

#[actix_web::test]
async fn directory_is_public() {
    let fixture = setup().await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/technicians"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let emails: Vec<_> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["email"].clone())
        .collect();
    assert_eq!(emails, vec![json!("tech@example.com"), json!("tech2@example.com")]);
    assert_eq!(body[0]["averageRating"], 0.0);
    assert_eq!(body[0]["reviewsCount"], 0);

    let id = fixture.cast.technician.id.get();
    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri(&format!("/api/v1/technicians/{id}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test Technician");

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri("/api/v1/technicians/9999"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_creates_technician_who_can_log_in() {
    let fixture = setup().await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post().uri("/api/v1/technicians").set_json(json!({
            "name": "Tom Plumber",
            "email": "tom@example.com",
            "password": PASSWORD,
            "city": "Lima",
            "availabilityDate": "2026-03-01"
        })),
        Some(&fixture.admin),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["availabilityDate"], "2026-03-01");
    assert_eq!(body["city"], "Lima");

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login/technician")
            .set_json(json!({ "email": "tom@example.com", "password": PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["role"], "technician");
}

#[rstest]
#[case(json!({ "email": "tom@example.com", "password": "pw" }), "name")]
#[case(json!({ "name": "Tom", "password": "pw" }), "email")]
#[case(json!({ "name": "Tom", "email": "tom@example.com" }), "password")]
#[actix_web::test]
async fn create_validates_account_fields(#[case] payload: Value, #[case] field: &str) {
    let fixture = setup().await;

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/technicians")
            .set_json(payload),
        Some(&fixture.admin),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn create_is_admin_only() {
    let fixture = setup().await;
    let payload = json!({ "name": "Tom", "email": "tom@example.com", "password": PASSWORD });

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/technicians")
            .set_json(payload.clone()),
        Some(&fixture.user),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri("/api/v1/technicians")
            .set_json(payload),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn update_sets_and_clears_availability() {
    let fixture = setup().await;
    let uri = format!("/api/v1/technicians/{}", fixture.cast.technician.id.get());

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "name": "Renamed", "availabilityDate": "2026-04-02" })),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["availabilityDate"], "2026-04-02");

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "availabilityDate": null })),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["availabilityDate"], Value::Null);

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "name": "  " })),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "name");
}

#[actix_web::test]
async fn delete_refuses_technicians_with_requests() {
    let fixture = setup().await;
    served_request(&fixture).await;
    let busy = format!("/api/v1/technicians/{}", fixture.cast.technician.id.get());
    let idle = format!("/api/v1/technicians/{}", fixture.cast.other_technician.id.get());

    let (status, body) = send(
        &fixture.app,
        actix_test::TestRequest::delete().uri(&busy),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "technician_in_use");

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::delete().uri(&idle),
        Some(&fixture.admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&fixture.app, actix_test::TestRequest::get().uri(&idle), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn requester_reviews_their_technician_once() {
    let fixture = setup().await;
    let request = served_request(&fixture).await;
    let technician = fixture.cast.technician.id.get();
    let body = json!({ "technicianRequestId": request, "score": 4, "description": " Quick " });

    let (status, rating) = review(&fixture, technician, body.clone(), &fixture.user).await;
    assert_eq!(status, StatusCode::CREATED, "{rating}");
    assert_eq!(rating["score"], 4);
    assert_eq!(rating["description"], "Quick");
    assert_eq!(rating["technicianRequestId"], request);

    let (status, err) = review(&fixture, technician, body, &fixture.user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["details"]["code"], "duplicate_rating");

    let (_, listed) = send(
        &fixture.app,
        actix_test::TestRequest::get().uri(&format!("/api/v1/technicians/{technician}")),
        None,
    )
    .await;
    assert_eq!(listed["averageRating"], 4.0);
    assert_eq!(listed["reviewsCount"], 1);
}

#[actix_web::test]
async fn reviews_check_ownership_and_technician() {
    let fixture = setup().await;
    let request = served_request(&fixture).await;
    let technician = fixture.cast.technician.id.get();
    let other = fixture.cast.other_technician.id.get();
    let body = json!({ "technicianRequestId": request, "score": 5 });

    let (status, err) = review(&fixture, technician, body.clone(), &fixture.other_user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["details"]["code"], "not_owner");

    let (status, err) = review(&fixture, other, body, &fixture.user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["details"]["code"], "technician_mismatch");

    let (status, _) = review(
        &fixture,
        technician,
        json!({ "technicianRequestId": 9999, "score": 5 }),
        &fixture.user,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = review(
        &fixture,
        technician,
        json!({ "technicianRequestId": request, "score": 5 }),
        &fixture.other_technician,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case(json!({ "technicianRequestId": 1, "score": 0 }), "score")]
#[case(json!({ "technicianRequestId": 1, "score": 6 }), "score")]
#[case(json!({ "technicianRequestId": 1 }), "score")]
#[case(json!({ "score": 3 }), "technicianRequestId")]
#[actix_web::test]
async fn review_body_is_validated(#[case] body: Value, #[case] field: &str) {
    let fixture = setup().await;
    let technician = fixture.cast.technician.id.get();

    let (status, err) = review(&fixture, technician, body, &fixture.user).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"]["field"], field);
}

#[actix_web::test]
async fn reviews_require_login() {
    let fixture = setup().await;
    let technician = fixture.cast.technician.id.get();

    let (status, _) = send(
        &fixture.app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/technicians/{technician}/reviews"))
            .set_json(json!({ "technicianRequestId": 1, "score": 3 })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
