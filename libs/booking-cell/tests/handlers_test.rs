use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use booking_cell::router::booking_routes;
use booking_cell::services::ledger::BookingLedger;
use booking_cell::services::slots::SlotCalculator;
use booking_cell::BookingState;
use catalog_cell::memory::StaticCatalog;
use catalog_cell::models::ClinicService;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

struct TestApp {
    router: Router,
    service: ClinicService,
    jwt_secret: String,
}

fn test_app() -> TestApp {
    let test_config = TestConfig::default();
    let config = test_config.to_arc();

    let catalog = Arc::new(StaticCatalog::new());
    let service = ClinicService {
        id: Uuid::new_v4(),
        clinic_id: Uuid::new_v4(),
        service_id: Uuid::new_v4(),
        name: "General consultation".to_string(),
        price: 80.0,
        duration_minutes: 30,
    };
    catalog.insert_service(service.clone()).unwrap();

    let timeout = Duration::from_millis(500);
    let ledger = Arc::new(BookingLedger::new(catalog.clone(), timeout));
    let slots = Arc::new(SlotCalculator::new(catalog, ledger.clone(), timeout));

    let state = Arc::new(BookingState {
        config,
        ledger,
        slots,
    });

    TestApp {
        router: booking_routes(state),
        service,
        jwt_secret: test_config.jwt_secret,
    }
}

fn bearer(app: &TestApp, user: &TestUser) -> String {
    format!(
        "Bearer {}",
        JwtTestUtils::create_test_token(user, &app.jwt_secret, Some(24))
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rejects_request_without_token() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/patients/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_expired_token() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_expired_token(&patient, &app.jwt_secret);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/patients/{}", patient.id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn books_and_fetches_an_appointment() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let auth = bearer(&app, &patient);
    let start = (Utc::now() + ChronoDuration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", &auth)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "patient_id": patient.id,
                        "clinic_service_id": app.service.id,
                        "appointment_start": start,
                        "notes": "First visit"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["booking"]["status"], json!("pending"));
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/{}", booking_id))
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["booking"]["id"], json!(booking_id));
}

#[tokio::test]
async fn cannot_book_for_another_patient() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let other = TestUser::patient("other@example.com");
    let start = (Utc::now() + ChronoDuration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

    let auth = bearer(&app, &patient);
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", &auth)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "patient_id": other.id,
                        "clinic_service_id": app.service.id,
                        "appointment_start": start,
                        "notes": null
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn double_booking_conflicts_over_http() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let auth = bearer(&app, &patient);
    let start = (Utc::now() + ChronoDuration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

    let request = |auth: &str| {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("Authorization", auth)
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({
                    "patient_id": patient.id,
                    "clinic_service_id": app.service.id,
                    "appointment_start": start,
                    "notes": null
                })
                .to_string(),
            ))
            .unwrap()
    };

    let first = app.router.clone().oneshot(request(&auth)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.router.clone().oneshot(request(&auth)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn slot_query_with_inverted_window_is_rejected() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let from = (Utc::now() + ChronoDuration::days(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let to = (Utc::now() + ChronoDuration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

    let auth = bearer(&app, &patient);
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/slots?clinic_service_id={}&from={}&to={}",
                    app.service.id, from, to
                ))
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slots_shrink_after_a_booking() {
    let app = test_app();
    let patient = TestUser::patient("patient@example.com");
    let auth = bearer(&app, &patient);

    let day = (Utc::now() + ChronoDuration::days(2)).date_naive();
    let from = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let to = from + ChronoDuration::days(1);
    let slots_uri = format!(
        "/slots?clinic_service_id={}&from={}&to={}",
        app.service.id,
        from.to_rfc3339_opts(SecondsFormat::Secs, true),
        to.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&slots_uri)
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let before = json_body(response).await["slots"].as_array().unwrap().len();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", &auth)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "patient_id": patient.id,
                        "clinic_service_id": app.service.id,
                        "appointment_start": day
                            .and_hms_opt(10, 0, 0)
                            .unwrap()
                            .and_utc()
                            .to_rfc3339_opts(SecondsFormat::Secs, true),
                        "notes": null
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&slots_uri)
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let after = json_body(response).await["slots"].as_array().unwrap().len();

    assert_eq!(after, before - 1);
}
