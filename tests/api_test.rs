//! Router-level tests that need no Postgres or Redis.
//!
//! Authentication, role checks and request validation are all decided before
//! any store access, so they run against an unreachable backend.

mod helpers;

use aquaclean::{app_state::Settings, models::user::Role, routes};
use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use uuid::Uuid;

fn app() -> axum::Router {
    routes::router(offline_state(Settings {
        otp_debug: false,
        maps_api_key: Some("maps-test-key".into()),
    }))
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (status, body) = call(&app(), "GET", "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let token = expired_token_for(Role::Customer, Uuid::new_v4());
    let (status, body) = call(&app(), "GET", "/api/addresses", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token expired");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let token = format!("{}x", token_for(Role::Admin, Uuid::new_v4()));
    let (status, _) = call(&app(), "GET", "/api/admin/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn each_portal_rejects_other_roles() {
    let app = app();
    let customer = token_for(Role::Customer, Uuid::new_v4());
    let technician = token_for(Role::FieldTeam, Uuid::new_v4());
    let admin = token_for(Role::Admin, Uuid::new_v4());

    let cases = [
        ("/api/field/jobs", &customer, "field_team access required"),
        ("/api/admin/dashboard-stats", &technician, "admin access required"),
        ("/api/bookings", &admin, "customer access required"),
        ("/api/admin/customers", &customer, "admin access required"),
    ];
    for (uri, token, detail) in cases {
        let (status, body) = call(&app, "GET", uri, Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["detail"], detail, "{uri}");
    }
}

#[tokio::test]
async fn staff_registration_requires_an_admin() {
    let app = app();
    let body = json!({
        "email": "new.tech@example.in",
        "password": "secret123",
        "name": "New Tech",
        "phone": "9876543210",
        "employee_id": "EMP-900"
    });

    let (status, _) = call(&app, "POST", "/api/field/register", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let technician = token_for(Role::FieldTeam, Uuid::new_v4());
    let (status, _) = call(&app, "POST", "/api/field/register", Some(&technician), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn completion_without_evidence_is_rejected_before_any_lookup() {
    let app = app();
    let token = token_for(Role::FieldTeam, Uuid::new_v4());
    let uri = format!("/api/field/jobs/{}/complete", Uuid::new_v4());

    let cases = [
        (
            json!({"before_photo_urls": " , ", "after_photo_urls": "a.jpg", "customer_signature": "sig"}),
            "Missing completion evidence: before_photos",
        ),
        (
            json!({"before_photo_urls": "b.jpg", "after_photo_urls": "", "customer_signature": "sig"}),
            "Missing completion evidence: after_photos",
        ),
        (
            json!({"before_photo_urls": ["b.jpg"], "after_photo_urls": ["a.jpg"], "customer_signature": "  "}),
            "Missing completion evidence: signature",
        ),
    ];
    for (body, detail) in cases {
        let (status, response) = call(&app, "POST", &uri, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["detail"], detail);
    }
}

#[tokio::test]
async fn admin_cannot_set_field_statuses() {
    let app = app();
    let token = token_for(Role::Admin, Uuid::new_v4());
    let uri = format!("/api/admin/bookings/{}/status", Uuid::new_v4());

    for (target, detail) in [
        ("completed", "Status completed is set by the assigned technician"),
        ("in-progress", "Status in-progress is set by the assigned technician"),
    ] {
        let (status, response) =
            call(&app, "PUT", &uri, Some(&token), Some(json!({"status": target}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["detail"], detail);
    }
}

#[tokio::test]
async fn blank_incident_description_is_rejected() {
    let token = token_for(Role::FieldTeam, Uuid::new_v4());
    let uri = format!("/api/field/jobs/{}/incident", Uuid::new_v4());
    let body = json!({"description": "   ", "severity": "high", "unable_to_proceed": true});

    let (status, response) = call(&app(), "POST", &uri, Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"], "Incident description is required");
}

#[tokio::test]
async fn checklist_updates_are_validated_first() {
    let app = app();
    let token = token_for(Role::FieldTeam, Uuid::new_v4());
    let uri = format!("/api/field/jobs/{}/checklist", Uuid::new_v4());

    let (status, response) = call(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"step_name": "polish", "status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"], "Unknown checklist step: polish");

    let (status, _) = call(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({"step_name": "drain", "status": "pending"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn address_coordinates_are_range_checked() {
    let token = token_for(Role::Customer, Uuid::new_v4());
    let body = json!({"name": "Home", "address_line": "12 MG Road", "lat": 120.0, "lng": 77.6});

    let (status, _) = call(&app(), "POST", "/api/addresses", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn maps_config_returns_the_key() {
    let token = token_for(Role::Customer, Uuid::new_v4());
    let (status, body) = call(&app(), "GET", "/api/maps/config", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_key"], "maps-test-key");
}

#[tokio::test]
async fn maps_config_without_a_key_is_unavailable() {
    let app = routes::router(offline_state(Settings::default()));
    let (status, body) = call(&app, "GET", "/api/maps/config", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains("MAPS_API_KEY"));
}
