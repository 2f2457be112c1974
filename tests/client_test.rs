//! The client library against an in-process stub of the API.

mod fixtures;
mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aquaclean::{
    client::{
        job::JobExecution,
        session::{Session, SessionStore},
        wizard::{BookingOutcome, BookingWizard},
        ApiClient, ClientError,
    },
    models::{
        booking::{
            AddOns, Booking, BookingCreate, BookingStatus, JobDetail, PaymentOrderResponse,
        },
        job::{Checklist, ChecklistStep, IncidentInput, Severity, StepStatus},
        money::Money,
        user::{Role, SessionUser},
    },
    services::{
        job_tracker::{EvidenceField, JobError, ESCALATION_NOTE},
        pricing,
    },
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use fixtures::*;
use helpers::sample_booking;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Default)]
struct Stub {
    bookings: Mutex<Vec<Booking>>,
    create_order_hits: AtomicUsize,
    complete_hits: AtomicUsize,
    incident_hits: AtomicUsize,
    checklist_hits: AtomicUsize,
    job: Mutex<Option<Booking>>,
}

async fn create_booking(
    State(stub): State<Arc<Stub>>,
    Json(body): Json<BookingCreate>,
) -> (StatusCode, Json<Booking>) {
    let mut booking = sample_booking(Uuid::new_v4(), BookingStatus::Pending, None);
    booking.address_id = body.address_id;
    booking.tank_type = body.tank_type;
    booking.package_type = body.package_type;
    booking.add_disinfection = body.add_disinfection;
    booking.add_maintenance = body.add_maintenance;
    booking.add_repair = body.add_repair;
    booking.payment_method = body.payment_method;
    booking.amount = pricing::quote(body.package_type, &body.add_ons());
    stub.bookings.lock().unwrap().push(booking.clone());
    (StatusCode::CREATED, Json(booking))
}

async fn get_booking(
    State(stub): State<Arc<Stub>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, (StatusCode, Json<Value>)> {
    stub.bookings
        .lock()
        .unwrap()
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, Json(json!({"detail": "Booking not found"}))))
}

async fn create_order(
    State(stub): State<Arc<Stub>>,
    Json(body): Json<Value>,
) -> Json<PaymentOrderResponse> {
    stub.create_order_hits.fetch_add(1, Ordering::SeqCst);
    let id: Uuid = serde_json::from_value(body["booking_id"].clone()).unwrap();
    let mut bookings = stub.bookings.lock().unwrap();
    let booking = bookings.iter_mut().find(|b| b.id == id).unwrap();
    booking.status = BookingStatus::Confirmed;
    Json(PaymentOrderResponse::Cod {
        payment_method: booking.payment_method,
        message: "Booking confirmed".into(),
    })
}

async fn expired_me() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Token expired"})))
}

async fn field_job(State(stub): State<Arc<Stub>>) -> Json<JobDetail> {
    let job = stub.job.lock().unwrap().clone().unwrap();
    Json(JobDetail {
        job,
        address: None,
        customer: None,
    })
}

async fn complete_job(State(stub): State<Arc<Stub>>) -> Json<Value> {
    stub.complete_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({"message": "Job completed successfully"}))
}

async fn report_incident(State(stub): State<Arc<Stub>>) -> (StatusCode, Json<Value>) {
    stub.incident_hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({"message": "Incident reported successfully", "incident_id": Uuid::new_v4()})),
    )
}

async fn update_checklist(State(stub): State<Arc<Stub>>) -> Json<Value> {
    stub.checklist_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({"message": "Checklist updated successfully"}))
}

async fn conflict() -> (StatusCode, Json<Value>) {
    (
        StatusCode::CONFLICT,
        Json(json!({"detail": "Cannot start a job that is completed"})),
    )
}

async fn spawn_stub(stub: Arc<Stub>) -> String {
    let app = Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/payments/create-order", post(create_order))
        .route("/api/auth/me", get(expired_me))
        .route("/api/field/jobs/{id}", get(field_job))
        .route("/api/field/jobs/{id}/start", post(conflict))
        .route("/api/field/jobs/{id}/complete", post(complete_job))
        .route("/api/field/jobs/{id}/incident", post(report_incident))
        .route("/api/field/jobs/{id}/checklist", put(update_checklist))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn session(role: Role) -> Session {
    Session {
        token: "stub-token".into(),
        user: SessionUser {
            id: Uuid::new_v4(),
            email: "asha@example.in".into(),
            name: "Asha".into(),
            role,
            phone: None,
            employee_id: None,
            verified: None,
        },
    }
}

async fn client_with(stub: Arc<Stub>, role: Role) -> ApiClient {
    let base_url = spawn_stub(stub).await;
    let store = Arc::new(SessionStore::in_memory());
    store.save(session(role)).unwrap();
    ApiClient::new(base_url, store)
}

#[tokio::test]
async fn cod_booking_goes_straight_to_confirmation() {
    let stub = Arc::new(Stub::default());
    let client = client_with(stub.clone(), Role::Customer).await;

    let mut wizard = BookingWizard::new();
    wizard.address_id = Some(Uuid::new_v4());
    wizard.next().unwrap();
    wizard.next().unwrap();
    wizard.service_date = NaiveDate::from_ymd_opt(2026, 11, 2);
    wizard.next().unwrap();
    wizard.add_ons = AddOns {
        disinfection: true,
        ..AddOns::default()
    };
    wizard.next().unwrap();
    wizard.payment_method = aquaclean::models::booking::PaymentMethod::Cod;
    assert_eq!(wizard.total(), Money::from_rupees(2000));

    let outcome = wizard.submit(&client).await.unwrap();
    let BookingOutcome::Confirmed(booking) = outcome else {
        panic!("COD booking should not wait for a gateway payment");
    };
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.amount, Money::from_rupees(2000));
    assert_eq!(stub.create_order_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn wizard_total_matches_every_fixture() {
    for fixture in BOOKING_FIXTURES {
        let mut wizard = BookingWizard::new();
        wizard.package_type = fixture.package;
        wizard.add_ons = AddOns {
            disinfection: fixture.disinfection,
            maintenance: fixture.maintenance,
            repair: fixture.repair,
        };
        assert_eq!(
            wizard.total(),
            Money::from_rupees(fixture.expected_rupees),
            "{}",
            fixture.description
        );
    }
}

#[tokio::test]
async fn invalid_wizard_sends_nothing() {
    let stub = Arc::new(Stub::default());
    let client = client_with(stub.clone(), Role::Customer).await;

    let err = BookingWizard::new().submit(&client).await.unwrap_err();
    assert!(matches!(err, ClientError::Wizard(_)));
    assert!(stub.bookings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unauthorized_response_clears_the_session() {
    let stub = Arc::new(Stub::default());
    let client = client_with(stub, Role::Customer).await;
    assert!(client.session().current().is_some());

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(client.session().current().is_none());
}

#[tokio::test]
async fn server_detail_is_surfaced() {
    let stub = Arc::new(Stub::default());
    *stub.job.lock().unwrap() = Some(sample_booking(
        Uuid::new_v4(),
        BookingStatus::Completed,
        Some(Uuid::new_v4()),
    ));
    let client = client_with(stub.clone(), Role::FieldTeam).await;
    let job_id = stub.job.lock().unwrap().as_ref().unwrap().id;

    let mut execution = JobExecution::load(&client, job_id).await.unwrap();
    match execution.start().await.unwrap_err() {
        ClientError::Api { status, detail } => {
            assert_eq!(status, 409);
            assert_eq!(detail, "Cannot start a job that is completed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_completion_never_reaches_the_server() {
    let stub = Arc::new(Stub::default());
    let technician = Uuid::new_v4();
    *stub.job.lock().unwrap() = Some(sample_booking(
        Uuid::new_v4(),
        BookingStatus::InProgress,
        Some(technician),
    ));
    let client = client_with(stub.clone(), Role::FieldTeam).await;
    let job_id = stub.job.lock().unwrap().as_ref().unwrap().id;

    let mut execution = JobExecution::load(&client, job_id).await.unwrap();
    assert!(execution.is_actionable());

    let cases = [
        ("", AFTER_PHOTOS, SIGNATURE, EvidenceField::BeforePhotos),
        (BEFORE_PHOTOS, " , ", SIGNATURE, EvidenceField::AfterPhotos),
        (BEFORE_PHOTOS, AFTER_PHOTOS, "", EvidenceField::Signature),
    ];
    for (before, after, signature, field) in cases {
        let err = execution
            .complete(before, after, signature, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Job(JobError::MissingEvidence(f)) if f == field
        ));
    }
    assert_eq!(stub.complete_hits.load(Ordering::SeqCst), 0);

    let err = execution
        .report_incident(IncidentInput {
            description: "  ".into(),
            severity: Severity::Low,
            photo_urls: None,
            unable_to_proceed: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Job(JobError::EmptyDescription)));
    assert_eq!(stub.incident_hits.load(Ordering::SeqCst), 0);

    execution
        .complete(BEFORE_PHOTOS, AFTER_PHOTOS, SIGNATURE, Some("Tank cleaned".into()))
        .await
        .unwrap();
    assert_eq!(stub.complete_hits.load(Ordering::SeqCst), 1);
    assert!(!execution.is_actionable());
}

#[tokio::test]
async fn accepted_step_update_is_mirrored_despite_a_stale_status() {
    let stub = Arc::new(Stub::default());
    let technician = Uuid::new_v4();
    // Cached before the start was seen: still confirmed, checklist already present.
    let mut cached = sample_booking(Uuid::new_v4(), BookingStatus::Confirmed, Some(technician));
    cached.checklist = Some(Checklist::new(Utc::now()));
    *stub.job.lock().unwrap() = Some(cached);
    let client = client_with(stub.clone(), Role::FieldTeam).await;
    let job_id = stub.job.lock().unwrap().as_ref().unwrap().id;

    let mut execution = JobExecution::load(&client, job_id).await.unwrap();
    execution
        .update_step(ChecklistStep::Drain, StepStatus::Escalate, None)
        .await
        .unwrap();
    assert_eq!(stub.checklist_hits.load(Ordering::SeqCst), 1);

    let checklist = execution.job().checklist.as_ref().unwrap();
    let drain = checklist.step(ChecklistStep::Drain).unwrap();
    assert_eq!(drain.status, StepStatus::Escalate);
    assert_eq!(drain.notes, ESCALATION_NOTE);
    assert!(drain.timestamp.is_some());
}

#[tokio::test]
async fn step_update_without_a_cached_checklist_refreshes() {
    let stub = Arc::new(Stub::default());
    let technician = Uuid::new_v4();
    *stub.job.lock().unwrap() = Some(sample_booking(
        Uuid::new_v4(),
        BookingStatus::Confirmed,
        Some(technician),
    ));
    let client = client_with(stub.clone(), Role::FieldTeam).await;
    let job_id = stub.job.lock().unwrap().as_ref().unwrap().id;
    let mut execution = JobExecution::load(&client, job_id).await.unwrap();
    assert!(execution.job().checklist.is_none());

    // Started elsewhere; the server now holds the checklist.
    {
        let mut job = stub.job.lock().unwrap();
        let job = job.as_mut().unwrap();
        job.status = BookingStatus::InProgress;
        job.checklist = Some(Checklist::new(Utc::now()));
    }

    execution
        .update_step(ChecklistStep::Arrival, StepStatus::Completed, None)
        .await
        .unwrap();
    assert_eq!(stub.checklist_hits.load(Ordering::SeqCst), 1);
    assert_eq!(execution.job().status, BookingStatus::InProgress);
    assert!(execution.job().checklist.is_some());
}
