mod common;

use std::sync::atomic::Ordering;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{future_date, insert_booking, past_date, TestApp};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

async fn parse_body(response: axum::response::Response) -> Value {
    let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn post_booking(app: &TestApp, date: &str, time: &str) -> Value {
    let payload = json!({
        "clientName": "Mia Janssen",
        "clientEmail": "mia@example.com",
        "clientPhone": "+31612345678",
        "serviceName": "Powder Brows",
        "date": date,
        "time": time
    });
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calendar/book-slot")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_body(response).await
}

async fn retry_single(app: &TestApp, booking_id: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/retry-single-sync")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "bookingId": booking_id }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn run_sweep(app: &TestApp) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cron/sync-ghl")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Row in the studio's pre-migration appointment collection.
async fn insert_legacy_appointment(app: &TestApp, date: &str, time: &str, end_time: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO legacy_appointments (id, client_name, client_email, client_phone, service_name, date, time, end_time, ghl_retry_count, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(&id)
    .bind("Legacy Client")
    .bind("legacy@example.com")
    .bind("+31600000000")
    .bind("Eyeliner Touch-up")
    .bind(date)
    .bind(time)
    .bind(end_time)
    .bind(Utc::now())
    .execute(&app.pool)
    .await
    .expect("Failed to insert legacy appointment");
    id
}

#[tokio::test]
async fn test_retry_on_synced_booking_creates_no_second_appointment() {
    let app = TestApp::new().await;

    let created = post_booking(&app, &future_date(7), "10:00").await;
    assert_eq!(created["ghlSync"]["synced"], true);
    assert_eq!(app.crm.appointment_count(), 1);

    let booking_id = created["booking"]["id"].as_str().unwrap();
    let response = retry_single(&app, booking_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["ghlSync"]["synced"], true);
    assert_eq!(
        body["ghlSync"]["appointmentId"],
        created["ghlSync"]["appointmentId"]
    );
    // Still exactly one upstream appointment.
    assert_eq!(app.crm.appointment_count(), 1);
}

#[tokio::test]
async fn test_failed_sync_records_error_and_retry_bookkeeping() {
    let app = TestApp::new().await;
    app.crm.fail_appointments.store(true, Ordering::SeqCst);

    let created = post_booking(&app, &future_date(7), "10:00").await;
    assert_eq!(created["ghlSync"]["synced"], false);
    let error = created["ghlSync"]["error"].as_str().unwrap();
    assert!(error.contains("status 500"), "got: {error}");

    assert_eq!(created["booking"]["ghlRetryCount"], 1);
    assert!(created["booking"]["ghlSyncError"].is_string());
    assert!(created["booking"]["ghlLastRetry"].is_string());
    // Contact creation succeeded before the appointment call failed.
    assert!(created["booking"]["ghlContactId"].is_string());
    assert_eq!(app.crm.appointment_count(), 0);
}

#[tokio::test]
async fn test_failed_bookings_appear_in_the_admin_list() {
    let app = TestApp::new().await;
    app.crm.fail_appointments.store(true, Ordering::SeqCst);
    post_booking(&app, &future_date(7), "10:00").await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/failed-syncs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["syncState"], "failed");
    assert_eq!(records[0]["retryCount"], 1);
    assert!(records[0]["error"].is_string());
    assert_eq!(records[0]["clientName"], "Mia Janssen");
}

#[tokio::test]
async fn test_manual_retry_heals_after_an_outage() {
    let app = TestApp::new().await;
    app.crm.fail_appointments.store(true, Ordering::SeqCst);
    let created = post_booking(&app, &future_date(7), "10:00").await;
    let booking_id = created["booking"]["id"].as_str().unwrap();
    assert_eq!(app.crm.contact_count(), 1);

    app.crm.fail_appointments.store(false, Ordering::SeqCst);
    let response = retry_single(&app, booking_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["ghlSync"]["synced"], true);
    assert!(body["booking"]["ghlAppointmentId"].is_string());
    assert!(body["booking"]["ghlSyncError"].is_null());
    // The contact stored on the failed attempt is reused, not recreated.
    assert_eq!(app.crm.contact_count(), 1);
    assert_eq!(app.crm.appointment_count(), 1);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/failed-syncs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = parse_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_retry_of_unknown_booking_is_not_found() {
    let app = TestApp::new().await;
    let response = retry_single(&app, "no-such-booking").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_past_dated_records_are_terminally_skipped() {
    let app = TestApp::new().await;
    post_booking(&app, &past_date(2), "10:00").await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/failed-syncs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = parse_body(response).await;
    assert_eq!(body[0]["syncState"], "skipped");
    assert_eq!(body[0]["skippedReason"], "past_date");

    // Sweeps count it but never touch the CRM again.
    for _ in 0..2 {
        let response = run_sweep(&app).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = parse_body(response).await;
        assert_eq!(report["scanned"], 1);
        assert_eq!(report["skippedPast"], 1);
        assert_eq!(report["synced"], 0);
        assert_eq!(report["failed"], 0);
    }
    assert_eq!(app.crm.appointment_count(), 0);
}

#[tokio::test]
async fn test_sweep_skips_records_over_the_retry_ceiling() {
    let app = TestApp::new().await;
    let booking = insert_booking(&app, &future_date(7), "10:00", "13:00").await;

    sqlx::query("UPDATE bookings SET ghl_sync_error = ?, ghl_retry_count = ? WHERE id = ?")
        .bind("GHL API error (status 500): boom")
        .bind(5)
        .bind(&booking.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let response = run_sweep(&app).await;
    let report = parse_body(response).await;
    assert_eq!(report["scanned"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["synced"], 0);
    assert_eq!(app.crm.appointment_count(), 0);

    // An admin-initiated retry ignores the ceiling.
    let response = retry_single(&app, &booking.id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["ghlSync"]["synced"], true);
    assert_eq!(app.crm.appointment_count(), 1);
}

#[tokio::test]
async fn test_bulk_retry_targets_failed_records_only() {
    let app = TestApp::new().await;

    // One failed booking, one past-skipped, one fresh and unsynced.
    app.crm.fail_appointments.store(true, Ordering::SeqCst);
    post_booking(&app, &future_date(7), "10:00").await;
    app.crm.fail_appointments.store(false, Ordering::SeqCst);
    post_booking(&app, &past_date(2), "10:00").await;
    insert_booking(&app, &future_date(8), "14:00", "17:00").await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/retry-failed-syncs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = parse_body(response).await;
    assert_eq!(report["scanned"], 1);
    assert_eq!(report["synced"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(app.crm.appointment_count(), 1);
}

#[tokio::test]
async fn test_sweep_covers_the_legacy_collection() {
    let app = TestApp::new().await;
    insert_booking(&app, &future_date(7), "10:00", "13:00").await;
    let legacy_id = insert_legacy_appointment(&app, &future_date(8), "11:00", "13:00").await;

    let response = run_sweep(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report = parse_body(response).await;
    assert_eq!(report["scanned"], 2);
    assert_eq!(report["synced"], 2);
    assert_eq!(app.crm.appointment_count(), 2);

    let appointment_id: Option<String> =
        sqlx::query_scalar("SELECT ghl_appointment_id FROM legacy_appointments WHERE id = ?")
            .bind(&legacy_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert!(appointment_id.is_some());

    // Legacy rows sync as confirmed appointments.
    let sent = app.crm.last_appointment().unwrap();
    assert_eq!(sent.title, "Eyeliner Touch-up - Legacy Client");
    assert_eq!(sent.appointment_status, "confirmed");
}

#[tokio::test]
async fn test_cron_endpoint_enforces_the_shared_secret() {
    let app = TestApp::with_config(|config| {
        config.cron_secret = Some("sweep-secret".to_string());
    })
    .await;

    let response = run_sweep(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cron/sync-ghl")
                .header("Authorization", "Bearer wrong-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cron/sync-ghl")
                .header("Authorization", "Bearer sweep-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sweep_without_credentials_is_unavailable() {
    let app = TestApp::with_config(|config| {
        config.ghl_api_key = None;
        config.ghl_location_id = None;
        config.ghl_calendar_id = None;
    })
    .await;
    insert_booking(&app, &future_date(7), "10:00", "13:00").await;

    let response = run_sweep(&app).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = parse_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("required for sync"));
}

#[tokio::test]
async fn test_repeat_client_reuses_the_crm_contact() {
    let app = TestApp::new().await;

    post_booking(&app, &future_date(7), "10:00").await;
    post_booking(&app, &future_date(7), "14:00").await;

    assert_eq!(app.crm.contact_count(), 1);
    assert_eq!(app.crm.appointment_count(), 2);
}
