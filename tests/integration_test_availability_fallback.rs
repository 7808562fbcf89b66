mod common;

use std::sync::atomic::Ordering;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{
    enable_ghl_mode, future_date, ghl_event, insert_booking, seed_week_schedule, week_calendar,
    TestApp,
};
use serde_json::Value;
use tower::util::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn get_availability(app: &TestApp, query: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/availability/ghl?{query}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_ghl_calendar_supplies_slots_when_enabled() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    app.crm.add_calendar(week_calendar("cal-1", 9, 13));

    let date = future_date(7);
    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "ghl");
    assert_eq!(body["hasAvailability"], true);
    assert_eq!(body["debug"]["useGhlCalendar"], true);
    assert_eq!(body["debug"]["calendarId"], "cal-1");

    let slots = body["timeSlots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[0]["calendarId"], "cal-1");
    assert_eq!(slots[1]["time"], "10:00");
}

#[tokio::test]
async fn test_ghl_event_blocks_overlapping_slots() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    app.crm.add_calendar(week_calendar("cal-1", 9, 18));

    let date = future_date(7);
    app.crm.add_event(ghl_event(&date, "10:00", "13:00"));

    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "ghl");

    let slots = body["timeSlots"].as_array().unwrap();
    let slot_at = |time: &str| {
        slots
            .iter()
            .find(|s| s["time"] == time)
            .unwrap_or_else(|| panic!("slot {time} missing"))
    };

    assert_eq!(slot_at("09:00")["available"], false);
    assert_eq!(slot_at("10:00")["available"], false);
    assert_eq!(slot_at("12:00")["available"], false);
    assert_eq!(slot_at("13:00")["available"], true);
}

#[tokio::test]
async fn test_crm_outage_falls_back_to_local_store() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    seed_week_schedule(&app, "artist-1", "09:00", "13:00").await;
    app.crm.fail_availability.store(true, Ordering::SeqCst);

    let date = future_date(7);
    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    // Never an error to the caller.
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "website");
    assert_eq!(body["timeSlots"].as_array().unwrap().len(), 2);

    let ghl_error = body["debug"]["ghlError"].as_str().unwrap();
    assert!(ghl_error.contains("status 503"), "got: {ghl_error}");
}

#[tokio::test]
async fn test_empty_ghl_day_falls_back_to_local_store() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    // Two open hours cannot fit a three hour appointment.
    app.crm.add_calendar(week_calendar("cal-1", 10, 12));
    seed_week_schedule(&app, "artist-1", "09:00", "13:00").await;

    let date = future_date(7);
    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "website");
    assert_eq!(body["timeSlots"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_calendar_falls_back_to_local_store() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    seed_week_schedule(&app, "artist-1", "09:00", "13:00").await;

    let date = future_date(7);
    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "website");
    let ghl_error = body["debug"]["ghlError"].as_str().unwrap();
    assert!(ghl_error.contains("calendar cal-1"), "got: {ghl_error}");
}

#[tokio::test]
async fn test_local_bookings_still_block_ghl_slots() {
    let app = TestApp::new().await;
    enable_ghl_mode(&app).await;
    app.crm.add_calendar(week_calendar("cal-1", 9, 18));

    let date = future_date(7);
    insert_booking(&app, &date, "10:00", "13:00").await;

    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "ghl");

    let slots = body["timeSlots"].as_array().unwrap();
    let taken = slots.iter().find(|s| s["time"] == "10:00").unwrap();
    assert_eq!(taken["available"], false);
    let free = slots.iter().find(|s| s["time"] == "13:00").unwrap();
    assert_eq!(free["available"], true);
}

#[tokio::test]
async fn test_first_calendar_is_used_when_none_is_configured() {
    let app = TestApp::with_config(|config| {
        config.ghl_calendar_id = None;
    })
    .await;
    enable_ghl_mode(&app).await;
    app.crm.add_calendar(week_calendar("cal-9", 9, 13));

    let date = future_date(7);
    let response = get_availability(&app, &format!("date={date}&duration=3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["source"], "ghl");
    assert_eq!(body["debug"]["calendarId"], "cal-9");
}
