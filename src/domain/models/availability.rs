use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use sqlx::FromRow;
use sqlx::types::Json;

pub const DAY_NAMES: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Weekday name in the stored lowercase form.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

/// One record per (artist, weekday). `time_ranges` is empty when the day is
/// disabled; absence of a record means the day has no availability at all.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAvailability {
    pub id: String,
    pub artist_id: String,
    pub day_of_week: String,
    pub is_enabled: bool,
    pub time_ranges: Json<Vec<TimeRange>>,
    pub services_offered: Json<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

impl ArtistAvailability {
    pub fn new(
        artist_id: String,
        day_of_week: String,
        is_enabled: bool,
        time_ranges: Vec<TimeRange>,
        services_offered: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            artist_id,
            day_of_week,
            is_enabled,
            time_ranges: Json(time_ranges),
            services_offered: Json(services_offered),
            updated_at: Utc::now(),
        }
    }
}

/// One row per whole hour covered by a booking, written in the same
/// transaction as the booking itself.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTimeSlot {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub artist_id: Option<String>,
    pub booking_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl BlockedTimeSlot {
    pub fn new(
        date: NaiveDate,
        time: String,
        artist_id: Option<String>,
        booking_id: String,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            time,
            artist_id,
            booking_id,
            reason,
            created_at: Utc::now(),
        }
    }
}
