use serde::Deserialize;

use crate::domain::models::availability::TimeRange;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: Option<String>,
    pub service_name: String,
    pub date: String,
    pub time: String,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub price: Option<f64>,
    pub deposit_amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScheduleUpdate {
    pub day_of_week: String,
    pub is_enabled: bool,
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    #[serde(default)]
    pub services_offered: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub artist_id: String,
    pub days: Vec<DayScheduleUpdate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetScheduleRequest {
    pub artist_id: String,
    pub days: Vec<DayScheduleUpdate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub use_ghl_calendar: Option<bool>,
    pub ghl_api_key: Option<String>,
    pub ghl_location_id: Option<String>,
    pub ghl_calendar_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySingleRequest {
    pub booking_id: String,
}
