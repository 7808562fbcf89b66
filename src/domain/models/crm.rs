//! Wire schemas for the GoHighLevel REST API. Only the fields this service
//! reads or writes are modelled; unknown fields are ignored on deserialize.

use serde::{Deserialize, Serialize};
use chrono::Weekday;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhlCalendar {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub open_hours: Vec<GhlOpenHoursBlock>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhlOpenHoursBlock {
    #[serde(default)]
    pub days_of_the_week: Vec<GhlWeekday>,
    #[serde(default)]
    pub hours: Vec<GhlHourBlock>,
}

/// GHL encodes weekdays either as names ("Monday") or as numeric indices
/// with 0 = Sunday.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GhlWeekday {
    Index(u8),
    Name(String),
}

impl GhlWeekday {
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            GhlWeekday::Index(i) => u32::from(*i) == weekday.num_days_from_sunday(),
            GhlWeekday::Name(name) => {
                name.eq_ignore_ascii_case(super::availability::weekday_name(weekday))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GhlHourBlock {
    pub open_hour: u32,
    pub open_minute: u32,
    pub close_hour: u32,
    pub close_minute: u32,
}

/// An existing appointment on a GHL calendar; times are RFC3339 strings.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhlEvent {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub appointment_status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhlContact {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location_id: String,
    pub tags: Vec<String>,
    pub source: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub calendar_id: String,
    pub location_id: String,
    pub contact_id: String,
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub appointment_status: String,
    pub ignore_date_range: bool,
    pub to_notify: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhlAppointment {
    pub id: String,
    #[serde(default)]
    pub appointment_status: Option<String>,
}

// Response envelopes.

#[derive(Debug, Deserialize)]
pub struct CalendarsResponse {
    #[serde(default)]
    pub calendars: Vec<GhlCalendar>,
}

#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<GhlEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ContactSearchResponse {
    #[serde(default)]
    pub contacts: Vec<GhlContact>,
}

#[derive(Debug, Deserialize)]
pub struct ContactEnvelope {
    pub contact: GhlContact,
}
