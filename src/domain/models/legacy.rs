use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Appointment rows imported from the studio's previous booking system. The
/// scheduled sweep mirrors these into GHL alongside regular bookings; nothing
/// else writes to them.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAppointment {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub ghl_contact_id: Option<String>,
    pub ghl_appointment_id: Option<String>,
    pub ghl_sync_error: Option<String>,
    pub ghl_retry_count: i32,
    pub ghl_skipped_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
