use serde::Serialize;

use crate::domain::models::availability::BlockedTimeSlot;
use crate::domain::models::booking::{Booking, SyncState};
use crate::domain::models::slot::{AvailabilitySource, CandidateSlot};
use crate::domain::services::selector::AvailabilityDebug;
use crate::domain::services::sync::SyncOutcome;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub date: String,
    pub has_availability: bool,
    pub time_slots: Vec<CandidateSlot>,
    pub source: AvailabilitySource,
    pub debug: AvailabilityDebug,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDay {
    pub date: String,
    pub booking_count: usize,
    pub is_available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAvailabilityResponse {
    pub days: Vec<MonthDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_available: Option<String>,
}

/// Public projection of a booked slot; client details stay server-side.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlotView {
    pub time: String,
    pub end_time: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
}

impl From<&Booking> for BookedSlotView {
    fn from(b: &Booking) -> Self {
        Self {
            time: b.time.clone(),
            end_time: b.end_time.clone(),
            status: b.status.clone(),
            artist_id: b.artist_id.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSlotView {
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    pub reason: String,
}

impl From<&BlockedTimeSlot> for BlockedSlotView {
    fn from(b: &BlockedTimeSlot) -> Self {
        Self {
            time: b.time.clone(),
            artist_id: b.artist_id.clone(),
            reason: b.reason.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    pub date: String,
    pub booked_slots: Vec<BookedSlotView>,
    pub blocked_slots: Vec<BlockedSlotView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GhlSyncStatus {
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
}

impl GhlSyncStatus {
    /// Reports a sync attempt's outcome; `booking` fills in ids for records
    /// that were already synced before this attempt.
    pub fn from_outcome(outcome: &SyncOutcome, booking: &Booking) -> Self {
        match outcome {
            SyncOutcome::Synced { contact_id, appointment_id } => Self {
                synced: true,
                contact_id: Some(contact_id.clone()),
                appointment_id: Some(appointment_id.clone()),
                error: None,
                skipped_reason: None,
            },
            SyncOutcome::AlreadySynced => Self {
                synced: true,
                contact_id: booking.ghl_contact_id.clone(),
                appointment_id: booking.ghl_appointment_id.clone(),
                error: None,
                skipped_reason: None,
            },
            SyncOutcome::SkippedPast => Self {
                synced: false,
                contact_id: None,
                appointment_id: None,
                error: None,
                skipped_reason: Some("past_date".to_string()),
            },
            SyncOutcome::Failed { error } => Self {
                synced: false,
                contact_id: None,
                appointment_id: None,
                error: Some(error.clone()),
                skipped_reason: None,
            },
        }
    }

    pub fn not_attempted(reason: &str) -> Self {
        Self {
            synced: false,
            contact_id: None,
            appointment_id: None,
            error: Some(reason.to_string()),
            skipped_reason: None,
        }
    }
}

/// Booking plus the result of its most recent sync attempt. Shared by the
/// create endpoint and the single-record admin retry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSyncResponse {
    pub booking: Booking,
    pub ghl_sync: GhlSyncStatus,
}

/// Admin view of a booking that never made it into GHL.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSyncView {
    pub id: String,
    pub client_name: String,
    pub service_name: String,
    pub date: String,
    pub time: String,
    pub sync_state: String,
    pub retry_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_retry: Option<String>,
}

impl From<&Booking> for FailedSyncView {
    fn from(b: &Booking) -> Self {
        let sync_state = match b.sync_state() {
            SyncState::Unsynced => "unsynced",
            SyncState::Synced => "synced",
            SyncState::Failed { .. } => "failed",
            SyncState::Skipped { .. } => "skipped",
        };

        Self {
            id: b.id.clone(),
            client_name: b.client_name.clone(),
            service_name: b.service_name.clone(),
            date: b.date.to_string(),
            time: b.time.clone(),
            sync_state: sync_state.to_string(),
            retry_count: b.ghl_retry_count,
            error: b.ghl_sync_error.clone(),
            skipped_reason: b.ghl_skipped_reason.clone(),
            last_retry: b.ghl_last_retry.map(|dt| dt.to_rfc3339()),
        }
    }
}
