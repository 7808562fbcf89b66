use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub price: f64,
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: String,
    pub notes: Option<String>,
    pub ghl_contact_id: Option<String>,
    pub ghl_appointment_id: Option<String>,
    pub ghl_sync_error: Option<String>,
    pub ghl_retry_count: i32,
    pub ghl_last_retry: Option<DateTime<Utc>>,
    pub ghl_skipped_reason: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub price: f64,
    pub deposit_amount: f64,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            client_name: params.client_name,
            client_email: params.client_email,
            client_phone: params.client_phone,
            service_id: params.service_id,
            service_name: params.service_name,
            date: params.date,
            time: params.time,
            end_time: params.end_time,
            artist_id: params.artist_id,
            artist_name: params.artist_name,
            price: params.price,
            deposit_amount: params.deposit_amount,
            deposit_paid: false,
            status: "pending".to_string(),
            notes: params.notes,
            ghl_contact_id: None,
            ghl_appointment_id: None,
            ghl_sync_error: None,
            ghl_retry_count: 0,
            ghl_last_retry: None,
            ghl_skipped_reason: None,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "pending" || self.status == "confirmed"
    }

    /// Sync lifecycle derived from the ghl_* columns. An appointment id wins
    /// over any stale error or skip marker left by earlier attempts.
    pub fn sync_state(&self) -> SyncState {
        if self.ghl_appointment_id.is_some() {
            SyncState::Synced
        } else if let Some(reason) = &self.ghl_skipped_reason {
            SyncState::Skipped { reason: reason.clone() }
        } else if self.ghl_sync_error.is_some() {
            SyncState::Failed { retries: self.ghl_retry_count }
        } else {
            SyncState::Unsynced
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Unsynced,
    Synced,
    Failed { retries: i32 },
    Skipped { reason: String },
}
