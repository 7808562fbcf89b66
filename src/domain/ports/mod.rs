use crate::domain::models::{
    availability::{ArtistAvailability, BlockedTimeSlot},
    booking::Booking,
    crm::{CreateAppointmentRequest, CreateContactRequest, GhlAppointment, GhlCalendar, GhlContact, GhlEvent},
    legacy::LegacyAppointment,
    settings::{CrmSettings, GhlCredentials},
};
use crate::error::{AppError, CrmError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking and its blocked-hour rows in one transaction.
    /// A taken slot surfaces as a unique-constraint database error.
    async fn create(&self, booking: &Booking, blocked: &[BlockedTimeSlot]) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_active_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError>;
    /// All bookings without a GHL appointment id, oldest first.
    async fn list_unsynced(&self) -> Result<Vec<Booking>, AppError>;
    async fn update_status(&self, id: &str, status: &str) -> Result<Booking, AppError>;
    async fn mark_synced(&self, id: &str, contact_id: &str, appointment_id: &str) -> Result<(), AppError>;
    async fn mark_sync_failed(&self, id: &str, contact_id: Option<&str>, error: &str) -> Result<(), AppError>;
    async fn mark_sync_skipped(&self, id: &str, contact_id: Option<&str>, reason: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Enabled record for the weekday, if any; no artist filter when
    /// `artist_id` is None (the lowest artist id wins, so the global view
    /// is stable). Absence means zero availability for that day, not an
    /// error.
    async fn find_enabled_for_weekday(&self, artist_id: Option<&str>, day_of_week: &str) -> Result<Option<ArtistAvailability>, AppError>;
    async fn list_for_artist(&self, artist_id: &str) -> Result<Vec<ArtistAvailability>, AppError>;
    async fn upsert(&self, record: &ArtistAvailability) -> Result<ArtistAvailability, AppError>;
    /// Replaces the artist's whole weekly schedule in one transaction.
    async fn reset_for_artist(&self, artist_id: &str, schedule: &[ArtistAvailability]) -> Result<(), AppError>;
}

#[async_trait]
pub trait BlockedSlotRepository: Send + Sync {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<BlockedTimeSlot>, AppError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<CrmSettings>, AppError>;
    async fn upsert(&self, settings: &CrmSettings) -> Result<CrmSettings, AppError>;
}

#[async_trait]
pub trait LegacyAppointmentRepository: Send + Sync {
    async fn list_unsynced(&self) -> Result<Vec<LegacyAppointment>, AppError>;
    async fn mark_synced(&self, id: &str, contact_id: &str, appointment_id: &str) -> Result<(), AppError>;
    async fn mark_sync_failed(&self, id: &str, contact_id: Option<&str>, error: &str) -> Result<(), AppError>;
    async fn mark_sync_skipped(&self, id: &str, contact_id: Option<&str>, reason: &str) -> Result<(), AppError>;
}

/// GoHighLevel REST surface. Credentials are passed per call because they
/// resolve from admin settings at request time, not at construction.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn list_calendars(&self, creds: &GhlCredentials) -> Result<Vec<GhlCalendar>, CrmError>;
    async fn get_calendar(&self, creds: &GhlCredentials, calendar_id: &str) -> Result<GhlCalendar, CrmError>;
    async fn list_events(&self, creds: &GhlCredentials, calendar_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<GhlEvent>, CrmError>;
    async fn search_contact_by_email(&self, creds: &GhlCredentials, email: &str) -> Result<Vec<GhlContact>, CrmError>;
    async fn create_contact(&self, creds: &GhlCredentials, req: &CreateContactRequest) -> Result<GhlContact, CrmError>;
    async fn create_appointment(&self, creds: &GhlCredentials, req: &CreateAppointmentRequest) -> Result<GhlAppointment, CrmError>;
}
