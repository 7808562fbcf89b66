use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::models::booking::Booking;
use crate::domain::models::crm::{CreateAppointmentRequest, CreateContactRequest};
use crate::domain::models::legacy::LegacyAppointment;
use crate::domain::models::settings::GhlCredentials;
use crate::domain::ports::{BookingRepository, CrmApi, LegacyAppointmentRepository};
use crate::domain::services::settings_cache::SettingsCache;
use crate::domain::services::slots::parse_time_to_minutes;
use crate::error::{AppError, CrmError};

/// Sweep-only ceiling; manual retries are admin-initiated and ignore it.
pub const MAX_SWEEP_RETRIES: i32 = 5;

pub const PAST_DATE_SKIP: &str = "past_date";

/// Who asked for the sync. Decides the tag stamped on contacts created
/// during this attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Booking,
    Sweep,
    ManualSingle,
    ManualBulk,
}

impl SyncTrigger {
    pub fn tag(&self) -> &'static str {
        match self {
            SyncTrigger::Booking | SyncTrigger::Sweep => "auto-sync",
            SyncTrigger::ManualSingle => "manual-retry",
            SyncTrigger::ManualBulk => "retry-sync",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { contact_id: String, appointment_id: String },
    AlreadySynced,
    SkippedPast,
    Failed { error: String },
}

#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub scanned: usize,
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub skipped_past: usize,
}

/// Record-shaped view shared by bookings and legacy appointments.
struct SyncRecord<'a> {
    id: &'a str,
    client_name: &'a str,
    client_email: &'a str,
    client_phone: &'a str,
    service_name: &'a str,
    date: NaiveDate,
    time: &'a str,
    end_time: &'a str,
    status: &'a str,
    price: Option<f64>,
    notes: Option<&'a str>,
    contact_id: Option<&'a str>,
}

enum MirrorOutcome {
    Created { contact_id: String, appointment_id: String },
    PastDate { contact_id: Option<String> },
    Failed { contact_id: Option<String>, error: String },
}

/// One-way mirror of local records into GHL: contact lookup-or-create, a
/// past-date guard, then appointment creation. Every outcome is persisted on
/// the record; nothing here is fatal to the booking flow.
pub struct SyncService {
    booking_repo: Arc<dyn BookingRepository>,
    legacy_repo: Arc<dyn LegacyAppointmentRepository>,
    crm: Arc<dyn CrmApi>,
    settings: Arc<SettingsCache>,
    config: Config,
    tz: Tz,
}

impl SyncService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        legacy_repo: Arc<dyn LegacyAppointmentRepository>,
        crm: Arc<dyn CrmApi>,
        settings: Arc<SettingsCache>,
        config: Config,
    ) -> Self {
        let tz: Tz = config.studio_timezone.parse().unwrap_or(chrono_tz::UTC);
        Self { booking_repo, legacy_repo, crm, settings, config, tz }
    }

    pub fn studio_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Resolved credentials, or a 503-mapped error when GHL is unconfigured.
    /// Sweep and bulk entry points fail fast here instead of stamping a
    /// failure onto every record.
    pub async fn require_credentials(&self) -> Result<GhlCredentials, AppError> {
        let settings = self.settings.get().await;
        settings.resolve_credentials(&self.config).ok_or_else(|| {
            AppError::CrmNotConfigured(
                "GHL API key and location id are required for sync".to_string(),
            )
        })
    }

    pub async fn sync_booking(
        &self,
        booking: &Booking,
        trigger: SyncTrigger,
    ) -> Result<SyncOutcome, AppError> {
        if booking.ghl_appointment_id.is_some() {
            debug!("Booking {} already synced, skipping", booking.id);
            return Ok(SyncOutcome::AlreadySynced);
        }

        let record = SyncRecord {
            id: &booking.id,
            client_name: &booking.client_name,
            client_email: &booking.client_email,
            client_phone: &booking.client_phone,
            service_name: &booking.service_name,
            date: booking.date,
            time: &booking.time,
            end_time: &booking.end_time,
            status: &booking.status,
            price: Some(booking.price),
            notes: booking.notes.as_deref(),
            contact_id: booking.ghl_contact_id.as_deref(),
        };

        match self.mirror(&record, trigger).await {
            MirrorOutcome::Created { contact_id, appointment_id } => {
                self.booking_repo
                    .mark_synced(&booking.id, &contact_id, &appointment_id)
                    .await?;
                info!("Booking {} synced to GHL appointment {}", booking.id, appointment_id);
                Ok(SyncOutcome::Synced { contact_id, appointment_id })
            }
            MirrorOutcome::PastDate { contact_id } => {
                self.booking_repo
                    .mark_sync_skipped(&booking.id, contact_id.as_deref(), PAST_DATE_SKIP)
                    .await?;
                info!("Booking {} is past-dated, marked as skipped", booking.id);
                Ok(SyncOutcome::SkippedPast)
            }
            MirrorOutcome::Failed { contact_id, error } => {
                self.booking_repo
                    .mark_sync_failed(&booking.id, contact_id.as_deref(), &error)
                    .await?;
                warn!("Booking {} sync failed: {}", booking.id, error);
                Ok(SyncOutcome::Failed { error })
            }
        }
    }

    pub async fn sync_legacy(
        &self,
        appt: &LegacyAppointment,
        trigger: SyncTrigger,
    ) -> Result<SyncOutcome, AppError> {
        if appt.ghl_appointment_id.is_some() {
            return Ok(SyncOutcome::AlreadySynced);
        }

        let record = SyncRecord {
            id: &appt.id,
            client_name: &appt.client_name,
            client_email: &appt.client_email,
            client_phone: appt.client_phone.as_deref().unwrap_or(""),
            service_name: &appt.service_name,
            date: appt.date,
            time: &appt.time,
            end_time: &appt.end_time,
            status: "confirmed",
            price: None,
            notes: None,
            contact_id: appt.ghl_contact_id.as_deref(),
        };

        match self.mirror(&record, trigger).await {
            MirrorOutcome::Created { contact_id, appointment_id } => {
                self.legacy_repo
                    .mark_synced(&appt.id, &contact_id, &appointment_id)
                    .await?;
                info!("Legacy appointment {} synced to GHL appointment {}", appt.id, appointment_id);
                Ok(SyncOutcome::Synced { contact_id, appointment_id })
            }
            MirrorOutcome::PastDate { contact_id } => {
                self.legacy_repo
                    .mark_sync_skipped(&appt.id, contact_id.as_deref(), PAST_DATE_SKIP)
                    .await?;
                Ok(SyncOutcome::SkippedPast)
            }
            MirrorOutcome::Failed { contact_id, error } => {
                self.legacy_repo
                    .mark_sync_failed(&appt.id, contact_id.as_deref(), &error)
                    .await?;
                warn!("Legacy appointment {} sync failed: {}", appt.id, error);
                Ok(SyncOutcome::Failed { error })
            }
        }
    }

    /// Scans bookings lacking an appointment id, then the legacy collection,
    /// serially with a fixed inter-record delay. Over-ceiling and terminally
    /// skipped records are counted without touching the CRM.
    pub async fn run_sweep(&self) -> Result<SweepReport, AppError> {
        self.require_credentials().await?;

        let mut report = SweepReport::default();

        let bookings = self.booking_repo.list_unsynced().await?;
        info!("Sync sweep: {} unsynced bookings", bookings.len());
        for booking in &bookings {
            report.scanned += 1;

            if booking.ghl_skipped_reason.is_some() {
                report.skipped_past += 1;
                continue;
            }
            if booking.ghl_retry_count >= MAX_SWEEP_RETRIES {
                report.skipped += 1;
                continue;
            }

            match self.sync_booking(booking, SyncTrigger::Sweep).await? {
                SyncOutcome::Synced { .. } => report.synced += 1,
                SyncOutcome::AlreadySynced => report.skipped += 1,
                SyncOutcome::SkippedPast => report.skipped_past += 1,
                SyncOutcome::Failed { .. } => report.failed += 1,
            }
            self.pace().await;
        }

        let legacy = self.legacy_repo.list_unsynced().await?;
        info!("Sync sweep: {} unsynced legacy appointments", legacy.len());
        for appt in &legacy {
            report.scanned += 1;

            if appt.ghl_skipped_reason.is_some() {
                report.skipped_past += 1;
                continue;
            }
            if appt.ghl_retry_count >= MAX_SWEEP_RETRIES {
                report.skipped += 1;
                continue;
            }

            match self.sync_legacy(appt, SyncTrigger::Sweep).await? {
                SyncOutcome::Synced { .. } => report.synced += 1,
                SyncOutcome::AlreadySynced => report.skipped += 1,
                SyncOutcome::SkippedPast => report.skipped_past += 1,
                SyncOutcome::Failed { .. } => report.failed += 1,
            }
            self.pace().await;
        }

        info!(
            "Sync sweep done: {} synced, {} failed, {} skipped, {} past",
            report.synced, report.failed, report.skipped, report.skipped_past
        );
        Ok(report)
    }

    /// Re-runs sync for every booking currently in the failed state,
    /// regardless of retry count.
    pub async fn retry_failed(&self) -> Result<SweepReport, AppError> {
        self.require_credentials().await?;

        let mut report = SweepReport::default();
        let bookings = self.booking_repo.list_unsynced().await?;

        for booking in &bookings {
            if booking.ghl_sync_error.is_none() || booking.ghl_skipped_reason.is_some() {
                continue;
            }
            report.scanned += 1;

            match self.sync_booking(booking, SyncTrigger::ManualBulk).await? {
                SyncOutcome::Synced { .. } => report.synced += 1,
                SyncOutcome::AlreadySynced => report.skipped += 1,
                SyncOutcome::SkippedPast => report.skipped_past += 1,
                SyncOutcome::Failed { .. } => report.failed += 1,
            }
            self.pace().await;
        }

        Ok(report)
    }

    async fn pace(&self) {
        if self.config.sync_record_delay_ms > 0 {
            sleep(Duration::from_millis(self.config.sync_record_delay_ms)).await;
        }
    }

    async fn mirror(&self, record: &SyncRecord<'_>, trigger: SyncTrigger) -> MirrorOutcome {
        let settings = self.settings.get().await;
        let creds = match settings.resolve_credentials(&self.config) {
            Some(creds) => creds,
            None => {
                return MirrorOutcome::Failed {
                    contact_id: None,
                    error: CrmError::ConfigMissing("API key or location id".to_string())
                        .to_string(),
                };
            }
        };

        let contact_id = match record.contact_id {
            Some(id) => id.to_string(),
            None => match self.resolve_contact(&creds, record, trigger).await {
                Ok(id) => id,
                Err(e) => {
                    return MirrorOutcome::Failed { contact_id: None, error: e.to_string() };
                }
            },
        };

        let start_local = match self.local_start(record) {
            Some(dt) => dt,
            None => {
                return MirrorOutcome::Failed {
                    contact_id: Some(contact_id),
                    error: format!("Invalid stored time '{}'", record.time),
                };
            }
        };

        // External CRMs reject past-dated calendar events; terminal skip,
        // not a retryable failure.
        if start_local < self.studio_now() {
            return MirrorOutcome::PastDate { contact_id: Some(contact_id) };
        }

        let calendar_id = match &creds.calendar_id {
            Some(id) => id.clone(),
            None => {
                return MirrorOutcome::Failed {
                    contact_id: Some(contact_id),
                    error: CrmError::ConfigMissing("calendar id".to_string()).to_string(),
                };
            }
        };

        let end_local = self.local_end(record, start_local);

        let mut notes = match record.price {
            Some(price) => format!("Service: {} | Price: €{}", record.service_name, price),
            None => format!("Service: {}", record.service_name),
        };
        if let Some(extra) = record.notes
            && !extra.is_empty()
        {
            notes.push_str("\nNotes: ");
            notes.push_str(extra);
        }

        let request = CreateAppointmentRequest {
            calendar_id,
            location_id: creds.location_id.clone(),
            contact_id: contact_id.clone(),
            start_time: start_local.to_rfc3339(),
            end_time: end_local.to_rfc3339(),
            title: format!("{} - {}", record.service_name, record.client_name),
            notes: Some(notes),
            appointment_status: if record.status == "confirmed" {
                "confirmed".to_string()
            } else {
                "new".to_string()
            },
            ignore_date_range: true,
            to_notify: false,
        };

        match self.crm.create_appointment(&creds, &request).await {
            Ok(appointment) => MirrorOutcome::Created {
                contact_id,
                appointment_id: appointment.id,
            },
            Err(e) => MirrorOutcome::Failed {
                contact_id: Some(contact_id),
                error: e.to_string(),
            },
        }
    }

    async fn resolve_contact(
        &self,
        creds: &GhlCredentials,
        record: &SyncRecord<'_>,
        trigger: SyncTrigger,
    ) -> Result<String, CrmError> {
        let matches = self
            .crm
            .search_contact_by_email(creds, record.client_email)
            .await?;

        if let Some(existing) = matches.first() {
            if matches.len() > 1 {
                debug!(
                    "Multiple GHL contacts for {}, using first ({})",
                    record.client_email, existing.id
                );
            }
            return Ok(existing.id.clone());
        }

        let (first_name, last_name) = split_name(record.client_name);
        let created = self
            .crm
            .create_contact(
                creds,
                &CreateContactRequest {
                    first_name,
                    last_name,
                    email: record.client_email.to_string(),
                    phone: record.client_phone.to_string(),
                    location_id: creds.location_id.clone(),
                    tags: vec!["website-booking".to_string(), trigger.tag().to_string()],
                    source: "website".to_string(),
                },
            )
            .await?;

        Ok(created.id)
    }

    fn local_start(&self, record: &SyncRecord<'_>) -> Option<DateTime<Tz>> {
        let minutes = parse_time_to_minutes(record.time)?;
        if minutes >= 1440 {
            return None;
        }
        let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;
        self.to_local(record.date.and_time(time))
    }

    /// The booking's own end time; a missing or backwards end falls back to
    /// start plus the configured default duration.
    fn local_end(&self, record: &SyncRecord<'_>, start: DateTime<Tz>) -> DateTime<Tz> {
        let fallback = start + chrono::Duration::hours(self.config.default_appointment_hours);

        let Some(end_min) = parse_time_to_minutes(record.end_time) else {
            return fallback;
        };

        let end_naive = if end_min >= 1440 {
            match record.date.succ_opt() {
                Some(next) => next.and_hms_opt(0, 0, 0).unwrap(),
                None => return fallback,
            }
        } else {
            record
                .date
                .and_hms_opt(end_min / 60, end_min % 60, 0)
                .unwrap()
        };

        match self.to_local(end_naive) {
            Some(end) if end > start => end,
            _ => fallback,
        }
    }

    fn to_local(&self, naive: chrono::NaiveDateTime) -> Option<DateTime<Tz>> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| self.tz.from_local_datetime(&naive).latest())
    }
}

fn split_name(full: &str) -> (String, String) {
    match full.trim().split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full.trim().to_string(), String::new()),
    }
}
