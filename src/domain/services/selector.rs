use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::models::availability::weekday_name;
use crate::domain::models::crm::GhlEvent;
use crate::domain::models::settings::CrmSettings;
use crate::domain::models::slot::{AvailabilitySource, CandidateSlot};
use crate::domain::ports::{
    AvailabilityRepository, BlockedSlotRepository, BookingRepository, CrmApi,
};
use crate::domain::services::settings_cache::SettingsCache;
use crate::domain::services::slots::{
    blocks_from_ghl_hours, blocks_from_time_ranges, filter_available, generate_slots,
    parse_time_to_minutes,
};
use crate::error::{AppError, CrmError};

#[derive(Debug, Clone)]
pub struct DayAvailabilityResult {
    pub has_availability: bool,
    pub time_slots: Vec<CandidateSlot>,
    pub source: AvailabilitySource,
    pub debug: AvailabilityDebug,
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDebug {
    pub weekday: String,
    pub use_ghl_calendar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghl_error: Option<String>,
    pub open_blocks: usize,
    pub candidate_count: usize,
}

/// Picks the availability source per request: the GHL calendar when the
/// admin flag is on and the calendar answers, the local store otherwise.
/// CRM trouble never surfaces to the caller; the local path always has the
/// final word.
pub struct AvailabilityService {
    booking_repo: Arc<dyn BookingRepository>,
    availability_repo: Arc<dyn AvailabilityRepository>,
    blocked_repo: Arc<dyn BlockedSlotRepository>,
    crm: Arc<dyn CrmApi>,
    settings: Arc<SettingsCache>,
    config: Config,
    tz: Tz,
}

impl AvailabilityService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        availability_repo: Arc<dyn AvailabilityRepository>,
        blocked_repo: Arc<dyn BlockedSlotRepository>,
        crm: Arc<dyn CrmApi>,
        settings: Arc<SettingsCache>,
        config: Config,
    ) -> Self {
        let tz: Tz = config.studio_timezone.parse().unwrap_or(chrono_tz::UTC);
        Self { booking_repo, availability_repo, blocked_repo, crm, settings, config, tz }
    }

    pub fn studio_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub async fn get_availability(
        &self,
        date: NaiveDate,
        duration_hours: i64,
        artist_id: Option<&str>,
    ) -> Result<DayAvailabilityResult, AppError> {
        let settings = self.settings.get().await;
        let mut dbg = AvailabilityDebug {
            weekday: weekday_name(date.weekday()).to_string(),
            use_ghl_calendar: settings.use_ghl_calendar,
            ..Default::default()
        };

        if settings.use_ghl_calendar {
            match self.ghl_slots(&settings, date, duration_hours, &mut dbg).await {
                Ok(mut slots) if !slots.is_empty() => {
                    self.apply_local_conflicts(&mut slots, date).await?;
                    dbg.candidate_count = slots.len();
                    let has_availability = slots.iter().any(|s| s.available);
                    return Ok(DayAvailabilityResult {
                        has_availability,
                        time_slots: slots,
                        source: AvailabilitySource::Ghl,
                        debug: dbg,
                    });
                }
                Ok(_) => {
                    debug!("GHL calendar produced no candidates for {}, using local store", date);
                }
                Err(e) => {
                    warn!("GHL availability lookup failed, falling back to local store: {}", e);
                    dbg.ghl_error = Some(e.to_string());
                }
            }
        }

        let mut slots = self.local_slots(date, duration_hours, artist_id, &mut dbg).await?;
        self.apply_local_conflicts(&mut slots, date).await?;
        dbg.candidate_count = slots.len();

        let has_availability = slots.iter().any(|s| s.available);
        Ok(DayAvailabilityResult {
            has_availability,
            time_slots: slots,
            source: AvailabilitySource::Website,
            debug: dbg,
        })
    }

    async fn local_slots(
        &self,
        date: NaiveDate,
        duration_hours: i64,
        artist_id: Option<&str>,
        dbg: &mut AvailabilityDebug,
    ) -> Result<Vec<CandidateSlot>, AppError> {
        let day = weekday_name(date.weekday());
        let Some(record) = self
            .availability_repo
            .find_enabled_for_weekday(artist_id, day)
            .await?
        else {
            return Ok(Vec::new());
        };

        let blocks = blocks_from_time_ranges(&record.time_ranges.0);
        dbg.open_blocks = blocks.len();
        let mut slots = generate_slots(&blocks, duration_hours);
        for slot in slots.iter_mut() {
            slot.artist_id = Some(record.artist_id.clone());
        }
        Ok(slots)
    }

    async fn ghl_slots(
        &self,
        settings: &CrmSettings,
        date: NaiveDate,
        duration_hours: i64,
        dbg: &mut AvailabilityDebug,
    ) -> Result<Vec<CandidateSlot>, CrmError> {
        let creds = settings
            .resolve_credentials(&self.config)
            .ok_or_else(|| CrmError::ConfigMissing("API key or location id".to_string()))?;

        let calendar = match &creds.calendar_id {
            Some(id) => self.crm.get_calendar(&creds, id).await?,
            None => {
                let calendars = self.crm.list_calendars(&creds).await?;
                let first = calendars
                    .into_iter()
                    .next()
                    .ok_or_else(|| CrmError::NotFound("no calendars configured".to_string()))?;
                self.crm.get_calendar(&creds, &first.id).await?
            }
        };
        dbg.calendar_id = Some(calendar.id.clone());
        dbg.calendar_name = calendar.name.clone();

        let weekday = date.weekday();
        let hours: Vec<_> = calendar
            .open_hours
            .iter()
            .filter(|block| block.days_of_the_week.iter().any(|d| d.matches(weekday)))
            .flat_map(|block| block.hours.iter().copied())
            .collect();

        let blocks = blocks_from_ghl_hours(&hours);
        dbg.open_blocks = blocks.len();

        let mut slots = generate_slots(&blocks, duration_hours);
        if slots.is_empty() {
            return Ok(slots);
        }
        for slot in slots.iter_mut() {
            slot.calendar_id = Some(calendar.id.clone());
            slot.calendar_name = calendar.name.clone();
        }

        let (day_start, day_end) = self.day_bounds_utc(date);
        let events = self
            .crm
            .list_events(&creds, &calendar.id, day_start, day_end)
            .await?;
        mark_event_conflicts(&mut slots, &events, date, self.tz);

        Ok(slots)
    }

    async fn apply_local_conflicts(
        &self,
        slots: &mut [CandidateSlot],
        date: NaiveDate,
    ) -> Result<(), AppError> {
        let bookings = self.booking_repo.list_active_by_date(date).await?;
        let blocked = self.blocked_repo.list_by_date(date).await?;

        let now = self.studio_now();
        let now_minutes = now.time().hour() * 60 + now.time().minute();
        filter_available(slots, &bookings, &blocked, date, now.date_naive(), now_minutes);
        Ok(())
    }

    fn day_bounds_utc(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start_naive = date.and_hms_opt(0, 0, 0).unwrap();
        let end_naive = date.and_hms_opt(23, 59, 59).unwrap();

        let start = self
            .tz
            .from_local_datetime(&start_naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&start_naive));
        let end = self
            .tz
            .from_local_datetime(&end_naive)
            .latest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&end_naive));

        (start, end)
    }
}

/// Flips `available` off for slots overlapping a non-cancelled CRM event on
/// the requested date. Events spanning midnight are clamped to the day.
fn mark_event_conflicts(slots: &mut [CandidateSlot], events: &[GhlEvent], date: NaiveDate, tz: Tz) {
    let busy: Vec<(u32, u32)> = events
        .iter()
        .filter(|e| e.appointment_status.as_deref() != Some("cancelled"))
        .filter_map(|e| event_minutes_on(e, date, tz))
        .collect();

    if busy.is_empty() {
        return;
    }

    for slot in slots.iter_mut() {
        let (Some(start), Some(end)) = (
            parse_time_to_minutes(&slot.time),
            parse_time_to_minutes(&slot.end_time),
        ) else {
            continue;
        };
        if busy.iter().any(|(b_start, b_end)| start < *b_end && end > *b_start) {
            slot.available = false;
        }
    }
}

fn event_minutes_on(event: &GhlEvent, date: NaiveDate, tz: Tz) -> Option<(u32, u32)> {
    let start = DateTime::parse_from_rfc3339(&event.start_time).ok()?.with_timezone(&tz);
    let end = DateTime::parse_from_rfc3339(&event.end_time).ok()?.with_timezone(&tz);

    let start_min = if start.date_naive() < date {
        0
    } else if start.date_naive() > date {
        return None;
    } else {
        start.time().hour() * 60 + start.time().minute()
    };

    let end_min = if end.date_naive() > date {
        1440
    } else if end.date_naive() < date {
        return None;
    } else {
        end.time().hour() * 60 + end.time().minute()
    };

    (start_min < end_min).then_some((start_min, end_min))
}
