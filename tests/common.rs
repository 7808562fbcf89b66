// Shared harness for the integration tests. Not every test binary uses
// every helper, hence the file-wide allowance.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use studio_booking::api::router::create_router;
use studio_booking::background::start_background_worker;
use studio_booking::config::Config;
use studio_booking::domain::models::availability::{ArtistAvailability, TimeRange, DAY_NAMES};
use studio_booking::domain::models::booking::{Booking, NewBookingParams};
use studio_booking::domain::models::crm::{
    CreateAppointmentRequest, CreateContactRequest, GhlAppointment, GhlCalendar, GhlContact,
    GhlEvent, GhlHourBlock, GhlOpenHoursBlock, GhlWeekday,
};
use studio_booking::domain::models::settings::{CrmSettings, GhlCredentials};
use studio_booking::domain::ports::CrmApi;
use studio_booking::error::CrmError;
use studio_booking::infra::factory::assemble_state;
use studio_booking::infra::repositories::{
    sqlite_availability_repo::SqliteAvailabilityRepo,
    sqlite_blocked_slot_repo::SqliteBlockedSlotRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_legacy_repo::SqliteLegacyRepo, sqlite_settings_repo::SqliteSettingsRepo,
};
use studio_booking::state::AppState;

/// In-memory stand-in for the GoHighLevel API. Records every write so tests
/// can assert on what would have been sent upstream.
#[derive(Default)]
pub struct MockCrm {
    pub calendars: Mutex<Vec<GhlCalendar>>,
    pub events: Mutex<Vec<GhlEvent>>,
    pub contacts: Mutex<Vec<GhlContact>>,
    pub created_contacts: Mutex<Vec<CreateContactRequest>>,
    pub created_appointments: Mutex<Vec<CreateAppointmentRequest>>,
    pub fail_availability: AtomicBool,
    pub fail_appointments: AtomicBool,
    next_id: AtomicUsize,
}

impl MockCrm {
    pub fn add_calendar(&self, calendar: GhlCalendar) {
        self.calendars.lock().unwrap().push(calendar);
    }

    pub fn add_event(&self, event: GhlEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn contact_count(&self) -> usize {
        self.created_contacts.lock().unwrap().len()
    }

    pub fn appointment_count(&self) -> usize {
        self.created_appointments.lock().unwrap().len()
    }

    pub fn last_appointment(&self) -> Option<CreateAppointmentRequest> {
        self.created_appointments.lock().unwrap().last().cloned()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl CrmApi for MockCrm {
    async fn list_calendars(&self, _creds: &GhlCredentials) -> Result<Vec<GhlCalendar>, CrmError> {
        if self.fail_availability.load(Ordering::SeqCst) {
            return Err(CrmError::Api {
                status: 503,
                message: "calendar service unavailable".to_string(),
            });
        }
        Ok(self.calendars.lock().unwrap().clone())
    }

    async fn get_calendar(
        &self,
        _creds: &GhlCredentials,
        calendar_id: &str,
    ) -> Result<GhlCalendar, CrmError> {
        if self.fail_availability.load(Ordering::SeqCst) {
            return Err(CrmError::Api {
                status: 503,
                message: "calendar service unavailable".to_string(),
            });
        }
        self.calendars
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == calendar_id)
            .cloned()
            .ok_or_else(|| CrmError::NotFound(format!("calendar {calendar_id}")))
    }

    async fn list_events(
        &self,
        _creds: &GhlCredentials,
        _calendar_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<GhlEvent>, CrmError> {
        if self.fail_availability.load(Ordering::SeqCst) {
            return Err(CrmError::Api {
                status: 503,
                message: "calendar service unavailable".to_string(),
            });
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn search_contact_by_email(
        &self,
        _creds: &GhlCredentials,
        email: &str,
    ) -> Result<Vec<GhlContact>, CrmError> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    async fn create_contact(
        &self,
        _creds: &GhlCredentials,
        req: &CreateContactRequest,
    ) -> Result<GhlContact, CrmError> {
        self.created_contacts.lock().unwrap().push(req.clone());
        let contact = GhlContact {
            id: self.next_id("contact"),
            email: Some(req.email.clone()),
            first_name: Some(req.first_name.clone()),
            last_name: Some(req.last_name.clone()),
            phone: Some(req.phone.clone()),
        };
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact)
    }

    async fn create_appointment(
        &self,
        _creds: &GhlCredentials,
        req: &CreateAppointmentRequest,
    ) -> Result<GhlAppointment, CrmError> {
        if self.fail_appointments.load(Ordering::SeqCst) {
            return Err(CrmError::Api {
                status: 500,
                message: "appointment rejected".to_string(),
            });
        }
        self.created_appointments.lock().unwrap().push(req.clone());
        Ok(GhlAppointment {
            id: self.next_id("appt"),
            appointment_status: Some("new".to_string()),
        })
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub crm: Arc<MockCrm>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app on a throwaway SQLite file, with the CRM replaced by
    /// [`MockCrm`]. `adjust` tweaks the config before the state is wired.
    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to run migrations on test database");

        let mut config = Config {
            database_url: db_url,
            port: 0,
            ghl_base_url: "http://localhost".to_string(),
            ghl_api_key: Some("test-key".to_string()),
            ghl_location_id: Some("loc-1".to_string()),
            ghl_calendar_id: Some("cal-1".to_string()),
            studio_timezone: "UTC".to_string(),
            cron_secret: None,
            sync_interval_secs: 0,
            sync_record_delay_ms: 0,
            default_appointment_hours: 3,
        };
        adjust(&mut config);

        let crm = Arc::new(MockCrm::default());

        let state = Arc::new(assemble_state(
            &config,
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteAvailabilityRepo::new(pool.clone())),
            Arc::new(SqliteBlockedSlotRepo::new(pool.clone())),
            Arc::new(SqliteSettingsRepo::new(pool.clone())),
            Arc::new(SqliteLegacyRepo::new(pool.clone())),
            crm.clone(),
        ));

        tokio::spawn(start_background_worker(state.clone()));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            crm,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

/// Same enabled window on all seven weekdays, so tests stay independent of
/// which weekday a relative date lands on.
pub async fn seed_week_schedule(app: &TestApp, artist_id: &str, start: &str, end: &str) {
    for day in DAY_NAMES {
        let record = ArtistAvailability::new(
            artist_id.to_string(),
            day.to_string(),
            true,
            vec![TimeRange {
                id: Uuid::new_v4().to_string(),
                start_time: start.to_string(),
                end_time: end.to_string(),
                is_active: true,
            }],
            vec!["powder-brows".to_string()],
        );
        app.state
            .availability_repo
            .upsert(&record)
            .await
            .expect("Failed to seed schedule");
    }
}

pub async fn enable_ghl_mode(app: &TestApp) {
    let mut settings = CrmSettings::disabled();
    settings.use_ghl_calendar = true;
    app.state
        .settings_repo
        .upsert(&settings)
        .await
        .expect("Failed to store settings");
    app.state.settings_cache.invalidate().await;
}

/// Inserts a booking directly through the repository, bypassing the API and
/// the inline sync. Each seed gets a unique client email.
pub async fn insert_booking(app: &TestApp, date: &str, time: &str, end_time: &str) -> Booking {
    let booking = Booking::new(NewBookingParams {
        client_name: "Seeded Client".to_string(),
        client_email: format!("{}@example.com", Uuid::new_v4()),
        client_phone: "+31600000000".to_string(),
        service_id: "powder-brows".to_string(),
        service_name: "Powder Brows".to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("bad seed date"),
        time: time.to_string(),
        end_time: end_time.to_string(),
        artist_id: None,
        artist_name: None,
        price: 249.0,
        deposit_amount: 50.0,
        notes: None,
    });
    app.state
        .booking_repo
        .create(&booking, &[])
        .await
        .expect("Failed to seed booking")
}

pub fn future_date(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

pub fn past_date(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days)).to_string()
}

/// Calendar open every day of the week between the given whole hours.
pub fn week_calendar(id: &str, open_hour: u32, close_hour: u32) -> GhlCalendar {
    GhlCalendar {
        id: id.to_string(),
        name: Some("Studio Calendar".to_string()),
        open_hours: vec![GhlOpenHoursBlock {
            days_of_the_week: (0u8..7).map(GhlWeekday::Index).collect(),
            hours: vec![GhlHourBlock {
                open_hour,
                open_minute: 0,
                close_hour,
                close_minute: 0,
            }],
        }],
    }
}

/// CRM event on `date` between two "HH:MM" clock times, in UTC to match the
/// test studio timezone.
pub fn ghl_event(date: &str, start: &str, end: &str) -> GhlEvent {
    GhlEvent {
        id: Uuid::new_v4().to_string(),
        title: Some("Existing appointment".to_string()),
        start_time: format!("{date}T{start}:00Z"),
        end_time: format!("{date}T{end}:00Z"),
        appointment_status: Some("confirmed".to_string()),
    }
}
