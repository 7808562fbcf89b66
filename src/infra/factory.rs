use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    AvailabilityRepository, BlockedSlotRepository, BookingRepository, CrmApi,
    LegacyAppointmentRepository, SettingsRepository,
};
use crate::domain::services::selector::AvailabilityService;
use crate::domain::services::settings_cache::SettingsCache;
use crate::domain::services::sync::SyncService;
use crate::infra::crm::ghl_client::GhlClient;
use crate::infra::repositories::{
    postgres_availability_repo::PostgresAvailabilityRepo,
    postgres_blocked_slot_repo::PostgresBlockedSlotRepo,
    postgres_booking_repo::PostgresBookingRepo,
    postgres_legacy_repo::PostgresLegacyRepo,
    postgres_settings_repo::PostgresSettingsRepo,
    sqlite_availability_repo::SqliteAvailabilityRepo,
    sqlite_blocked_slot_repo::SqliteBlockedSlotRepo,
    sqlite_booking_repo::SqliteBookingRepo,
    sqlite_legacy_repo::SqliteLegacyRepo,
    sqlite_settings_repo::SqliteSettingsRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let crm: Arc<dyn CrmApi> = Arc::new(GhlClient::new(config.ghl_base_url.clone()));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let booking_repo: Arc<dyn BookingRepository> =
            Arc::new(PostgresBookingRepo::new(pool.clone()));
        let availability_repo: Arc<dyn AvailabilityRepository> =
            Arc::new(PostgresAvailabilityRepo::new(pool.clone()));
        let blocked_slot_repo: Arc<dyn BlockedSlotRepository> =
            Arc::new(PostgresBlockedSlotRepo::new(pool.clone()));
        let settings_repo: Arc<dyn SettingsRepository> =
            Arc::new(PostgresSettingsRepo::new(pool.clone()));
        let legacy_repo: Arc<dyn LegacyAppointmentRepository> =
            Arc::new(PostgresLegacyRepo::new(pool.clone()));

        assemble_state(
            config,
            booking_repo,
            availability_repo,
            blocked_slot_repo,
            settings_repo,
            legacy_repo,
            crm,
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let booking_repo: Arc<dyn BookingRepository> =
            Arc::new(SqliteBookingRepo::new(pool.clone()));
        let availability_repo: Arc<dyn AvailabilityRepository> =
            Arc::new(SqliteAvailabilityRepo::new(pool.clone()));
        let blocked_slot_repo: Arc<dyn BlockedSlotRepository> =
            Arc::new(SqliteBlockedSlotRepo::new(pool.clone()));
        let settings_repo: Arc<dyn SettingsRepository> =
            Arc::new(SqliteSettingsRepo::new(pool.clone()));
        let legacy_repo: Arc<dyn LegacyAppointmentRepository> =
            Arc::new(SqliteLegacyRepo::new(pool.clone()));

        assemble_state(
            config,
            booking_repo,
            availability_repo,
            blocked_slot_repo,
            settings_repo,
            legacy_repo,
            crm,
        )
    }
}

/// Wires services on top of the repository handles. Shared by both database
/// backends and by the test harness, which swaps in its own CRM client.
pub fn assemble_state(
    config: &Config,
    booking_repo: Arc<dyn BookingRepository>,
    availability_repo: Arc<dyn AvailabilityRepository>,
    blocked_slot_repo: Arc<dyn BlockedSlotRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
    legacy_repo: Arc<dyn LegacyAppointmentRepository>,
    crm: Arc<dyn CrmApi>,
) -> AppState {
    let settings_cache = Arc::new(SettingsCache::new(settings_repo.clone()));

    let availability_service = Arc::new(AvailabilityService::new(
        booking_repo.clone(),
        availability_repo.clone(),
        blocked_slot_repo.clone(),
        crm.clone(),
        settings_cache.clone(),
        config.clone(),
    ));

    let sync_service = Arc::new(SyncService::new(
        booking_repo.clone(),
        legacy_repo.clone(),
        crm.clone(),
        settings_cache.clone(),
        config.clone(),
    ));

    AppState {
        config: config.clone(),
        booking_repo,
        availability_repo,
        blocked_slot_repo,
        settings_repo,
        legacy_repo,
        crm,
        settings_cache,
        availability_service,
        sync_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
