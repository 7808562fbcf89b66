use std::sync::Arc;
use crate::domain::ports::{
    AvailabilityRepository, BlockedSlotRepository, BookingRepository, CrmApi,
    LegacyAppointmentRepository, SettingsRepository,
};
use crate::domain::services::selector::AvailabilityService;
use crate::domain::services::settings_cache::SettingsCache;
use crate::domain::services::sync::SyncService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub blocked_slot_repo: Arc<dyn BlockedSlotRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub legacy_repo: Arc<dyn LegacyAppointmentRepository>,
    pub crm: Arc<dyn CrmApi>,
    pub settings_cache: Arc<SettingsCache>,
    pub availability_service: Arc<AvailabilityService>,
    pub sync_service: Arc<SyncService>,
}
