pub mod sqlite_booking_repo;
pub mod sqlite_availability_repo;
pub mod sqlite_blocked_slot_repo;
pub mod sqlite_settings_repo;
pub mod sqlite_legacy_repo;

pub mod postgres_booking_repo;
pub mod postgres_availability_repo;
pub mod postgres_blocked_slot_repo;
pub mod postgres_settings_repo;
pub mod postgres_legacy_repo;
