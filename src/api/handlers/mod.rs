pub mod availability;
pub mod booking;
pub mod health;
pub mod schedule;
pub mod settings;
pub mod sync;
