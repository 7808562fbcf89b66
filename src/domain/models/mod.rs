pub mod availability;
pub mod booking;
pub mod crm;
pub mod legacy;
pub mod settings;
pub mod slot;
