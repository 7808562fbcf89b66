pub mod crm;
pub mod factory;
pub mod repositories;
