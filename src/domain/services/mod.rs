pub mod selector;
pub mod settings_cache;
pub mod slots;
pub mod sync;
