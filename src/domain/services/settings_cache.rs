use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::models::settings::CrmSettings;
use crate::domain::ports::SettingsRepository;

/// Read-through cache over the singleton settings row. Handlers and services
/// read settings through this handle instead of hitting the store per call;
/// the settings PUT endpoint invalidates it explicitly.
pub struct SettingsCache {
    repo: Arc<dyn SettingsRepository>,
    cached: RwLock<Option<CrmSettings>>,
}

impl SettingsCache {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo, cached: RwLock::new(None) }
    }

    /// Current settings, loading once from the store. A missing row caches
    /// the disabled default; a read error returns the default without
    /// caching it, so the next call retries the store.
    pub async fn get(&self) -> CrmSettings {
        if let Some(settings) = self.cached.read().await.clone() {
            return settings;
        }

        let loaded = match self.repo.get().await {
            Ok(Some(settings)) => settings,
            Ok(None) => CrmSettings::disabled(),
            Err(e) => {
                warn!("Failed to load CRM settings, using disabled defaults: {}", e);
                return CrmSettings::disabled();
            }
        };

        *self.cached.write().await = Some(loaded.clone());
        loaded
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
