use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::config::Config;

/// Singleton admin-settings row. `use_ghl_calendar` switches availability
/// reads to the CRM calendar; credentials stored here win over env values.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CrmSettings {
    pub id: String,
    pub use_ghl_calendar: bool,
    pub ghl_api_key: Option<String>,
    pub ghl_location_id: Option<String>,
    pub ghl_calendar_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CrmSettings {
    pub const SINGLETON_ID: &'static str = "default";

    /// Fail-safe default used when the settings row is missing or unreadable:
    /// CRM mode off, no stored credentials.
    pub fn disabled() -> Self {
        Self {
            id: Self::SINGLETON_ID.to_string(),
            use_ghl_calendar: false,
            ghl_api_key: None,
            ghl_location_id: None,
            ghl_calendar_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Resolve the credentials for a CRM call, settings-first with env
    /// fallback. Returns None when either the key or the location is missing.
    pub fn resolve_credentials(&self, config: &Config) -> Option<GhlCredentials> {
        let api_key = self.ghl_api_key.clone().or_else(|| config.ghl_api_key.clone())?;
        let location_id = self
            .ghl_location_id
            .clone()
            .or_else(|| config.ghl_location_id.clone())?;
        let calendar_id = self
            .ghl_calendar_id
            .clone()
            .or_else(|| config.ghl_calendar_id.clone());

        Some(GhlCredentials { api_key, location_id, calendar_id })
    }
}

/// Resolved credentials for one CRM call.
#[derive(Debug, Clone)]
pub struct GhlCredentials {
    pub api_key: String,
    pub location_id: String,
    pub calendar_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "sqlite://test.db".to_string(),
            port: 3000,
            ghl_base_url: "https://services.leadconnectorhq.com".to_string(),
            ghl_api_key: Some("env-key".to_string()),
            ghl_location_id: Some("env-loc".to_string()),
            ghl_calendar_id: None,
            studio_timezone: "UTC".to_string(),
            cron_secret: None,
            sync_interval_secs: 0,
            sync_record_delay_ms: 0,
            default_appointment_hours: 3,
        }
    }

    #[test]
    fn settings_values_win_over_env() {
        let mut settings = CrmSettings::disabled();
        settings.ghl_api_key = Some("stored-key".to_string());
        settings.ghl_location_id = Some("stored-loc".to_string());

        let creds = settings.resolve_credentials(&test_config()).unwrap();
        assert_eq!(creds.api_key, "stored-key");
        assert_eq!(creds.location_id, "stored-loc");
    }

    #[test]
    fn env_fills_missing_settings_fields() {
        let settings = CrmSettings::disabled();
        let creds = settings.resolve_credentials(&test_config()).unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.location_id, "env-loc");
        assert!(creds.calendar_id.is_none());
    }

    #[test]
    fn missing_key_everywhere_yields_none() {
        let settings = CrmSettings::disabled();
        let mut config = test_config();
        config.ghl_api_key = None;
        assert!(settings.resolve_credentials(&config).is_none());
    }
}
