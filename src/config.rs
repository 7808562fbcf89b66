use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub ghl_base_url: String,
    pub ghl_api_key: Option<String>,
    pub ghl_location_id: Option<String>,
    pub ghl_calendar_id: Option<String>,
    pub studio_timezone: String,
    pub cron_secret: Option<String>,
    pub sync_interval_secs: u64,
    pub sync_record_delay_ms: u64,
    pub default_appointment_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            ghl_base_url: env::var("GHL_BASE_URL").unwrap_or_else(|_| "https://services.leadconnectorhq.com".to_string()),
            ghl_api_key: env::var("GHL_API_KEY").ok().filter(|v| !v.is_empty()),
            ghl_location_id: env::var("GHL_LOCATION_ID").ok().filter(|v| !v.is_empty()),
            ghl_calendar_id: env::var("GHL_CALENDAR_ID").ok().filter(|v| !v.is_empty()),
            studio_timezone: env::var("STUDIO_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            cron_secret: env::var("CRON_SECRET").ok().filter(|v| !v.is_empty()),
            sync_interval_secs: env::var("SYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .expect("SYNC_INTERVAL_SECS must be a number"),
            sync_record_delay_ms: env::var("SYNC_RECORD_DELAY_MS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .expect("SYNC_RECORD_DELAY_MS must be a number"),
            default_appointment_hours: env::var("DEFAULT_APPOINTMENT_HOURS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("DEFAULT_APPOINTMENT_HOURS must be a number"),
        }
    }
}
