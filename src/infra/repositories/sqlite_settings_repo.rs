use crate::domain::{models::settings::CrmSettings, ports::SettingsRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSettingsRepo {
    pool: SqlitePool,
}

impl SqliteSettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepo {
    async fn get(&self) -> Result<Option<CrmSettings>, AppError> {
        sqlx::query_as::<_, CrmSettings>("SELECT * FROM crm_settings WHERE id = ?").bind(CrmSettings::SINGLETON_ID).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn upsert(&self, settings: &CrmSettings) -> Result<CrmSettings, AppError> {
        sqlx::query_as::<_, CrmSettings>(
            "INSERT INTO crm_settings (id, use_ghl_calendar, ghl_api_key, ghl_location_id, ghl_calendar_id, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 use_ghl_calendar = excluded.use_ghl_calendar,
                 ghl_api_key = excluded.ghl_api_key,
                 ghl_location_id = excluded.ghl_location_id,
                 ghl_calendar_id = excluded.ghl_calendar_id,
                 updated_at = excluded.updated_at
             RETURNING *"
        )
            .bind(&settings.id).bind(settings.use_ghl_calendar).bind(&settings.ghl_api_key)
            .bind(&settings.ghl_location_id).bind(&settings.ghl_calendar_id).bind(settings.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
