use crate::domain::{models::legacy::LegacyAppointment, ports::LegacyAppointmentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresLegacyRepo {
    pool: PgPool,
}

impl PostgresLegacyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegacyAppointmentRepository for PostgresLegacyRepo {
    async fn list_unsynced(&self) -> Result<Vec<LegacyAppointment>, AppError> {
        sqlx::query_as::<_, LegacyAppointment>("SELECT * FROM legacy_appointments WHERE ghl_appointment_id IS NULL ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_synced(&self, id: &str, contact_id: &str, appointment_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE legacy_appointments SET ghl_contact_id = $1, ghl_appointment_id = $2, ghl_sync_error = NULL, ghl_skipped_reason = NULL WHERE id = $3")
            .bind(contact_id).bind(appointment_id).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_sync_failed(&self, id: &str, contact_id: Option<&str>, error: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE legacy_appointments SET ghl_contact_id = COALESCE($1, ghl_contact_id), ghl_sync_error = $2, ghl_retry_count = ghl_retry_count + 1 WHERE id = $3")
            .bind(contact_id).bind(error).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_sync_skipped(&self, id: &str, contact_id: Option<&str>, reason: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE legacy_appointments SET ghl_contact_id = COALESCE($1, ghl_contact_id), ghl_skipped_reason = $2 WHERE id = $3")
            .bind(contact_id).bind(reason).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
