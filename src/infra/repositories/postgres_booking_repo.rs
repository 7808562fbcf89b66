use crate::domain::{
    models::{availability::BlockedTimeSlot, booking::Booking},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking, blocked: &[BlockedTimeSlot]) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, client_name, client_email, client_phone, service_id, service_name, date, time, end_time, artist_id, artist_name, price, deposit_amount, deposit_paid, status, notes, ghl_contact_id, ghl_appointment_id, ghl_sync_error, ghl_retry_count, ghl_last_retry, ghl_skipped_reason, last_synced_at, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25) RETURNING *")
            .bind(&booking.id).bind(&booking.client_name).bind(&booking.client_email).bind(&booking.client_phone).bind(&booking.service_id).bind(&booking.service_name).bind(booking.date).bind(&booking.time).bind(&booking.end_time).bind(&booking.artist_id).bind(&booking.artist_name).bind(booking.price).bind(booking.deposit_amount).bind(booking.deposit_paid).bind(&booking.status).bind(&booking.notes).bind(&booking.ghl_contact_id).bind(&booking.ghl_appointment_id).bind(&booking.ghl_sync_error).bind(booking.ghl_retry_count).bind(booking.ghl_last_retry).bind(&booking.ghl_skipped_reason).bind(booking.last_synced_at).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for slot in blocked {
            sqlx::query("INSERT INTO blocked_time_slots (id, date, time, artist_id, booking_id, reason, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(&slot.id).bind(slot.date).bind(&slot.time).bind(&slot.artist_id).bind(&slot.booking_id).bind(&slot.reason).bind(slot.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date = $1 AND status IN ('pending', 'confirmed') ORDER BY time ASC").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date >= $1 AND date <= $2 ORDER BY date ASC, time ASC").bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_unsynced(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE ghl_appointment_id IS NULL ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(status).bind(Utc::now()).bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        // Leaving the active set releases the booking's blocked hours.
        if !updated.is_active() {
            sqlx::query("DELETE FROM blocked_time_slots WHERE booking_id = $1")
                .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn mark_synced(&self, id: &str, contact_id: &str, appointment_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET ghl_contact_id = $1, ghl_appointment_id = $2, ghl_sync_error = NULL, ghl_skipped_reason = NULL, last_synced_at = $3, updated_at = $4 WHERE id = $5")
            .bind(contact_id).bind(appointment_id).bind(Utc::now()).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_sync_failed(&self, id: &str, contact_id: Option<&str>, error: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET ghl_contact_id = COALESCE($1, ghl_contact_id), ghl_sync_error = $2, ghl_retry_count = ghl_retry_count + 1, ghl_last_retry = $3, updated_at = $4 WHERE id = $5")
            .bind(contact_id).bind(error).bind(Utc::now()).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_sync_skipped(&self, id: &str, contact_id: Option<&str>, reason: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET ghl_contact_id = COALESCE($1, ghl_contact_id), ghl_skipped_reason = $2, updated_at = $3 WHERE id = $4")
            .bind(contact_id).bind(reason).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
