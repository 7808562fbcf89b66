use crate::domain::{models::availability::ArtistAvailability, ports::AvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAvailabilityRepo {
    pool: PgPool,
}

impl PostgresAvailabilityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepo {
    async fn find_enabled_for_weekday(&self, artist_id: Option<&str>, day_of_week: &str) -> Result<Option<ArtistAvailability>, AppError> {
        sqlx::query_as::<_, ArtistAvailability>("SELECT * FROM artist_availability WHERE day_of_week = $1 AND is_enabled = TRUE AND ($2 IS NULL OR artist_id = $2) ORDER BY artist_id ASC LIMIT 1").bind(day_of_week).bind(artist_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_artist(&self, artist_id: &str) -> Result<Vec<ArtistAvailability>, AppError> {
        sqlx::query_as::<_, ArtistAvailability>("SELECT * FROM artist_availability WHERE artist_id = $1 ORDER BY day_of_week ASC").bind(artist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn upsert(&self, record: &ArtistAvailability) -> Result<ArtistAvailability, AppError> {
        sqlx::query_as::<_, ArtistAvailability>("INSERT INTO artist_availability (id, artist_id, day_of_week, is_enabled, time_ranges, services_offered, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (artist_id, day_of_week) DO UPDATE SET is_enabled = excluded.is_enabled, time_ranges = excluded.time_ranges, services_offered = excluded.services_offered, updated_at = excluded.updated_at RETURNING *")
            .bind(&record.id).bind(&record.artist_id).bind(&record.day_of_week).bind(record.is_enabled).bind(&record.time_ranges).bind(&record.services_offered).bind(record.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn reset_for_artist(&self, artist_id: &str, schedule: &[ArtistAvailability]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM artist_availability WHERE artist_id = $1").bind(artist_id).execute(&mut *tx).await.map_err(AppError::Database)?;

        for record in schedule {
            sqlx::query("INSERT INTO artist_availability (id, artist_id, day_of_week, is_enabled, time_ranges, services_offered, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(&record.id).bind(&record.artist_id).bind(&record.day_of_week).bind(record.is_enabled).bind(&record.time_ranges).bind(&record.services_offered).bind(record.updated_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
