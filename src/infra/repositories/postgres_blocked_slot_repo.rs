use crate::domain::{models::availability::BlockedTimeSlot, ports::BlockedSlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresBlockedSlotRepo {
    pool: PgPool,
}

impl PostgresBlockedSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockedSlotRepository for PostgresBlockedSlotRepo {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<BlockedTimeSlot>, AppError> {
        sqlx::query_as::<_, BlockedTimeSlot>("SELECT * FROM blocked_time_slots WHERE date = $1 ORDER BY time ASC").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
