use crate::domain::{models::availability::BlockedTimeSlot, ports::BlockedSlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteBlockedSlotRepo {
    pool: SqlitePool,
}

impl SqliteBlockedSlotRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockedSlotRepository for SqliteBlockedSlotRepo {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<BlockedTimeSlot>, AppError> {
        sqlx::query_as::<_, BlockedTimeSlot>("SELECT * FROM blocked_time_slots WHERE date = ? ORDER BY time ASC").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
