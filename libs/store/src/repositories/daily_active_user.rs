//! Daily active user statistic writes

use tracing::info;

use super::Dao;
use crate::{
    entity::{Record, now},
    error::{StoreError, StoreResult},
    models::DailyActiveUser,
    validation::{validate_count, validate_date_key},
};

pub type DailyActiveUserDao<'c> = Dao<'c, DailyActiveUser>;

impl Dao<'_, DailyActiveUser> {
    /// Store the count for `date`, replacing any count already recorded
    pub async fn record(&mut self, date: i32, count: i32) -> StoreResult<DailyActiveUser> {
        validate_date_key(date)?;
        validate_count("count", count)?;

        let sql = format!(
            "INSERT INTO {} (date, count, createdDatetime) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE count = VALUES(count)",
            DailyActiveUser::TABLE
        );
        sqlx::query(&sql)
            .bind(date)
            .bind(count)
            .bind(now())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| StoreError::from_write(DailyActiveUser::NAME, e))?;

        info!("Recorded {} daily active users for {}", count, date);
        self.get(&date).await
    }
}
