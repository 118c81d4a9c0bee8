//! User lookups beyond the generic contract

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::Dao;
use crate::{
    entity::Record,
    error::{StoreError, StoreResult},
    models::User,
};

pub type UserDao<'c> = Dao<'c, User>;

impl Dao<'_, User> {
    /// Find a user by email, ignoring case
    pub async fn find_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        info!("Finding user by email: {}", email);
        self.find_one_where("email", email.into()).await
    }

    /// Count a successful sign-in: bump `loginCount` and stamp `lastAccessDatetime`
    pub async fn record_login(&mut self, uid: &Uuid, at: DateTime<Utc>) -> StoreResult<User> {
        info!("Recording login for user: {}", uid);

        let sql = format!(
            "UPDATE {} SET loginCount = loginCount + 1, lastAccessDatetime = ? WHERE uid = ?",
            User::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(at)
            .bind(*uid)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(User::NAME, uid));
        }
        self.get(uid).await
    }

    /// Users whose last access falls in `[from, to)`
    pub async fn count_active_between(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE lastAccessDatetime >= ? AND lastAccessDatetime < ?",
            User::TABLE
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(from)
            .bind(to)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count as u64)
    }
}
