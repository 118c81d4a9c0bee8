//! Auth session lookups beyond the generic contract

use tracing::info;
use uuid::Uuid;

use super::Dao;
use crate::{entity::Record, error::StoreResult, models::AuthSession, query::OrderExpression};

pub type AuthSessionDao<'c> = Dao<'c, AuthSession>;

impl Dao<'_, AuthSession> {
    /// Find a session by its token
    pub async fn find_by_token(&mut self, token: &str) -> StoreResult<Option<AuthSession>> {
        self.find_one_where("token", token.into()).await
    }

    /// Every session of a user, oldest first
    pub async fn list_for_user(&mut self, user_uid: &Uuid) -> StoreResult<Vec<AuthSession>> {
        self.find_all_where("userUid", (*user_uid).into(), &OrderExpression::created_ascending())
            .await
    }

    /// Mark every still-valid session of a user invalid; returns how many changed
    pub async fn invalidate_for_user(&mut self, user_uid: &Uuid) -> StoreResult<u64> {
        let sql = format!(
            "UPDATE {} SET invalid = 1 WHERE userUid = ? AND invalid = 0",
            AuthSession::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(*user_uid)
            .execute(&mut *self.conn)
            .await?;

        info!("Invalidated {} sessions for user: {}", result.rows_affected(), user_uid);
        Ok(result.rows_affected())
    }
}
