use super::Dao;
use crate::{error::StoreResult, models::EmailVerification};

pub type EmailVerificationDao<'c> = Dao<'c, EmailVerification>;

impl Dao<'_, EmailVerification> {
    /// Find a verification by its emailed token
    pub async fn find_by_token(&mut self, token: &str) -> StoreResult<Option<EmailVerification>> {
        self.find_one_where("token", token.into()).await
    }
}
