use super::Dao;
use crate::{error::StoreResult, models::Activation};

pub type ActivationDao<'c> = Dao<'c, Activation>;

impl Dao<'_, Activation> {
    /// Find an activation by its emailed token
    pub async fn find_by_token(&mut self, token: &str) -> StoreResult<Option<Activation>> {
        self.find_one_where("token", token.into()).await
    }
}
