//! Email verification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use uuid::Uuid;

use crate::{
    entity::{Changeset, NewRecord, Record},
    error::StoreResult,
    patch::Patch,
    query::{InsertValues, UpdateFragment},
    validation::validate_token,
};

/// Email verification entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerification {
    pub uid: Uuid,
    pub user_uid: Uuid,
    pub token: String,
    pub created_datetime: DateTime<Utc>,
    pub verified_datetime: Option<DateTime<Utc>>,
}

impl EmailVerification {
    pub fn is_verified(&self) -> bool {
        self.verified_datetime.is_some()
    }
}

impl<'r> FromRow<'r, MySqlRow> for EmailVerification {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            user_uid: row.try_get("userUid")?,
            token: row.try_get("token")?,
            created_datetime: row.try_get("createdDatetime")?,
            verified_datetime: row.try_get("verifiedDatetime")?,
        })
    }
}

impl Record for EmailVerification {
    type Id = Uuid;

    const NAME: &'static str = "EmailVerification";
    const TABLE: &'static str = "AHA_EMAIL_VERIFICATION";
    const ID_COLUMN: &'static str = "uid";
    const COLUMNS: &'static [&'static str] =
        &["uid", "userUid", "token", "createdDatetime", "verifiedDatetime"];
    const SORTABLE: &'static [&'static str] =
        &["uid", "userUid", "token", "createdDatetime", "verifiedDatetime"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEmailVerification {
    pub user_uid: Uuid,
    pub token: String,
}

impl NewRecord for NewEmailVerification {
    type Record = EmailVerification;

    fn validate(&self) -> StoreResult<()> {
        validate_token(&self.token)?;
        Ok(())
    }

    fn into_insert(self, now: DateTime<Utc>) -> (Uuid, InsertValues) {
        let uid = Uuid::new_v4();
        let values = InsertValues::new()
            .value("uid", uid)
            .value("userUid", self.user_uid)
            .value("token", self.token)
            .value("createdDatetime", now)
            .value("verifiedDatetime", None::<DateTime<Utc>>);
        (uid, values)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateEmailVerification {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub verified_datetime: Patch<DateTime<Utc>>,
}

impl Changeset for UpdateEmailVerification {
    type Record = EmailVerification;

    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    fn into_fragment(self) -> UpdateFragment {
        UpdateFragment::new().field("verifiedDatetime", self.verified_datetime)
    }
}
