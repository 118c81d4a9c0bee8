//! Auth session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use uuid::Uuid;

use crate::{
    entity::{Changeset, NewRecord, Record, flag},
    error::StoreResult,
    patch::{Patch, require_not_cleared},
    query::{InsertValues, UpdateFragment},
    validation::validate_token,
};

/// Auth session entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub uid: Uuid,
    pub user_uid: Uuid,
    pub token: String,
    pub created_datetime: DateTime<Utc>,
    pub last_access_datetime: DateTime<Utc>,
    pub invalid: bool,
}

impl<'r> FromRow<'r, MySqlRow> for AuthSession {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            user_uid: row.try_get("userUid")?,
            token: row.try_get("token")?,
            created_datetime: row.try_get("createdDatetime")?,
            last_access_datetime: row.try_get("lastAccessDatetime")?,
            invalid: flag(row, "invalid")?,
        })
    }
}

impl Record for AuthSession {
    type Id = Uuid;

    const NAME: &'static str = "AuthSession";
    const TABLE: &'static str = "AHA_AUTH_SESSION";
    const ID_COLUMN: &'static str = "uid";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "userUid",
        "token",
        "createdDatetime",
        "lastAccessDatetime",
        "invalid",
    ];
    const SORTABLE: &'static [&'static str] = &[
        "uid",
        "userUid",
        "token",
        "createdDatetime",
        "lastAccessDatetime",
        "invalid",
    ];
}

/// New session creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewAuthSession {
    pub user_uid: Uuid,
    pub token: String,
}

impl NewRecord for NewAuthSession {
    type Record = AuthSession;

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
            .value("lastAccessDatetime", now)
            .value("invalid", false);
        (uid, values)
    }
}

/// Session update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateAuthSession {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub last_access_datetime: Patch<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub invalid: Patch<bool>,
}

impl Changeset for UpdateAuthSession {
    type Record = AuthSession;

    fn validate(&self) -> StoreResult<()> {
        require_not_cleared("lastAccessDatetime", &self.last_access_datetime)?;
        require_not_cleared("invalid", &self.invalid)?;
        Ok(())
    }

    fn into_fragment(self) -> UpdateFragment {
        UpdateFragment::new()
            .field("lastAccessDatetime", self.last_access_datetime)
            .field("invalid", self.invalid)
    }
}
