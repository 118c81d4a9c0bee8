//! Account activation model

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

/// Activation entity; `activated_datetime` is set once the emailed token is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub uid: Uuid,
    pub user_uid: Uuid,
    pub token: String,
    pub created_datetime: DateTime<Utc>,
    pub activated_datetime: Option<DateTime<Utc>>,
}

impl Activation {
    pub fn is_used(&self) -> bool {
        self.activated_datetime.is_some()
    }
}

impl<'r> FromRow<'r, MySqlRow> for Activation {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            user_uid: row.try_get("userUid")?,
            token: row.try_get("token")?,
            created_datetime: row.try_get("createdDatetime")?,
            activated_datetime: row.try_get("activatedDatetime")?,
        })
    }
}

impl Record for Activation {
    type Id = Uuid;

    const NAME: &'static str = "Activation";
    const TABLE: &'static str = "AHA_ACTIVATION";
    const ID_COLUMN: &'static str = "uid";
    const COLUMNS: &'static [&'static str] =
        &["uid", "userUid", "token", "createdDatetime", "activatedDatetime"];
    const SORTABLE: &'static [&'static str] =
        &["uid", "userUid", "token", "createdDatetime", "activatedDatetime"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewActivation {
    pub user_uid: Uuid,
    pub token: String,
}

impl NewRecord for NewActivation {
    type Record = Activation;

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
            .value("activatedDatetime", None::<DateTime<Utc>>);
        (uid, values)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateActivation {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub activated_datetime: Patch<DateTime<Utc>>,
}

impl Changeset for UpdateActivation {
    type Record = Activation;

    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    fn into_fragment(self) -> UpdateFragment {
        UpdateFragment::new().field("activatedDatetime", self.activated_datetime)
    }
}
