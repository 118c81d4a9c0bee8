//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use uuid::Uuid;

use crate::{
    entity::{Changeset, NewRecord, Record, flag},
    error::StoreResult,
    patch::{Patch, require_not_cleared},
    query::{InsertValues, UpdateFragment},
    validation::{validate_count, validate_display_name, validate_email, validate_hashed_password},
};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_datetime: DateTime<Utc>,
    pub activated: bool,
    pub login_count: i32,
    pub disabled: bool,
    pub last_access_datetime: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, MySqlRow> for User {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            email: row.try_get("email")?,
            display_name: row.try_get("displayName")?,
            hashed_password: row.try_get("hashedPassword")?,
            created_datetime: row.try_get("createdDatetime")?,
            activated: flag(row, "activated")?,
            login_count: row.try_get("loginCount")?,
            disabled: flag(row, "disabled")?,
            last_access_datetime: row.try_get("lastAccessDatetime")?,
        })
    }
}

impl Record for User {
    type Id = Uuid;

    const NAME: &'static str = "User";
    const TABLE: &'static str = "AHA_USER";
    const ID_COLUMN: &'static str = "uid";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "email",
        "displayName",
        "hashedPassword",
        "createdDatetime",
        "activated",
        "loginCount",
        "disabled",
        "lastAccessDatetime",
    ];
    const SORTABLE: &'static [&'static str] = &[
        "uid",
        "email",
        "displayName",
        "createdDatetime",
        "activated",
        "loginCount",
        "disabled",
        "lastAccessDatetime",
    ];
}

/// New user creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub hashed_password: String,
    /// Users created through an OAuth provider start activated
    #[serde(default)]
    pub activated: bool,
}

impl NewRecord for NewUser {
    type Record = User;

    fn validate(&self) -> StoreResult<()> {
        validate_email(&self.email)?;
        validate_display_name(&self.display_name)?;
        validate_hashed_password(&self.hashed_password)?;
        Ok(())
    }

    fn into_insert(self, now: DateTime<Utc>) -> (Uuid, InsertValues) {
        let uid = Uuid::new_v4();
        let values = InsertValues::new()
            .value("uid", uid)
            .value("email", self.email)
            .value("displayName", self.display_name)
            .value("hashedPassword", self.hashed_password)
            .value("createdDatetime", now)
            .value("activated", self.activated)
            .value("loginCount", 0_i32)
            .value("disabled", false)
            .value("lastAccessDatetime", None::<DateTime<Utc>>);
        (uid, values)
    }
}

/// User update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub email: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub display_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub hashed_password: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub activated: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub login_count: Patch<i32>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub disabled: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub last_access_datetime: Patch<DateTime<Utc>>,
}

impl Changeset for UpdateUser {
    type Record = User;

    fn validate(&self) -> StoreResult<()> {
        require_not_cleared("email", &self.email)?;
        require_not_cleared("displayName", &self.display_name)?;
        require_not_cleared("hashedPassword", &self.hashed_password)?;
        require_not_cleared("activated", &self.activated)?;
        require_not_cleared("loginCount", &self.login_count)?;
        require_not_cleared("disabled", &self.disabled)?;

        if let Patch::Set(email) = &self.email {
            validate_email(email)?;
        }
        if let Patch::Set(display_name) = &self.display_name {
            validate_display_name(display_name)?;
        }
        if let Patch::Set(hashed_password) = &self.hashed_password {
            validate_hashed_password(hashed_password)?;
        }
        if let Patch::Set(login_count) = self.login_count {
            validate_count("loginCount", login_count)?;
        }
        Ok(())
    }

    fn into_fragment(self) -> UpdateFragment {
        UpdateFragment::new()
            .field("email", self.email)
            .field("displayName", self.display_name)
            .field("hashedPassword", self.hashed_password)
            .field("activated", self.activated)
            .field("loginCount", self.login_count)
            .field("disabled", self.disabled)
            .field("lastAccessDatetime", self.last_access_datetime)
    }
}
