//! Daily active user statistic

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};

use crate::{
    entity::{Changeset, NewRecord, Record},
    error::StoreResult,
    patch::{Patch, require_not_cleared},
    query::{InsertValues, UpdateFragment},
    validation::{validate_count, validate_date_key},
};

/// Number of distinct users active on one calendar day, keyed by `YYYYMMDD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActiveUser {
    pub date: i32,
    pub count: i32,
    pub created_datetime: DateTime<Utc>,
}

/// `YYYYMMDD` key of a calendar date.
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

impl<'r> FromRow<'r, MySqlRow> for DailyActiveUser {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            date: row.try_get("date")?,
            count: row.try_get("count")?,
            created_datetime: row.try_get("createdDatetime")?,
        })
    }
}

impl Record for DailyActiveUser {
    type Id = i32;

    const NAME: &'static str = "DailyActiveUser";
    const TABLE: &'static str = "AHA_DAILY_ACTIVE_USER";
    const ID_COLUMN: &'static str = "date";
    const COLUMNS: &'static [&'static str] = &["date", "count", "createdDatetime"];
    const SORTABLE: &'static [&'static str] = &["date", "count", "createdDatetime"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewDailyActiveUser {
    pub date: i32,
    pub count: i32,
}

impl NewRecord for NewDailyActiveUser {
    type Record = DailyActiveUser;

    fn validate(&self) -> StoreResult<()> {
        validate_date_key(self.date)?;
        validate_count("count", self.count)?;
        Ok(())
    }

    fn into_insert(self, now: DateTime<Utc>) -> (i32, InsertValues) {
        let values = InsertValues::new()
            .value("date", self.date)
            .value("count", self.count)
            .value("createdDatetime", now);
        (self.date, values)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateDailyActiveUser {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub count: Patch<i32>,
}

impl Changeset for UpdateDailyActiveUser {
    type Record = DailyActiveUser;

    fn validate(&self) -> StoreResult<()> {
        require_not_cleared("count", &self.count)?;
        if let Patch::Set(count) = self.count {
            validate_count("count", count)?;
        }
        Ok(())
    }

    fn into_fragment(self) -> UpdateFragment {
        UpdateFragment::new().field("count", self.count)
    }
}
