//! Traits tying an entity to its table
//!
//! A [`Record`] names its table, identifier column and columns; a
//! [`NewRecord`] turns a create payload into column values; a [`Changeset`]
//! turns an update payload into column assignments. The generic DAO needs
//! nothing else to serve an entity.

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use std::fmt;

use crate::{
    error::StoreResult,
    query::{InsertValues, SqlValue, UpdateFragment},
};

/// An entity stored in one table
pub trait Record: for<'r> FromRow<'r, MySqlRow> + Send + Unpin + 'static {
    type Id: Clone + fmt::Display + Into<SqlValue> + Send + Sync;

    /// Name used in errors and logs
    const NAME: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Columns selected for every read
    const COLUMNS: &'static [&'static str];
    /// Columns callers may order by
    const SORTABLE: &'static [&'static str];
}

/// Create payload for a [`Record`]
pub trait NewRecord: Send {
    type Record: Record;

    fn validate(&self) -> StoreResult<()>;

    /// Identifier and column values of the row to insert, created at `now`.
    fn into_insert(self, now: DateTime<Utc>) -> (<Self::Record as Record>::Id, InsertValues);
}

/// Update payload for a [`Record`]
pub trait Changeset: Send {
    type Record: Record;

    fn validate(&self) -> StoreResult<()>;

    fn into_fragment(self) -> UpdateFragment;
}

/// Read a TINYINT flag column as a boolean.
pub(crate) fn flag(row: &MySqlRow, column: &str) -> Result<bool, sqlx::Error> {
    let value: i8 = row.try_get(column)?;
    Ok(value != 0)
}

/// Current time at the precision of a `DATETIME(6)` column.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
