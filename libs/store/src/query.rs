//! Query builder primitives
//!
//! Turns ordering requests and sparse updates into SQL fragments. Column
//! names only ever reach SQL text after being matched against an entity's
//! static column list; every value travels as a bound parameter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, mysql::MySqlArguments, query::Query};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    patch::Patch,
};

/// Column every entity is ordered by when no ordering is requested
pub const CREATED_FIELD: &str = "createdDatetime";

/// A single sort directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub desc: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }
}

/// One or many sort directives, as accepted on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderBySpec {
    One(OrderBy),
    Many(Vec<OrderBy>),
}

impl OrderBySpec {
    pub fn as_slice(&self) -> &[OrderBy] {
        match self {
            OrderBySpec::One(order_by) => std::slice::from_ref(order_by),
            OrderBySpec::Many(order_by) => order_by,
        }
    }
}

impl From<OrderBy> for OrderBySpec {
    fn from(order_by: OrderBy) -> Self {
        OrderBySpec::One(order_by)
    }
}

impl From<Vec<OrderBy>> for OrderBySpec {
    fn from(order_by: Vec<OrderBy>) -> Self {
        OrderBySpec::Many(order_by)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A validated ordering, ready to render.
///
/// Terms keep the priority of the request: the first term is the primary
/// sort key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderExpression {
    terms: Vec<(&'static str, Direction)>,
}

impl OrderExpression {
    /// Ascending creation time.
    pub fn created_ascending() -> Self {
        Self {
            terms: vec![(CREATED_FIELD, Direction::Asc)],
        }
    }

    /// Resolve a requested ordering against the columns of one table.
    ///
    /// `None` yields the default creation-time ordering, an empty list yields
    /// an empty expression. A field outside `columns` is a validation error.
    pub fn resolve(
        order_by: Option<&OrderBySpec>,
        columns: &'static [&'static str],
    ) -> StoreResult<Self> {
        let Some(order_by) = order_by else {
            return Ok(Self::created_ascending());
        };

        let terms = order_by
            .as_slice()
            .iter()
            .map(|entry| -> StoreResult<(&'static str, Direction)> {
                let column = columns
                    .iter()
                    .copied()
                    .find(|column| *column == entry.field)
                    .ok_or_else(|| {
                        StoreError::Validation(format!("Cannot order by unknown field '{}'", entry.field))
                    })?;
                let direction = if entry.desc {
                    Direction::Desc
                } else {
                    Direction::Asc
                };
                Ok((column, direction))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[(&'static str, Direction)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `field DIR, field DIR`, or an empty string.
    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// ` ORDER BY ...` with a leading space, or nothing when empty.
    pub fn clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", self.render())
        }
    }
}

/// A value bound as a query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Bind a single value onto a query.
pub(crate) fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(value) => query.bind(value),
        SqlValue::Int(value) => query.bind(value),
        SqlValue::Text(value) => query.bind(value),
        SqlValue::Uuid(value) => query.bind(value),
        SqlValue::Timestamp(value) => query.bind(value),
    }
}

/// Bind values onto a query in order.
pub(crate) fn bind_values<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    values: impl IntoIterator<Item = SqlValue>,
) -> Query<'q, MySql, MySqlArguments> {
    values.into_iter().fold(query, bind_value)
}

/// Column assignments of a sparse update, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFragment {
    assignments: Vec<(&'static str, SqlValue)>,
}

impl UpdateFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value` unless the patch leaves the column untouched.
    pub fn field<T: Into<SqlValue>>(mut self, column: &'static str, patch: Patch<T>) -> Self {
        match patch {
            Patch::Unchanged => {}
            Patch::Set(value) => self.assignments.push((column, value.into())),
            Patch::Clear => self.assignments.push((column, SqlValue::Null)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments.iter().map(|(column, _)| *column)
    }

    /// `col = ?, col = ?`
    pub fn render(&self) -> String {
        self.assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn into_values(self) -> impl Iterator<Item = SqlValue> {
        self.assignments.into_iter().map(|(_, value)| value)
    }
}

/// Column values for a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertValues {
    values: Vec<(&'static str, SqlValue)>,
}

impl InsertValues {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn value(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    /// `INSERT INTO table (a, b) VALUES (?, ?)`
    pub fn render(&self, table: &str) -> String {
        let columns = self
            .values
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; self.values.len()].join(", ");
        format!("INSERT INTO {} ({}) VALUES ({})", table, columns, placeholders)
    }

    pub fn into_values(self) -> impl Iterator<Item = SqlValue> {
        self.values.into_iter().map(|(_, value)| value)
    }
}

impl Default for InsertValues {
    fn default() -> Self {
        Self::new()
    }
}
