//! Data-access objects
//!
//! [`Dao`] implements the uniform create/get/update/delete/list/page/count
//! contract for any [`Record`]. Entity specific lookups live next to it as
//! inherent impls on the concrete `Dao<'_, Entity>` types.
//!
//! A DAO borrows one connection for its whole lifetime and never begins,
//! commits or rolls back a transaction itself. Hand it a
//! `Transaction<'_, MySql>` to group several calls atomically:
//!
//! ```rust,no_run
//! # async fn demo(pool: sqlx::MySqlPool) -> Result<(), store::StoreError> {
//! use store::{models::NewUser, repositories::UserDao};
//!
//! let mut tx = pool.begin().await?;
//! let user = UserDao::new(&mut tx)
//!     .create(NewUser {
//!         email: "ada@example.com".to_string(),
//!         display_name: "Ada".to_string(),
//!         hashed_password: "hash".to_string(),
//!         activated: false,
//!     })
//!     .await?;
//! tx.commit().await?;
//! # let _ = user;
//! # Ok(())
//! # }
//! ```

use sqlx::{FromRow, MySqlConnection};
use std::marker::PhantomData;
use tracing::{debug, info};

use crate::{
    entity::{Changeset, NewRecord, Record, now},
    error::{StoreError, StoreResult},
    pagination::{Page, PageRequest, Pageable, RowSource, Window, paginate},
    query::{OrderBySpec, OrderExpression, SqlValue, bind_value, bind_values},
};

pub mod activation;
pub mod auth_session;
pub mod daily_active_user;
pub mod email_verification;
pub mod user;

pub use activation::ActivationDao;
pub use auth_session::AuthSessionDao;
pub use daily_active_user::DailyActiveUserDao;
pub use email_verification::EmailVerificationDao;
pub use user::UserDao;

/// Generic data-access object over the table of `R`
pub struct Dao<'c, R> {
    conn: &'c mut MySqlConnection,
    _record: PhantomData<fn() -> R>,
}

impl<'c, R: Record> Dao<'c, R> {
    /// Bind a DAO to a connection or transaction
    pub fn new(conn: &'c mut MySqlConnection) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }

    fn select() -> String {
        format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
    }

    fn map_rows(rows: Vec<sqlx::mysql::MySqlRow>) -> StoreResult<Vec<R>> {
        rows.iter()
            .map(|row| R::from_row(row).map_err(StoreError::from))
            .collect()
    }

    /// First row whose `column` equals `value`.
    async fn find_one_where(&mut self, column: &'static str, value: SqlValue) -> StoreResult<Option<R>> {
        let sql = format!("{} WHERE {} = ?", Self::select(), column);
        let row = bind_value(sqlx::query(&sql), value)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(|row| R::from_row(&row).map_err(StoreError::from))
            .transpose()
    }

    /// All rows whose `column` equals `value`, in `order`.
    async fn find_all_where(
        &mut self,
        column: &'static str,
        value: SqlValue,
        order: &OrderExpression,
    ) -> StoreResult<Vec<R>> {
        let sql = format!("{} WHERE {} = ?{}", Self::select(), column, order.clause());
        let rows = bind_value(sqlx::query(&sql), value)
            .fetch_all(&mut *self.conn)
            .await?;

        Self::map_rows(rows)
    }

    async fn count_rows(&mut self) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *self.conn).await?;
        Ok(count as u64)
    }

    async fn fetch_rows(&mut self, order: &OrderExpression, window: Option<Window>) -> StoreResult<Vec<R>> {
        let mut sql = format!("{}{}", Self::select(), order.clause());
        if window.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(window) = window {
            query = query.bind(window.limit).bind(window.offset);
        }
        let rows = query.fetch_all(&mut *self.conn).await?;

        Self::map_rows(rows)
    }

    /// Validate and insert a new row, then return it as stored
    pub async fn create<N>(&mut self, payload: N) -> StoreResult<R>
    where
        N: NewRecord<Record = R>,
    {
        payload.validate()?;

        let (id, insert) = payload.into_insert(now());
        let sql = insert.render(R::TABLE);
        bind_values(sqlx::query(&sql), insert.into_values())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| StoreError::from_write(R::NAME, e))?;

        info!("Created {}: {}", R::NAME, id);
        self.get(&id).await
    }

    /// Get a row by identifier, failing with `NotFound` when absent
    pub async fn get(&mut self, id: &R::Id) -> StoreResult<R> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found(R::NAME, id))
    }

    /// Get a row by identifier, if present
    pub async fn find(&mut self, id: &R::Id) -> StoreResult<Option<R>> {
        debug!("Finding {} by {}: {}", R::NAME, R::ID_COLUMN, id);
        self.find_one_where(R::ID_COLUMN, id.clone().into()).await
    }

    /// Apply a sparse update and return the row as stored afterwards
    ///
    /// An update touching no field issues no statement.
    pub async fn update<C>(&mut self, id: &R::Id, changes: C) -> StoreResult<R>
    where
        C: Changeset<Record = R>,
    {
        changes.validate()?;

        let fragment = changes.into_fragment();
        if fragment.is_empty() {
            debug!("Empty update for {} {}, nothing to write", R::NAME, id);
            return self.get(id).await;
        }

        info!(
            "Updating {} {}: {}",
            R::NAME,
            id,
            fragment.columns().collect::<Vec<_>>().join(", ")
        );

        let sql = format!("UPDATE {} SET {} WHERE {} = ?", R::TABLE, fragment.render(), R::ID_COLUMN);
        let query = bind_values(sqlx::query(&sql), fragment.into_values());
        bind_value(query, id.clone().into())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| StoreError::from_write(R::NAME, e))?;

        self.get(id).await
    }

    /// Delete a row; returns whether a row was removed
    pub async fn delete(&mut self, id: &R::Id) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", R::TABLE, R::ID_COLUMN);
        let result = bind_value(sqlx::query(&sql), id.clone().into())
            .execute(&mut *self.conn)
            .await?;

        let deleted = result.rows_affected() > 0;
        info!("Delete {} {}: {}", R::NAME, id, if deleted { "removed" } else { "absent" });
        Ok(deleted)
    }

    /// Delete every row of the table
    pub async fn delete_all(&mut self) -> StoreResult<()> {
        let sql = format!("DELETE FROM {}", R::TABLE);
        let result = sqlx::query(&sql).execute(&mut *self.conn).await?;

        info!("Deleted all {} rows: {}", R::NAME, result.rows_affected());
        Ok(())
    }

    /// Number of rows in the table
    pub async fn count(&mut self) -> StoreResult<u64> {
        self.count_rows().await
    }

    /// Every row, ordered by `order_by` or by creation time when `None`
    pub async fn list(&mut self, order_by: Option<&OrderBySpec>) -> StoreResult<Vec<R>> {
        let order = OrderExpression::resolve(order_by, R::SORTABLE)?;
        self.fetch_rows(&order, None).await
    }

    /// One page of rows
    pub async fn page(&mut self, pageable: &Pageable) -> StoreResult<Page<R>> {
        let request = PageRequest::resolve(pageable, R::SORTABLE)?;
        debug!("Paging {}: {:?}", R::NAME, request);
        paginate(self, &request).await
    }
}

impl<R: Record> RowSource for Dao<'_, R> {
    type Item = R;

    async fn count(&mut self) -> StoreResult<u64> {
        self.count_rows().await
    }

    async fn fetch(&mut self, order: &OrderExpression, window: Option<Window>) -> StoreResult<Vec<R>> {
        self.fetch_rows(order, window).await
    }
}
