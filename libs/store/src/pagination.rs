//! Offset pagination engine
//!
//! A [`Pageable`] is normalized into a [`PageRequest`] and executed against a
//! [`RowSource`], which is anything able to count its rows and fetch an
//! ordered window of them. DAOs are row sources over one table.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::{
    error::StoreResult,
    query::{OrderBySpec, OrderExpression},
};

/// A page request as received from callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pageable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBySpec>,
}

impl Pageable {
    pub fn new(index: i64, page_size: i64) -> Self {
        Self {
            index: Some(index),
            page_size: Some(page_size),
            order_by: None,
        }
    }

    pub fn ordered_by(mut self, order_by: impl Into<OrderBySpec>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }
}

/// One page of results with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub index: u64,
    /// Effective page size; equals `total_items` for unbounded requests
    pub page_size: u64,
    /// Always at least 1
    pub total_pages: u64,
    pub total_items: u64,
    /// Number of entries in `content`
    pub num_items: u64,
    pub content: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Unbounded,
    Bounded(u64),
}

/// LIMIT/OFFSET window of a bounded fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// A normalized page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u64,
    pub size: PageSize,
    pub order: OrderExpression,
}

impl PageRequest {
    /// Normalize a [`Pageable`] for a table with the given columns.
    ///
    /// A missing or negative index becomes 0, a missing or non-positive page
    /// size means unbounded, and a missing ordering means ascending creation
    /// time. Order fields outside `columns` are rejected.
    pub fn resolve(pageable: &Pageable, columns: &'static [&'static str]) -> StoreResult<Self> {
        let index = pageable.index.filter(|index| *index > 0).unwrap_or(0) as u64;
        let size = match pageable.page_size {
            Some(size) if size > 0 => PageSize::Bounded(size as u64),
            _ => PageSize::Unbounded,
        };
        let order = OrderExpression::resolve(pageable.order_by.as_ref(), columns)?;

        Ok(Self { index, size, order })
    }

    fn window(&self) -> Option<Window> {
        match self.size {
            PageSize::Unbounded => None,
            PageSize::Bounded(limit) => Some(Window {
                limit,
                offset: self.index.saturating_mul(limit),
            }),
        }
    }
}

/// Rows of a single table, countable and fetchable in order
pub trait RowSource {
    type Item;

    /// Total number of rows.
    fn count(&mut self) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Rows in `order`, restricted to `window` when given.
    fn fetch(
        &mut self,
        order: &OrderExpression,
        window: Option<Window>,
    ) -> impl Future<Output = StoreResult<Vec<Self::Item>>> + Send;
}

/// Number of pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// Execute a page request against a row source.
///
/// The count is a separate query issued after the fetch, so under concurrent
/// writes it may disagree with the returned rows unless the caller runs both
/// inside one transaction.
pub async fn paginate<S: RowSource>(source: &mut S, request: &PageRequest) -> StoreResult<Page<S::Item>> {
    match request.window() {
        None if request.index == 0 => {
            let content = source.fetch(&request.order, None).await?;
            let total = content.len() as u64;
            Ok(Page {
                index: 0,
                page_size: total,
                total_pages: 1,
                total_items: total,
                num_items: total,
                content,
            })
        }
        None => {
            let total = source.count().await?;
            Ok(Page {
                index: request.index,
                page_size: total,
                total_pages: 1,
                total_items: total,
                num_items: 0,
                content: Vec::new(),
            })
        }
        Some(window) => {
            let content = source.fetch(&request.order, Some(window)).await?;
            let total = source.count().await?;
            Ok(Page {
                index: request.index,
                page_size: window.limit,
                total_pages: total_pages(total, window.limit),
                total_items: total,
                num_items: content.len() as u64,
                content,
            })
        }
    }
}
