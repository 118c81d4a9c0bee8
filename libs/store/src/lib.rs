//! Data-access layer for the Aha application
//!
//! Entities ([`models`]) are read and written through the generic
//! [`repositories::Dao`], which renders whitelisted orderings and sparse
//! updates ([`query`]) and pages results with the offset pagination engine
//! ([`pagination`]).

pub mod entity;
pub mod error;
pub mod models;
pub mod pagination;
pub mod patch;
pub mod query;
pub mod repositories;
pub mod schema;
pub mod validation;

pub use error::{StoreError, StoreResult};
pub use pagination::{Page, Pageable};
pub use patch::Patch;
pub use query::{OrderBy, OrderBySpec};
