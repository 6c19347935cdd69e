//! Persistence for the books collection.
//!
//! Handlers only see [`BookStore`]; the backend is picked at startup from
//! `database.backend`.

use async_trait::async_trait;
use thiserror::Error;

use shelf_http::error::AppError;

use super::models::{BookRecord, NewBook};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryBookStore;
pub use mongo::MongoBookStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Operations over a single collection of books.
///
/// Identifiers are the 24-character hex form of an ObjectId. A malformed
/// identifier cannot name a stored record, so lookups with one succeed with
/// `None` instead of failing.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: NewBook) -> Result<BookRecord, StoreError>;

    /// Insert every book; returns how many were stored.
    async fn create_many(&self, books: Vec<NewBook>) -> Result<u64, StoreError>;

    /// Records in natural order, skipping `skip` and returning at most `limit`.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<BookRecord>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<BookRecord>, StoreError>;

    /// Replace the writable fields of a record, returning the new state.
    async fn replace(&self, id: &str, book: NewBook) -> Result<Option<BookRecord>, StoreError>;

    /// Remove a record, returning what was removed.
    async fn delete(&self, id: &str) -> Result<Option<BookRecord>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Remove every record; returns how many were removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;
}
