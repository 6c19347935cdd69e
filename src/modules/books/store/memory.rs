use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{BookRecord, NewBook};

/// Process-local store keeping records in insertion order.
///
/// Identifiers are real ObjectIds so that records look the same as those
/// coming from MongoDB.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    records: RwLock<Vec<BookRecord>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(book: NewBook) -> BookRecord {
        BookRecord {
            id: ObjectId::new().to_hex(),
            version: 0,
            book,
        }
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<BookRecord, StoreError> {
        let record = Self::record(book);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn create_many(&self, books: Vec<NewBook>) -> Result<u64, StoreError> {
        let created = books.len() as u64;
        let mut records = self.records.write().await;
        records.extend(books.into_iter().map(Self::record));
        Ok(created)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<BookRecord>, StoreError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let records = self.records.read().await;
        Ok(records.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn replace(&self, id: &str, book: NewBook) -> Result<Option<BookRecord>, StoreError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            return Ok(None);
        };

        record.book = book;
        record.version += 1;
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<BookRecord>, StoreError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|record| record.id == id);
        Ok(position.map(|index| records.remove(index)))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
