use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::{BookStore, StoreError};
use crate::modules::books::models::{BookRecord, NewBook};

/// Shape of a book inside the MongoDB collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    description: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(rename = "__v", default)]
    version: i64,
}

impl BookDocument {
    fn new(book: NewBook) -> Self {
        Self {
            id: None,
            title: book.title,
            description: book.description,
            author: book.author,
            pages: book.pages,
            genre: book.genre,
            version: 0,
        }
    }

    fn into_record(self) -> Result<BookRecord, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Backend("document without _id".to_string()))?;

        Ok(BookRecord {
            id: id.to_hex(),
            version: self.version,
            book: NewBook {
                title: self.title,
                description: self.description,
                author: self.author,
                pages: self.pages,
                genre: self.genre,
            },
        })
    }
}

/// Books stored in a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

/// Filter selecting `id`, or `None` when `id` is not an ObjectId.
fn id_filter(id: &str) -> Option<Document> {
    ObjectId::parse_str(id).ok().map(|oid| doc! { "_id": oid })
}

/// Full-replacement update that keeps `_id` and bumps `__v`.
fn replacement(book: NewBook) -> Document {
    let mut set = doc! {
        "title": book.title,
        "description": book.description,
        "author": book.author,
    };
    let mut unset = Document::new();

    match book.pages {
        Some(pages) => {
            set.insert("pages", i64::from(pages));
        }
        None => {
            unset.insert("pages", "");
        }
    }
    match book.genre {
        Some(genre) => {
            set.insert("genre", genre);
        }
        None => {
            unset.insert("genre", "");
        }
    }

    let mut update = doc! { "$set": set, "$inc": { "__v": 1_i64 } };
    // An empty `$unset` is rejected by the server.
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn create(&self, book: NewBook) -> Result<BookRecord, StoreError> {
        let mut document = BookDocument::new(book);
        let inserted = self.collection.insert_one(&document).await?;

        let id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("insert did not return an ObjectId".to_string()))?;
        document.id = Some(id);

        tracing::debug!(book_id = %id, "book inserted");
        document.into_record()
    }

    async fn create_many(&self, books: Vec<NewBook>) -> Result<u64, StoreError> {
        if books.is_empty() {
            return Ok(0);
        }

        let documents: Vec<BookDocument> = books.into_iter().map(BookDocument::new).collect();
        let inserted = self.collection.insert_many(documents).await?;
        Ok(inserted.inserted_ids.len() as u64)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<BookRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;

        let documents: Vec<BookDocument> = cursor.try_collect().await?;
        documents.into_iter().map(BookDocument::into_record).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookRecord>, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };

        self.collection
            .find_one(filter)
            .await?
            .map(BookDocument::into_record)
            .transpose()
    }

    async fn replace(&self, id: &str, book: NewBook) -> Result<Option<BookRecord>, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };

        self.collection
            .find_one_and_update(filter, replacement(book))
            .return_document(ReturnDocument::After)
            .await?
            .map(BookDocument::into_record)
            .transpose()
    }

    async fn delete(&self, id: &str) -> Result<Option<BookRecord>, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };

        self.collection
            .find_one_and_delete(filter)
            .await?
            .map(BookDocument::into_record)
            .transpose()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let deleted = self.collection.delete_many(doc! {}).await?;
        Ok(deleted.deleted_count)
    }
}
