use serde::{Deserialize, Serialize};
use validator::Validate;

/// A book as persisted by a [`BookStore`](super::store::BookStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Store-assigned identifier, 24 lowercase hex characters
    pub id: String,
    /// Bumped on every replacement, never exposed publicly
    pub version: i64,
    pub book: NewBook,
}

/// The writable part of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// Request body for creating or replacing a book.
///
/// Every field is optional at the JSON level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookPayload {
    #[validate(
        required(message = "Title cannot be empty"),
        length(min = 1, message = "Title cannot be empty")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Description cannot be empty"),
        length(min = 1, message = "Description cannot be empty")
    )]
    pub description: Option<String>,
    #[validate(
        required(message = "Author cannot be empty"),
        length(min = 1, message = "Author cannot be empty")
    )]
    pub author: Option<String>,
    pub pages: Option<u32>,
    #[validate(length(min = 1, message = "Genre cannot be empty"))]
    pub genre: Option<String>,
}

impl BookPayload {
    /// Convert a payload that already passed validation.
    ///
    /// Returns `None` if a required field is missing.
    pub fn into_new_book(self) -> Option<NewBook> {
        Some(NewBook {
            title: self.title?,
            description: self.description?,
            author: self.author?,
            pages: self.pages,
            genre: self.genre,
        })
    }
}

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// `self` and `collection` relations attached to every representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub collection: Link,
}

/// Public representation of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResource {
    pub id: String,
    #[serde(flatten)]
    pub book: NewBook,
    #[serde(rename = "_links")]
    pub links: ResourceLinks,
}

/// Response body of the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub items: Vec<BookResource>,
    #[serde(rename = "_links")]
    pub links: ResourceLinks,
    pub pagination: super::pagination::Pagination,
}

/// Request body of the administrative seed endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRequest {
    pub amount: u64,
}

/// Result of a seed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub success: bool,
    pub deleted: u64,
    pub created: u64,
}
