use super::links::LinkBuilder;
use super::models::{BookRecord, BookResource, ResourceLinks};

/// Render a stored record as its public representation.
///
/// The version marker is dropped and the identifier only survives as the
/// plain `id` field and inside the `self` link.
pub fn to_public(record: &BookRecord, links: &LinkBuilder) -> BookResource {
    BookResource {
        id: record.id.clone(),
        book: record.book.clone(),
        links: ResourceLinks {
            self_link: links.link(&["books", record.id.as_str()]),
            collection: links.link(&["books"]),
        },
    }
}

/// Links for the collection itself; `self` and `collection` coincide.
pub fn collection_links(links: &LinkBuilder) -> ResourceLinks {
    ResourceLinks {
        self_link: links.link(&["books"]),
        collection: links.link(&["books"]),
    }
}
