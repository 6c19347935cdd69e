//! Placeholder data generation for the books collection.

use fake::faker::lorem::en::{Sentences, Words};
use fake::faker::name::en::Name;
use fake::Fake;

use super::models::{NewBook, SeedReport};
use super::store::{BookStore, StoreError};

const GENRES: &[&str] = &[
    "Fantasy",
    "Science fiction",
    "Mystery",
    "Thriller",
    "Romance",
    "Horror",
    "Historical fiction",
    "Biography",
    "Poetry",
    "Young adult",
];

/// Generate one book with every field populated.
pub fn fake_book() -> NewBook {
    let words: Vec<String> = Words(2..6).fake();
    let lines: Vec<String> = Sentences(5..9).fake();
    let genre = GENRES[(0..GENRES.len()).fake::<usize>()];

    NewBook {
        title: title_case(&words),
        description: lines.join("\n"),
        author: Name().fake(),
        pages: Some((1..1001u32).fake::<u32>()),
        genre: Some(genre.to_string()),
    }
}

fn title_case(words: &[String]) -> String {
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Purge the collection and fill it with `amount` generated books.
pub async fn seed(store: &dyn BookStore, amount: u64) -> Result<SeedReport, StoreError> {
    let deleted = store.delete_all().await?;
    let books: Vec<NewBook> = (0..amount).map(|_| fake_book()).collect();
    let created = store.create_many(books).await?;

    tracing::info!(deleted, created, "books collection seeded");

    Ok(SeedReport {
        success: true,
        deleted,
        created,
    })
}
