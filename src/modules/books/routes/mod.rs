//! HTTP handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use shelf_http::error::AppError;

use super::models::{BookPage, BookPayload, BookResource, NewBook};
use super::pagination::{self, PageQuery, PageRequest};
use super::resource::{collection_links, to_public};
use super::BooksState;

pub mod admin;

const COLLECTION_METHODS: &str = "GET, POST, OPTIONS";
const ITEM_METHODS: &str = "GET, PUT, DELETE, OPTIONS";

/// Payload fields in the order their errors are reported.
const FIELD_ORDER: &[&str] = &["title", "description", "author", "pages", "genre"];

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route(
            "/",
            get(list_books)
                .post(create_book)
                .options(collection_options),
        )
        .route(
            "/{id}",
            get(get_book)
                .put(replace_book)
                .delete(delete_book)
                .options(item_options),
        )
        .with_state(state)
}

async fn collection_options() -> impl IntoResponse {
    [
        (header::ALLOW, COLLECTION_METHODS),
        (header::ACCESS_CONTROL_ALLOW_METHODS, COLLECTION_METHODS),
    ]
}

async fn item_options() -> impl IntoResponse {
    [
        (header::ALLOW, ITEM_METHODS),
        (header::ACCESS_CONTROL_ALLOW_METHODS, ITEM_METHODS),
    ]
}

/// Paginated list of books
async fn list_books(
    State(state): State<BooksState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BookPage>, AppError> {
    let query = PageQuery::from_pairs(&pairs);
    let request = PageRequest::from_query(&query, &state.pagination);

    let records = state.store.find_page(request.skip(), request.limit).await?;
    let total_items = state.store.count().await?;

    let pagination = pagination::compute(
        request,
        total_items,
        records.len(),
        &state.links,
        state.pagination.links,
    );
    let items = records
        .iter()
        .map(|record| to_public(record, &state.links))
        .collect();

    Ok(Json(BookPage {
        items,
        links: collection_links(&state.links),
        pagination,
    }))
}

async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let book = validated(payload)?;
    let record = state.store.create(book).await?;

    tracing::info!(book_id = %record.id, "book created");

    let resource = to_public(&record, &state.links);
    let location = resource.links.self_link.href.clone();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(resource),
    ))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookResource>, AppError> {
    let record = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| book_not_found(&id))?;

    Ok(Json(to_public(&record, &state.links)))
}

async fn replace_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<BookResource>, AppError> {
    let book = validated(payload)?;
    let record = state
        .store
        .replace(&id, book)
        .await?
        .ok_or_else(|| book_not_found(&id))?;

    tracing::info!(book_id = %record.id, version = record.version, "book replaced");
    Ok(Json(to_public(&record, &state.links)))
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .delete(&id)
        .await?
        .ok_or_else(|| book_not_found(&id))?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn book_not_found(id: &str) -> AppError {
    tracing::debug!(book_id = %id, "book lookup missed");
    AppError::not_found("Book not found")
}

/// Unwrap and validate a book body.
fn validated(payload: Result<Json<BookPayload>, JsonRejection>) -> Result<NewBook, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    if let Err(errors) = payload.validate() {
        return Err(validation_error(&errors));
    }

    payload
        .into_new_book()
        .ok_or_else(|| AppError::bad_request("Book is missing required fields"))
}

/// One `{field, error}` detail per failure; the first one becomes the message.
fn validation_error(errors: &ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();

    let details: Vec<serde_json::Value> = FIELD_ORDER
        .iter()
        .filter_map(|field| field_errors.get(*field).map(|list| (*field, list)))
        .flat_map(|(field, list)| {
            list.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                json!({ "field": field, "error": message })
            })
        })
        .collect();

    let message = details
        .first()
        .and_then(|detail| detail["error"].as_str())
        .unwrap_or("Book is invalid")
        .to_string();

    AppError::validation(details, message)
}
