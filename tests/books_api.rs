use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shelf_app::books::models::{BookRecord, NewBook};
use shelf_app::books::store::{BookStore, InMemoryBookStore, StoreError};
use shelf_kernel::settings::{Environment, LinkPolicy, Settings};

const BASE_URL: &str = "http://books.test";

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.server.base_url = BASE_URL.to_string();
    settings
}

fn app_with(store: Arc<dyn BookStore>, settings: &Settings) -> Router {
    let registry = shelf_app::build_registry(store, settings);
    shelf_http::build_router(&registry, settings)
}

fn app() -> (Router, Arc<InMemoryBookStore>) {
    let store = Arc::new(InMemoryBookStore::new());
    (app_with(store.clone(), &settings()), store)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json");

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        description: "Lorem ipsum".to_string(),
        author: "A. Writer".to_string(),
        pages: Some(120),
        genre: Some("Mystery".to_string()),
    }
}

async fn fill(store: &InMemoryBookStore, amount: usize) {
    let books = (1..=amount).map(|n| book(&format!("Book {n}"))).collect();
    store.create_many(books).await.unwrap();
}

#[tokio::test]
async fn list_second_page_with_bounded_links() {
    let (app, store) = app();
    fill(&store, 25).await;

    let response = send(&app, request("GET", "/books?page=2&limit=10", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let pagination = &body["pagination"];
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["currentItems"], 10);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["totalItems"], 25);
    assert_eq!(pagination["_links"]["first"]["page"], 1);
    assert_eq!(pagination["_links"]["last"]["page"], 3);
    assert_eq!(pagination["_links"]["previous"]["page"], 1);
    assert_eq!(pagination["_links"]["next"]["page"], 3);
    assert_eq!(
        pagination["_links"]["next"]["href"],
        "http://books.test/books?page=3&limit=10"
    );

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["title"], "Book 11");
    assert_eq!(body["_links"]["self"]["href"], "http://books.test/books");
    assert_eq!(body["_links"]["collection"]["href"], "http://books.test/books");
}

#[tokio::test]
async fn list_second_page_with_legacy_links() {
    let mut settings = settings();
    settings.pagination.links = LinkPolicy::Legacy;
    let store = Arc::new(InMemoryBookStore::new());
    fill(&store, 25).await;
    let app = app_with(store, &settings);

    let body = json_body(send(&app, request("GET", "/books?page=2&limit=10", None)).await).await;
    let pagination = &body["pagination"];
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["_links"]["last"]["page"], 3);
    assert_eq!(pagination["_links"]["next"]["page"], 3);
    assert!(pagination["_links"]["previous"].is_null());
}

#[tokio::test]
async fn list_without_limit_uses_default_page_size() {
    let (app, store) = app();
    fill(&store, 45).await;

    let body = json_body(send(&app, request("GET", "/books?page=abc", None)).await).await;
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["currentItems"], 20);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(
        body["pagination"]["_links"]["first"]["href"],
        "http://books.test/books?page=1&limit=20"
    );
}

#[tokio::test]
async fn list_with_repeated_query_keys_uses_first_values() {
    let (app, store) = app();
    fill(&store, 12).await;

    let response = send(&app, request("GET", "/books?page=1&page=2&limit=5&limit=50", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["currentItems"], 5);
    assert_eq!(body["items"][0]["title"], "Book 1");
}

#[tokio::test]
async fn list_far_beyond_the_last_page_is_empty() {
    let (app, store) = app();
    fill(&store, 3).await;

    let response = send(&app, request("GET", "/books?page=9223372036854775807&limit=100", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["pagination"]["currentItems"], 0);
    assert_eq!(body["pagination"]["totalItems"], 3);
}

#[tokio::test]
async fn create_then_fetch_round_trips() {
    let (app, _store) = app();

    let response = send(
        &app,
        request(
            "POST",
            "/books",
            Some(json!({
                "title": "Dune",
                "description": "Spice and sand",
                "author": "Frank Herbert",
                "pages": 412
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();

    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("{BASE_URL}/books/{id}"));
    assert!(created.get("_id").is_none());
    assert!(created.get("__v").is_none());

    let response = send(&app, request("GET", &format!("/books/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = json_body(response).await;
    assert_eq!(fetched["title"], "Dune");
    assert_eq!(fetched["description"], "Spice and sand");
    assert_eq!(fetched["author"], "Frank Herbert");
    assert_eq!(fetched["pages"], 412);
    assert!(fetched["_links"]["self"]["href"]
        .as_str()
        .unwrap()
        .ends_with(&id));
    assert_eq!(fetched["_links"]["collection"]["href"], "http://books.test/books");
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let (app, store) = app();

    let response = send(
        &app,
        request("POST", "/books", Some(json!({"title": "Dune", "author": ""}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Description cannot be empty");
    assert_eq!(body["error"]["details"][1]["field"], "author");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn seed_marker_in_create_body_is_not_special() {
    let (app, store) = app();
    fill(&store, 3).await;

    let response = send(
        &app,
        request("POST", "/books", Some(json!({"method": "SEED", "amount": 10}))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (app, _store) = app();

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/books")
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "bad_request");
}

#[tokio::test]
async fn update_with_empty_title_leaves_record_unchanged() {
    let (app, store) = app();
    let record = store.create(book("Original")).await.unwrap();

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/books/{}", record.id),
            Some(json!({"title": "", "description": "New", "author": "New"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "Title cannot be empty"
    );

    let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn update_replaces_the_whole_document() {
    let (app, store) = app();
    let record = store.create(book("Original")).await.unwrap();

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/books/{}", record.id),
            Some(json!({"title": "Revised", "description": "New text", "author": "Editor"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], record.id.as_str());
    assert_eq!(body["title"], "Revised");
    assert!(body.get("pages").is_none());
    assert!(body.get("genre").is_none());

    let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.book.pages, None);
}

#[tokio::test]
async fn update_of_unknown_book_is_not_found() {
    let (app, _store) = app();

    let response = send(
        &app,
        request(
            "PUT",
            "/books/65f1c0ffee0000000000abcd",
            Some(json!({"title": "T", "description": "D", "author": "A"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_fetch_is_not_found() {
    let (app, store) = app();
    let record = store.create(book("Doomed")).await.unwrap();
    let uri = format!("/books/{}", record.id);

    let response = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    let response = send(&app, request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_with_malformed_id_is_not_found() {
    let (app, _store) = app();

    let response = send(&app, request("GET", "/books/not-an-id", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn html_accept_header_is_rejected_without_touching_data() {
    let (app, store) = app();
    let record = store.create(book("Kept")).await.unwrap();

    for (method, uri, body) in [
        ("GET", "/books".to_string(), None),
        (
            "POST",
            "/books".to_string(),
            Some(json!({"title": "T", "description": "D", "author": "A"}).to_string()),
        ),
        ("GET", format!("/books/{}", record.id), None),
        (
            "PUT",
            format!("/books/{}", record.id),
            Some(json!({"title": "T", "description": "D", "author": "A"}).to_string()),
        ),
        ("DELETE", format!("/books/{}", record.id), None),
        ("POST", "/admin/books/seed".to_string(), Some(json!({"amount": 5}).to_string())),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(&uri)
            .header(header::ACCEPT, "text/html")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE, "{method} {uri}");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.find_by_id(&record.id).await.unwrap(), Some(record));
}

#[tokio::test]
async fn options_advertise_allowed_methods_without_json_accept() {
    let (app, _store) = app();

    for (uri, allow) in [
        ("/books", "GET, POST, OPTIONS"),
        ("/books/65f1c0ffee0000000000abcd", "GET, PUT, DELETE, OPTIONS"),
    ] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(response.headers()[header::ALLOW], allow);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], allow);
    }
}

#[tokio::test]
async fn every_response_carries_cors_headers() {
    let (app, _store) = app();

    let response = send(&app, request("GET", "/books", None)).await;
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Origin, Content-Type, Accept, Authorization"
    );
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn admin_seed_replaces_collection_in_local_environment() {
    let (app, store) = app();
    fill(&store, 4).await;

    let response = send(
        &app,
        request("POST", "/admin/books/seed", Some(json!({"amount": 12}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "deleted": 4, "created": 12})
    );

    let records = store.find_page(0, 100).await.unwrap();
    assert_eq!(records.len(), 12);
    for record in records {
        assert!(!record.book.title.is_empty());
        assert!(!record.book.description.is_empty());
        assert!(!record.book.author.is_empty());
    }
}

#[tokio::test]
async fn admin_seed_requires_matching_token_when_configured() {
    let mut settings = settings();
    settings.admin.seed_token = Some("s3cret".to_string());
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(store.clone(), &settings);

    let response = send(
        &app,
        request("POST", "/admin/books/seed", Some(json!({"amount": 2}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.count().await.unwrap(), 0);

    let mut authorized = request("POST", "/admin/books/seed", Some(json!({"amount": 2})));
    authorized
        .headers_mut()
        .insert("x-admin-token", "s3cret".parse().unwrap());
    let response = send(&app, authorized).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn admin_seed_is_forbidden_outside_local_without_token() {
    let mut settings = settings();
    settings.environment = Environment::Production;
    let store = Arc::new(InMemoryBookStore::new());
    fill(&store, 2).await;
    let app = app_with(store.clone(), &settings);

    let response = send(
        &app,
        request("POST", "/admin/books/seed", Some(json!({"amount": 2}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn admin_seed_rejects_amount_over_limit() {
    let (app, store) = app();
    fill(&store, 1).await;

    let response = send(
        &app,
        request("POST", "/admin/books/seed", Some(json!({"amount": 5000}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.count().await.unwrap(), 1);
}

/// A store whose backend is always down.
struct UnavailableStore;

#[async_trait]
impl BookStore for UnavailableStore {
    async fn create(&self, _book: NewBook) -> Result<BookRecord, StoreError> {
        Err(unavailable())
    }

    async fn create_many(&self, _books: Vec<NewBook>) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn find_page(&self, _skip: u64, _limit: u64) -> Result<Vec<BookRecord>, StoreError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<BookRecord>, StoreError> {
        Err(unavailable())
    }

    async fn replace(&self, _id: &str, _book: NewBook) -> Result<Option<BookRecord>, StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &str) -> Result<Option<BookRecord>, StoreError> {
        Err(unavailable())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Backend("connection refused".to_string())
}

#[tokio::test]
async fn store_failures_are_internal_errors() {
    let app = app_with(Arc::new(UnavailableStore), &settings());

    let cases = [
        request("GET", "/books", None),
        request(
            "POST",
            "/books",
            Some(json!({"title": "T", "description": "D", "author": "A"})),
        ),
        request("GET", "/books/65f1c0ffee0000000000abcd", None),
        request("DELETE", "/books/65f1c0ffee0000000000abcd", None),
    ];

    for request in cases {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"]["code"], "internal_error");
    }
}

#[tokio::test]
async fn openapi_document_lists_books_paths() {
    let (app, _store) = app();

    let response = send(&app, Request::builder().uri("/docs/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let spec = json_body(response).await;
    assert!(spec["paths"]["/books"]["get"].is_object());
    assert!(spec["paths"]["/books/{id}"]["put"].is_object());
    assert!(spec["paths"]["/admin/books/seed"]["post"].is_object());
    assert!(spec["components"]["schemas"]["BookPage"].is_object());
}
