pub mod links;
pub mod models;
pub mod pagination;
pub mod resource;
pub mod routes;
pub mod seed;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;

use shelf_kernel::settings::{AdminSettings, Environment, PaginationSettings, Settings};
use shelf_kernel::{InitCtx, Module};

use links::LinkBuilder;
use store::BookStore;

/// Everything a books handler needs, cloned into router state.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    pub links: LinkBuilder,
    pub pagination: PaginationSettings,
    pub admin: AdminSettings,
    pub environment: Environment,
}

impl BooksState {
    pub fn new(store: Arc<dyn BookStore>, settings: &Settings) -> Self {
        Self {
            store,
            links: LinkBuilder::new(settings.server.base_url.clone()),
            pagination: settings.pagination.clone(),
            admin: settings.admin.clone(),
            environment: settings.environment,
        }
    }
}

/// The books resource: CRUD, pagination and seeding
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            base_url = %self.state.links.base_url(),
            link_policy = ?self.state.pagination.links,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(routes::admin::router(self.state.clone()))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let json_body = |schema: &str| {
            json!({
                "application/json": {
                    "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                }
            })
        };
        let id_parameter = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let options = |allow: &str| {
            json!({
                "summary": "Discover allowed methods",
                "tags": ["Books"],
                "responses": {
                    "200": {
                        "description": format!("Allow: {}", allow)
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": { "description": "A page of books", "content": json_body("BookPage") },
                            "406": error_response("Client does not accept JSON"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": { "required": true, "content": json_body("BookInput") },
                        "responses": {
                            "201": { "description": "Created book", "content": json_body("Book") },
                            "400": error_response("Validation error"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "options": options("GET, POST, OPTIONS")
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Fetch a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter.clone()],
                        "responses": {
                            "200": { "description": "The book", "content": json_body("Book") },
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter.clone()],
                        "requestBody": { "required": true, "content": json_body("BookInput") },
                        "responses": {
                            "200": { "description": "The replaced book", "content": json_body("Book") },
                            "400": error_response("Validation error"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "options": options("GET, PUT, DELETE, OPTIONS")
                },
                "/admin/books/seed": {
                    "post": {
                        "summary": "Replace every book with generated data",
                        "tags": ["Admin"],
                        "requestBody": { "required": true, "content": json_body("SeedRequest") },
                        "responses": {
                            "200": { "description": "Seed report", "content": json_body("SeedReport") },
                            "400": error_response("Invalid amount"),
                            "401": error_response("Missing or wrong admin token"),
                            "403": error_response("Seeding disabled")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Link": {
                        "type": "object",
                        "properties": { "href": { "type": "string", "format": "uri" } },
                        "required": ["href"]
                    },
                    "PageLink": {
                        "type": "object",
                        "properties": {
                            "page": { "type": "integer" },
                            "href": { "type": "string", "format": "uri" }
                        },
                        "required": ["page", "href"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "description": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 },
                            "pages": { "type": "integer", "minimum": 0 },
                            "genre": { "type": "string", "minLength": 1 }
                        },
                        "required": ["title", "description", "author"]
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "author": { "type": "string" },
                            "pages": { "type": "integer" },
                            "genre": { "type": "string" },
                            "_links": {
                                "type": "object",
                                "properties": {
                                    "self": { "$ref": "#/components/schemas/Link" },
                                    "collection": { "$ref": "#/components/schemas/Link" }
                                }
                            }
                        },
                        "required": ["id", "title", "description", "author", "_links"]
                    },
                    "BookPage": {
                        "type": "object",
                        "properties": {
                            "items": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                            "pagination": {
                                "type": "object",
                                "properties": {
                                    "currentPage": { "type": "integer" },
                                    "currentItems": { "type": "integer" },
                                    "totalPages": { "type": "integer" },
                                    "totalItems": { "type": "integer" },
                                    "_links": {
                                        "type": "object",
                                        "properties": {
                                            "first": { "$ref": "#/components/schemas/PageLink" },
                                            "last": { "$ref": "#/components/schemas/PageLink" },
                                            "previous": { "$ref": "#/components/schemas/PageLink" },
                                            "next": { "$ref": "#/components/schemas/PageLink" }
                                        }
                                    }
                                }
                            }
                        },
                        "required": ["items", "pagination"]
                    },
                    "SeedRequest": {
                        "type": "object",
                        "properties": { "amount": { "type": "integer", "minimum": 0 } },
                        "required": ["amount"]
                    },
                    "SeedReport": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "deleted": { "type": "integer" },
                            "created": { "type": "integer" }
                        },
                        "required": ["success", "deleted", "created"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self.state.store.count().await?;
        tracing::info!(module = self.name(), books = count, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(BooksState::new(store, settings)))
}
