pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use biblio_http::error::AppError;
use biblio_kernel::{InitCtx, Module};

use models::{Book, BookId, BookPayload, FieldError};
use store::{BookStore, InMemoryBookStore, SharedStore, StoreError};

/// Books module: CRUD over the book catalog, backed by an injected store
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryBookStore::new()))
    }

    /// Build the module around an explicit store handle
    pub fn with_store(store: SharedStore) -> Self {
        Self { store }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}

/// Build the books router over the given store handle
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book)
                .put(update_book)
                .patch(patch_book)
                .delete(delete_book),
        )
        .with_state(store)
}

fn validation_error(errors: Vec<FieldError>) -> AppError {
    let details = errors
        .iter()
        .map(|e| json!({"field": e.field, "error": e.error}))
        .collect();
    AppError::validation(details, "book payload failed validation")
}

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(id) => AppError::not_found(format!("no book with id {id}")),
        StoreError::DuplicateIsbn(isbn) => AppError::conflict(
            vec![json!({"field": "isbn", "error": "already exists"})],
            format!("a book with isbn '{isbn}' already exists"),
        ),
    }
}

/// POST /: validate, persist with a store-assigned id, return 201
async fn create_book(
    State(store): State<SharedStore>,
    Json(payload): Json<BookPayload>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let data = payload.validate().map_err(validation_error)?;
    let book = store.save(None, data).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /: every record in store order; an empty catalog is an empty array
async fn list_books(State(store): State<SharedStore>) -> Result<Json<Vec<Book>>, AppError> {
    let books = store.find_all().await.map_err(store_error)?;
    Ok(Json(books))
}

/// GET /{id}
async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, AppError> {
    let book = store
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("no book with id {id}")))?;
    Ok(Json(book))
}

/// PUT /{id}: existence check, then validation, then unconditional
/// overwrite of every field
async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<BookId>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<Book>, AppError> {
    store
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("no book with id {id}")))?;

    let data = payload.validate().map_err(validation_error)?;
    let book = store.save(Some(id), data).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book replaced");
    Ok(Json(book))
}

/// PATCH /{id}: no validation, just the per-field merge, then save
async fn patch_book(
    State(store): State<SharedStore>,
    Path(id): Path<BookId>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let mut book = store
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("no book with id {id}")))?;

    payload.merge_into(&mut book.data);
    let book = store.save(Some(id), book.data).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book patched");
    Ok(Json(book))
}

/// DELETE /{id}: 404 for unknown ids, so a repeated delete is not idempotent
async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    store
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("no book with id {id}")))?;

    store.delete_by_id(id).await.map_err(store_error)?;

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

/// OpenAPI fragment for the books module; paths are prefixed with
/// `/api/books` by the router builder
fn openapi_fragment() -> serde_json::Value {
    let payload_body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "All books in the catalog",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": payload_body.clone(),
                    "responses": {
                        "201": book_response("Book created"),
                        "409": error_response("Duplicate isbn"),
                        "422": error_response("Validation failure")
                    }
                }
            },
            "/{id}": {
                "parameters": [{
                    "name": "id",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "integer", "format": "int64" }
                }],
                "get": {
                    "summary": "Fetch a book by id",
                    "tags": ["Books"],
                    "responses": {
                        "200": book_response("The book"),
                        "404": { "description": "No such book" }
                    }
                },
                "put": {
                    "summary": "Replace every field of a book",
                    "tags": ["Books"],
                    "requestBody": payload_body.clone(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "404": { "description": "No such book" },
                        "409": error_response("Duplicate isbn"),
                        "422": error_response("Validation failure")
                    }
                },
                "patch": {
                    "summary": "Merge present, non-blank fields into a book",
                    "tags": ["Books"],
                    "requestBody": payload_body,
                    "responses": {
                        "200": book_response("Updated book"),
                        "404": { "description": "No such book" },
                        "409": error_response("Duplicate isbn")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": { "description": "No such book" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "isbn": { "type": "string" },
                        "publicationYear": { "type": "integer" },
                        "available": { "type": "boolean" }
                    },
                    "required": ["id", "title", "author", "isbn", "publicationYear", "available"]
                },
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "isbn": { "type": "string" },
                        "publicationYear": { "type": "integer" },
                        "available": { "type": "boolean" }
                    }
                }
            }
        }
    })
}
