pub mod commands;
pub mod cqrs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod price;
pub mod queries;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Migration, Module};
use sqlx::SqlitePool;

use cqrs::BookBus;
use repository::{BookRepository, SqliteBookRepository, CREATE_BOOKS_TABLE};

/// Book catalog: CRUD over the `Books` table.
pub struct BooksModule {
    bus: BookBus,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self {
            bus: BookBus::new(repository),
        }
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
        routes::router(self.bus.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS_TABLE,
        }]
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

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Positive book identifier",
        "schema": { "type": "integer", "format": "int64", "minimum": 1 }
    });
    let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", serde_json::json!({ "type": "array", "items": book_ref.clone() })),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateBook" }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("Identifier of the new book", serde_json::json!({ "type": "integer", "format": "int64" })),
                        "422": error_response("Invalid book"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": json_response("The book", book_ref.clone()),
                        "400": error_response("Invalid book ID"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "description": "Replaces every field of the addressed book. An `id` in the body is ignored; replacing a missing book is a no-op.",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": book_ref } }
                    },
                    "responses": {
                        "204": { "description": "Replaced" },
                        "400": error_response("Invalid book ID"),
                        "422": error_response("Invalid book")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "description": "Deleting a missing book is a no-op.",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "400": error_response("Invalid book ID")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
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
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "author": { "type": "string" },
                        "quantity": { "type": "integer", "format": "int32" },
                        "price": { "type": "string", "example": "15.99", "description": "Decimal amount with two fractional digits" }
                    },
                    "required": ["name", "description", "author", "quantity", "price"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "author": { "type": "string" },
                        "quantity": { "type": "integer", "format": "int32" },
                        "price": { "type": "string", "example": "15.99" }
                    },
                    "required": ["name", "description", "author", "quantity", "price"]
                }
            }
        }
    })
}

/// Create the books module backed by the SQLite store.
pub fn create_module(pool: SqlitePool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(SqliteBookRepository::new(pool))))
}
