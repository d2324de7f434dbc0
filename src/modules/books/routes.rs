//! HTTP adapter for the book operations.
//!
//! Parses the addressing id and JSON bodies, dispatches through the
//! [`BookBus`], and turns outcomes into status codes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_http::AppError;
use serde_json::json;

use super::commands::{CreateBook, DeleteBook, ReplaceBook};
use super::cqrs::BookBus;
use super::handlers::{
    CreateBookHandler, DeleteBookHandler, GetBookHandler, ListBooksHandler, ReplaceBookHandler,
};
use super::models::{BookDto, BookId, CreateBookDto};
use super::queries::{GetBook, ListBooks};

pub fn router(bus: BookBus) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(replace_book).delete(delete_book),
        )
        .with_state(bus)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(bus): State<BookBus>) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = bus.query(ListBooks, ListBooksHandler::new()).await?;
    Ok(Json(books))
}

async fn get_book(
    State(bus): State<BookBus>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    let id: BookId = raw_id.parse()?;

    bus.query(GetBook { id }, GetBookHandler::new())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Book with ID {id} not found.")))
}

async fn create_book(
    State(bus): State<BookBus>,
    payload: Result<Json<CreateBookDto>, JsonRejection>,
) -> Result<Json<BookId>, AppError> {
    let Json(book) = payload.map_err(body_error)?;

    let id = bus
        .execute(CreateBook { book }, CreateBookHandler::new())
        .await?;
    Ok(Json(id))
}

async fn replace_book(
    State(bus): State<BookBus>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BookDto>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id: BookId = raw_id.parse()?;
    let Json(book) = payload.map_err(body_error)?;

    bus.execute(ReplaceBook { id, book }, ReplaceBookHandler::new())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(bus): State<BookBus>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: BookId = raw_id.parse()?;

    bus.execute(DeleteBook { id }, DeleteBookHandler::new())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn body_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("expected a request with `Content-Type: application/json`")
        }
        other => AppError::validation(
            vec![json!({ "field": "body", "error": other.body_text() })],
            "request body is not a valid book",
        ),
    }
}
