//! One handler per book operation. Each maps between transfer shapes and
//! entities around exactly one repository call.

use async_trait::async_trait;

use super::commands::{CreateBook, DeleteBook, ReplaceBook};
use super::cqrs::{Command, CommandHandler, Query, QueryHandler};
use super::error::BookError;
use super::models::{BookDto, NewBook};
use super::queries::{GetBook, ListBooks};
use super::repository::BookRepository;

#[derive(Debug, Default, Clone, Copy)]
pub struct ListBooksHandler;

impl ListBooksHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryHandler<ListBooks> for ListBooksHandler {
    async fn handle(
        &self,
        _query: ListBooks,
        repository: &dyn BookRepository,
    ) -> Result<<ListBooks as Query>::Output, BookError> {
        let books = repository.list_all().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GetBookHandler;

impl GetBookHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryHandler<GetBook> for GetBookHandler {
    async fn handle(
        &self,
        query: GetBook,
        repository: &dyn BookRepository,
    ) -> Result<<GetBook as Query>::Output, BookError> {
        let book = repository.get_by_id(query.id).await?;
        Ok(book.map(BookDto::from))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateBookHandler;

impl CreateBookHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler<CreateBook> for CreateBookHandler {
    async fn handle(
        &self,
        command: CreateBook,
        repository: &dyn BookRepository,
    ) -> Result<<CreateBook as Command>::Output, BookError> {
        command.book.validate()?;

        let book = NewBook::from(command.book);
        let id = repository.add(&book).await?;

        tracing::info!(book_id = %id, "book created");
        Ok(id)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceBookHandler;

impl ReplaceBookHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler<ReplaceBook> for ReplaceBookHandler {
    async fn handle(
        &self,
        command: ReplaceBook,
        repository: &dyn BookRepository,
    ) -> Result<(), BookError> {
        command.book.validate()?;

        if command.book.id != 0 && command.book.id != command.id.get() {
            tracing::debug!(
                book_id = %command.id,
                body_id = command.book.id,
                "ignoring mismatched id in replacement body"
            );
        }

        let book = command.book.into_book(command.id);
        repository.update(&book).await?;

        tracing::info!(book_id = %command.id, "book replaced");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteBookHandler;

impl DeleteBookHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler<DeleteBook> for DeleteBookHandler {
    async fn handle(
        &self,
        command: DeleteBook,
        repository: &dyn BookRepository,
    ) -> Result<(), BookError> {
        repository.delete_by_id(command.id).await?;

        tracing::info!(book_id = %command.id, "book deleted");
        Ok(())
    }
}
