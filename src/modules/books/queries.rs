use super::cqrs::Query;
use super::models::{BookDto, BookId};

#[derive(Debug, Clone, Default)]
pub struct ListBooks;

impl Query for ListBooks {
    const NAME: &'static str = "list_books";
    type Output = Vec<BookDto>;
}

#[derive(Debug, Clone)]
pub struct GetBook {
    pub id: BookId,
}

impl Query for GetBook {
    const NAME: &'static str = "get_book";
    type Output = Option<BookDto>;
}
