use super::cqrs::Command;
use super::models::{BookDto, BookId, CreateBookDto};

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub book: CreateBookDto,
}

impl Command for CreateBook {
    const NAME: &'static str = "create_book";
    type Output = BookId;
}

/// Replace every field of the book addressed by `id`.
#[derive(Debug, Clone)]
pub struct ReplaceBook {
    pub id: BookId,
    pub book: BookDto,
}

impl Command for ReplaceBook {
    const NAME: &'static str = "replace_book";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct DeleteBook {
    pub id: BookId,
}

impl Command for DeleteBook {
    const NAME: &'static str = "delete_book";
    type Output = ();
}
