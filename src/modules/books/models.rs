use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BookError;
use super::price::Price;

/// Store-assigned book identifier. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn new(raw: i64) -> Result<Self, BookError> {
        if raw <= 0 {
            return Err(BookError::InvalidId(raw.to_string()));
        }
        Ok(BookId(raw))
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for BookId {
    type Err = BookError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| BookError::InvalidId(raw.to_string()))?;
        BookId::new(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A catalog book as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub quantity: i32,
    pub price: Price,
}

/// A book that has not been stored yet, hence has no identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub description: String,
    pub author: String,
    pub quantity: i32,
    pub price: Price,
}

/// Request body for creating a book. Any `id` key sent by the caller is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookDto {
    pub name: String,
    pub description: String,
    pub author: String,
    pub quantity: i32,
    pub price: Price,
}

/// Book as returned to callers and accepted for replacement.
///
/// On input `id` is optional and never used to address the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDto {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub author: String,
    pub quantity: i32,
    pub price: Price,
}

/// Field-level problem reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub error: &'static str,
}

fn check_name(name: &str) -> Vec<FieldViolation> {
    if name.trim().is_empty() {
        vec![FieldViolation {
            field: "name",
            error: "must not be blank",
        }]
    } else {
        Vec::new()
    }
}

impl CreateBookDto {
    pub fn validate(&self) -> Result<(), BookError> {
        BookError::from_violations(check_name(&self.name))
    }
}

impl BookDto {
    pub fn validate(&self) -> Result<(), BookError> {
        BookError::from_violations(check_name(&self.name))
    }

    /// Entity for `id`; the body's own `id` is discarded.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            name: self.name,
            description: self.description,
            author: self.author,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

impl From<CreateBookDto> for NewBook {
    fn from(dto: CreateBookDto) -> Self {
        NewBook {
            name: dto.name,
            description: dto.description,
            author: dto.author,
            quantity: dto.quantity,
            price: dto.price,
        }
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        BookDto {
            id: book.id.get(),
            name: book.name,
            description: book.description,
            author: book.author,
            quantity: book.quantity,
            price: book.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(id: i64, name: &str) -> BookDto {
        BookDto {
            id,
            name: name.to_string(),
            description: "Updated dystopian novel".to_string(),
            author: "George Orwell".to_string(),
            quantity: 5,
            price: Price::from_cents(1699),
        }
    }

    #[test]
    fn book_id_must_be_positive() {
        assert_eq!(BookId::new(1).unwrap().get(), 1);
        assert!(matches!(BookId::new(0), Err(BookError::InvalidId(_))));
        assert!(matches!(BookId::new(-1), Err(BookError::InvalidId(_))));
        assert!(matches!("abc".parse::<BookId>(), Err(BookError::InvalidId(_))));
        assert_eq!("42".parse::<BookId>().unwrap().get(), 42);
    }

    #[test]
    fn into_book_takes_identity_from_argument() {
        let book = dto(999, "1984 Updated").into_book(BookId::new(10).unwrap());

        assert_eq!(book.id.get(), 10);
        assert_eq!(book.name, "1984 Updated");
        assert_eq!(book.price, Price::from_cents(1699));
    }

    #[test]
    fn blank_name_is_a_violation() {
        let err = dto(1, "   ").validate().unwrap_err();
        match err {
            BookError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "name");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_description_and_author_are_allowed() {
        let create = CreateBookDto {
            name: "Untitled".to_string(),
            description: String::new(),
            author: String::new(),
            quantity: 0,
            price: Price::default(),
        };

        assert!(create.validate().is_ok());
    }

    #[test]
    fn create_body_ignores_client_id() {
        let body = r#"{"id":77,"name":"1984","description":"dystopian","author":"Orwell","quantity":3,"price":15.99}"#;
        let create: CreateBookDto = serde_json::from_str(body).unwrap();

        let new_book = NewBook::from(create);
        assert_eq!(new_book.name, "1984");
        assert_eq!(new_book.price.cents(), 1599);
    }

    #[test]
    fn replacement_body_id_is_optional() {
        let body = r#"{"name":"X","description":"","author":"","quantity":1,"price":"10.00"}"#;
        let parsed: BookDto = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.id, 0);
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let body = r#"{"name":"X","author":"","quantity":1,"price":"10.00"}"#;
        assert!(serde_json::from_str::<CreateBookDto>(body).is_err());
    }
}
