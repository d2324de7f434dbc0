//! Book persistence contract and its SQLite implementation.
//!
//! SQLite has no exact decimal type, so prices cross this boundary as an
//! integer count of cents stored in the `PriceCents` column.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use super::error::PersistenceError;
use super::models::{Book, BookId, NewBook};
use super::price::Price;

/// Storage operations the book handlers rely on.
///
/// `update` and `delete_by_id` do not report whether a row matched; a missing
/// book makes them a no-op.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every stored book in backend order; empty when there are none.
    async fn list_all(&self) -> Result<Vec<Book>, PersistenceError>;

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, PersistenceError>;

    /// Store a new book and return the identifier the backend assigned.
    async fn add(&self, book: &NewBook) -> Result<BookId, PersistenceError>;

    /// Replace every field of the row with `book.id`.
    async fn update(&self, book: &Book) -> Result<(), PersistenceError>;

    async fn delete_by_id(&self, id: BookId) -> Result<(), PersistenceError>;
}

pub(crate) const CREATE_BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS Books (
        Id          INTEGER PRIMARY KEY AUTOINCREMENT,
        Name        TEXT NOT NULL,
        Description TEXT,
        Author      TEXT,
        Quantity    INTEGER,
        PriceCents  INTEGER
    );
"#;

/// Row as read back from `SELECT * FROM Books`.
///
/// Legacy rows may carry NULLs in the optional columns.
#[derive(Debug, FromRow)]
struct BookRow {
    #[sqlx(rename = "Id")]
    id: i64,
    #[sqlx(rename = "Name")]
    name: String,
    #[sqlx(rename = "Description")]
    description: Option<String>,
    #[sqlx(rename = "Author")]
    author: Option<String>,
    #[sqlx(rename = "Quantity")]
    quantity: Option<i32>,
    #[sqlx(rename = "PriceCents")]
    price_cents: Option<i64>,
}

impl TryFrom<BookRow> for Book {
    type Error = PersistenceError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let id = BookId::new(row.id).map_err(|e| PersistenceError::CorruptRow {
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(Book {
            id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            author: row.author.unwrap_or_default(),
            quantity: row.quantity.unwrap_or_default(),
            price: Price::from_cents(row.price_cents.unwrap_or_default()),
        })
    }
}

/// `BookRepository` over a sqlx SQLite pool.
///
/// Each call checks out one pooled connection, runs a single statement on it
/// and hands it back when the guard drops, whatever the outcome.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list_all(&self) -> Result<Vec<Book>, PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<BookRow> = sqlx::query_as("SELECT * FROM Books")
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!(count = rows.len(), "listed books");
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<BookRow> = sqlx::query_as("SELECT * FROM Books WHERE Id = ?1")
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await?;

        row.map(Book::try_from).transpose()
    }

    async fn add(&self, book: &NewBook) -> Result<BookId, PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        // The generated key comes from this statement's own result on this
        // connection, so concurrent inserts cannot leak their ids in here.
        let result = sqlx::query(
            "INSERT INTO Books (Name, Description, Author, Quantity, PriceCents) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.author)
        .bind(book.quantity)
        .bind(book.price.cents())
        .execute(&mut *conn)
        .await?;

        let raw_id = result.last_insert_rowid();
        let id = BookId::new(raw_id).map_err(|e| PersistenceError::CorruptRow {
            id: raw_id,
            reason: e.to_string(),
        })?;

        tracing::debug!(book_id = %id, "book inserted");
        Ok(id)
    }

    async fn update(&self, book: &Book) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            "UPDATE Books SET Name = ?1, Description = ?2, Author = ?3, Quantity = ?4, \
             PriceCents = ?5 WHERE Id = ?6",
        )
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.author)
        .bind(book.quantity)
        .bind(book.price.cents())
        .bind(book.id.get())
        .execute(&mut *conn)
        .await?;

        tracing::debug!(book_id = %book.id, rows = result.rows_affected(), "book updated");
        Ok(())
    }

    async fn delete_by_id(&self, id: BookId) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM Books WHERE Id = ?1")
            .bind(id.get())
            .execute(&mut *conn)
            .await?;

        tracing::debug!(book_id = %id, rows = result.rows_affected(), "book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_db::Database;
    use catalog_kernel::settings::DatabaseSettings;
    use catalog_kernel::Migration;

    async fn repository() -> (Database, SqliteBookRepository) {
        let db = Database::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        db.run_migrations(&books_migrations()).await.unwrap();
        let repo = SqliteBookRepository::new(db.pool().clone());
        (db, repo)
    }

    fn books_migrations() -> Vec<(String, Migration)> {
        vec![(
            "books".to_string(),
            Migration {
                id: "001_create_books",
                up: CREATE_BOOKS_TABLE,
            },
        )]
    }

    fn orwell() -> NewBook {
        NewBook {
            name: "1984".to_string(),
            description: "dystopian".to_string(),
            author: "Orwell".to_string(),
            quantity: 3,
            price: "15.99".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn list_all_on_empty_table_is_empty() {
        let (_db, repo) = repository().await;
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_returns_generated_ids_in_sequence() {
        let (_db, repo) = repository().await;

        let first = repo.add(&orwell()).await.unwrap();
        let second = repo.add(&orwell()).await.unwrap();

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
    }

    #[tokio::test]
    async fn added_book_reads_back_field_for_field() {
        let (_db, repo) = repository().await;
        let id = repo.add(&orwell()).await.unwrap();

        let book = repo.get_by_id(id).await.unwrap().unwrap();

        assert_eq!(book.id, id);
        assert_eq!(book.name, "1984");
        assert_eq!(book.description, "dystopian");
        assert_eq!(book.author, "Orwell");
        assert_eq!(book.quantity, 3);
        assert_eq!(book.price.to_string(), "15.99");
    }

    #[tokio::test]
    async fn price_survives_storage_exactly() {
        let (db, repo) = repository().await;
        let mut book = orwell();
        book.price = "12.99".parse().unwrap();

        let id = repo.add(&book).await.unwrap();

        let stored: i64 = sqlx::query_scalar("SELECT PriceCents FROM Books WHERE Id = ?1")
            .bind(id.get())
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored, 1299);

        let read = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(read.price.to_string(), "12.99");
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let (_db, repo) = repository().await;
        let id = BookId::new(404).unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let (_db, repo) = repository().await;
        let id = repo.add(&orwell()).await.unwrap();

        let replacement = Book {
            id,
            name: "Animal Farm".to_string(),
            description: "allegory".to_string(),
            author: "George Orwell".to_string(),
            quantity: 9,
            price: Price::from_cents(899),
        };
        repo.update(&replacement).await.unwrap();

        assert_eq!(repo.get_by_id(id).await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_row_are_noops() {
        let (_db, repo) = repository().await;
        let kept = repo.add(&orwell()).await.unwrap();
        let missing = BookId::new(50).unwrap();

        let ghost = Book {
            id: missing,
            name: "Ghost".to_string(),
            description: String::new(),
            author: String::new(),
            quantity: 0,
            price: Price::default(),
        };
        repo.update(&ghost).await.unwrap();
        repo.delete_by_id(missing).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, kept);
    }

    #[tokio::test]
    async fn deleted_book_is_gone() {
        let (_db, repo) = repository().await;
        let id = repo.add(&orwell()).await.unwrap();

        repo.delete_by_id(id).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn null_optional_columns_read_as_defaults() {
        let (db, repo) = repository().await;
        sqlx::query("INSERT INTO Books (Name) VALUES ('Legacy')")
            .execute(db.pool())
            .await
            .unwrap();

        let books = repo.list_all().await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].description, "");
        assert_eq!(books[0].author, "");
        assert_eq!(books[0].quantity, 0);
        assert_eq!(books[0].price, Price::default());
    }

    #[tokio::test]
    async fn missing_table_is_a_persistence_error() {
        let db = Database::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let repo = SqliteBookRepository::new(db.pool().clone());

        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Database(_)));
    }

    #[tokio::test]
    async fn bootstrap_twice_keeps_rows() {
        let (db, repo) = repository().await;
        repo.add(&orwell()).await.unwrap();

        // Both the ledger and the IF NOT EXISTS guard make reruns harmless.
        db.run_migrations(&books_migrations()).await.unwrap();
        sqlx::raw_sql(CREATE_BOOKS_TABLE)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
