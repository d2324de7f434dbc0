use std::sync::Arc;

use async_trait::async_trait;

use super::error::BookError;
use super::repository::BookRepository;

// --- Core traits for the book bus ---

/// An operation that changes stored books.
pub trait Command: Send + Sync {
    /// Operation name used in logs.
    const NAME: &'static str;
    type Output: Send;
}

/// Executes one kind of command against the repository it is handed.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C, repository: &dyn BookRepository)
        -> Result<C::Output, BookError>;
}

/// An operation that only reads stored books.
pub trait Query: Send + Sync {
    const NAME: &'static str;
    type Output: Send;
}

#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q, repository: &dyn BookRepository)
        -> Result<Q::Output, BookError>;
}

/// Routes operations to their handlers.
///
/// Holds no business logic; it only pairs an operation with the shared
/// repository and records the outcome.
#[derive(Clone)]
pub struct BookBus {
    repository: Arc<dyn BookRepository>,
}

impl BookBus {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute<C, H>(&self, command: C, handler: H) -> Result<C::Output, BookError>
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let result = handler.handle(command, self.repository.as_ref()).await;
        log_outcome(C::NAME, &result);
        result
    }

    pub async fn query<Q, H>(&self, query: Q, handler: H) -> Result<Q::Output, BookError>
    where
        Q: Query,
        H: QueryHandler<Q>,
    {
        let result = handler.handle(query, self.repository.as_ref()).await;
        log_outcome(Q::NAME, &result);
        result
    }
}

fn log_outcome<T>(operation: &'static str, result: &Result<T, BookError>) {
    match result {
        Ok(_) => tracing::debug!(operation, "book operation completed"),
        Err(BookError::Persistence(e)) => {
            tracing::error!(operation, error = %e, "book operation failed")
        }
        Err(e) => tracing::debug!(operation, error = %e, "book operation rejected"),
    }
}
