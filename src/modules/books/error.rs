use thiserror::Error;

use catalog_http::AppError;

use super::models::FieldViolation;

/// Backend failure while talking to the book store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored book {id} is invalid: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Failures surfaced by book operations.
///
/// A missing book is not an error here; queries return `None` for it.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("invalid book id '{0}'")]
    InvalidId(String),

    #[error("invalid book: {}", describe(.0))]
    Validation(Vec<FieldViolation>),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl BookError {
    pub(crate) fn from_violations(violations: Vec<FieldViolation>) -> Result<(), BookError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BookError::Validation(violations))
        }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.error))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidId(_) => AppError::bad_request("Invalid book ID."),
            BookError::Validation(violations) => {
                let message = format!("invalid book: {}", describe(&violations));
                let details = violations
                    .iter()
                    .map(|v| serde_json::json!({ "field": v.field, "error": v.error }))
                    .collect();
                AppError::validation(details, message)
            }
            BookError::Persistence(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn invalid_id_maps_to_bad_request() {
        let app: AppError = BookError::InvalidId("-1".to_string()).into();
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_maps_to_unprocessable_with_details() {
        let err = BookError::Validation(vec![FieldViolation {
            field: "name",
            error: "must not be blank",
        }]);
        assert_eq!(err.to_string(), "invalid book: name must not be blank");

        match AppError::from(err) {
            AppError::Validation { details, .. } => {
                assert_eq!(details[0]["field"], "name");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn persistence_maps_to_internal() {
        let err = BookError::from(PersistenceError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(AppError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
