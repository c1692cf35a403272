//! Error type for `shelf-store-sqlite`.

use shelf_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Load, update or delete targeted a row that does not exist.
  #[error("book not found: {0}")]
  BookNotFound(uuid::Uuid),
}

/// Collapse backend errors into the failure surface the core
/// understands: missing rows stay `NotFound`, everything else is a
/// storage availability problem the caller may retry.
impl From<Error> for StoreError {
  fn from(e: Error) -> Self {
    match e {
      Error::BookNotFound(id) => StoreError::NotFound(id),
      other => StoreError::Unavailable(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
