//! Error types for `shelf-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{schema::FieldError, store::StoreError};

#[derive(Debug, Error)]
pub enum Error {
  /// One or more fields failed validation. Always carries the complete
  /// batch so the caller can show every problem at once and keep the
  /// submitted values on screen.
  #[error("validation failed: {}", join(.0))]
  Validation(Vec<FieldError>),

  #[error("book not found: {0}")]
  NotFound(Uuid),

  /// The backing store could not be reached. Transient; whether to retry
  /// is the caller's decision.
  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

impl From<StoreError> for Error {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::NotFound(id) => Error::NotFound(id),
      StoreError::Unavailable(msg) => Error::Unavailable(msg),
    }
  }
}

fn join(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
