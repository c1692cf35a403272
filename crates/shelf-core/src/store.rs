//! The `BookStore` trait — the persistence contract the lifecycle
//! controller commits through.
//!
//! The trait is implemented by storage backends (e.g.
//! `shelf-store-sqlite`). The controller depends on this abstraction,
//! not on any concrete backend, and issues exactly one store call per
//! operation.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::book::{Book, NewBook};

// ─── Failure surface ─────────────────────────────────────────────────────────

/// A storage failure as the core understands it.
///
/// `NotFound` is terminal and user-facing. `Unavailable` is transient;
/// the core never retries internally — whether to retry is the caller's
/// decision.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("book not found: {0}")]
  NotFound(Uuid),

  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Shelf storage backend.
///
/// One record per book, keyed by id. Whatever concurrency discipline the
/// backend applies (locking, transaction isolation) is its own business;
/// the core holds no lock across calls, so concurrent writers racing on
/// the same id observe last-write-wins or `NotFound`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait BookStore: Send + Sync {
  /// Persist a new record. The store assigns the id; everything else is
  /// taken from `book` verbatim.
  fn create(
    &self,
    book: NewBook,
  ) -> impl Future<Output = Result<Book, StoreError>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn load(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, StoreError>> + Send + '_;

  /// Replace the stored record whose id is `book.book_id()`.
  ///
  /// Fails with [`StoreError::NotFound`] if no such row exists.
  fn update<'a>(
    &'a self,
    book: &'a Book,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Hard-delete a record, returning it. Deleting an id that is already
  /// gone fails with [`StoreError::NotFound`] — repeat deletes are an
  /// error, not a silent no-op.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Book, StoreError>> + Send + '_;

  /// Enumerate all records in insertion order.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send + '_;
}
