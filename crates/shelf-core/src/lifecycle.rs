//! The lifecycle controller — create, update and delete workflows over a
//! [`BookStore`].
//!
//! Each operation runs a single validate-then-commit pass: the draft is
//! checked against the book schema as a batch (every field error is
//! collected, not just the first), defaults are merged, and exactly one
//! store call performs the commit. Nothing is retried and no lock is
//! held across calls.
//!
//! Access control has already happened by the time a method here is
//! invoked; the controller trusts its caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  book::NewBook,
  error::{Error, Result},
  listing::Route,
  schema::{self, Draft},
  store::BookStore,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What a lifecycle operation did.
///
/// Tags map one-to-one onto the status messages the host surfaces after
/// a commit; validation and storage failures are reported through
/// [`Error`] instead, so an `Outcome` always describes a committed
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Created { book_id: Uuid, label: String },
  Updated { book_id: Uuid, label: String },
  Deleted { label: String },
}

impl Outcome {
  /// The user-facing status message for this outcome.
  pub fn message(&self) -> String {
    match self {
      Outcome::Created { label, .. } => format!("Created the {label} Book."),
      Outcome::Updated { label, .. } => format!("Saved the {label} Book."),
      Outcome::Deleted { label } => {
        format!("The {label} Book has been deleted.")
      }
    }
  }

  /// Where the host should navigate after the commit: the record's
  /// canonical page after create/update, the collection after delete.
  pub fn redirect(&self) -> Route {
    match self {
      Outcome::Created { book_id, .. } | Outcome::Updated { book_id, .. } => {
        Route::Canonical { book_id: *book_id }
      }
      Outcome::Deleted { .. } => Route::Collection,
    }
  }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// Orchestrates book workflows over a storage backend.
#[derive(Debug, Clone)]
pub struct Catalogue<S> {
  store: S,
}

impl<S: BookStore> Catalogue<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Borrow the underlying store, e.g. to enumerate records for listing.
  pub fn store(&self) -> &S {
    &self.store
  }

  /// Create a book from `draft`, acting as `acting_user`.
  ///
  /// Merges defaults — the acting user becomes the owner unless the
  /// draft names one, `published` defaults to true, and both timestamps
  /// are set to the same instant — then validates the full schema and
  /// commits. On validation failure nothing is persisted and the error
  /// carries every rejected field.
  pub async fn create(&self, draft: Draft, acting_user: &str) -> Result<Outcome> {
    let draft = if draft.contains(schema::OWNER) {
      draft
    } else {
      draft.reference(schema::OWNER, acting_user)
    };

    let fields = match schema::validate_full(schema::book_fields(), &draft) {
      Ok(normalized) => normalized,
      Err(errors) => {
        debug!(errors = errors.len(), "book draft rejected");
        return Err(Error::Validation(errors));
      }
    };

    let book = self
      .store
      .create(NewBook::from_validated(&fields, Utc::now()))
      .await?;
    info!(book_id = %book.book_id(), "created book");

    Ok(Outcome::Created {
      book_id: book.book_id(),
      label:   book.name().to_owned(),
    })
  }

  /// Apply a partial update to an existing book.
  ///
  /// Only fields present in `draft` are validated and overwritten;
  /// everything else keeps its stored value. The changed timestamp is
  /// refreshed on every successful update.
  pub async fn update(&self, id: Uuid, draft: Draft) -> Result<Outcome> {
    let mut book = self.store.load(id).await?.ok_or(Error::NotFound(id))?;

    let fields = match schema::validate_partial(schema::book_fields(), &draft)
    {
      Ok(normalized) => normalized,
      Err(errors) => {
        debug!(book_id = %id, errors = errors.len(), "book patch rejected");
        return Err(Error::Validation(errors));
      }
    };

    book.apply(&fields);
    book.set_changed_at(Utc::now());
    self.store.update(&book).await?;
    info!(book_id = %id, "updated book");

    Ok(Outcome::Updated { book_id: id, label: book.name().to_owned() })
  }

  /// Hard-delete a book. A second delete of the same id fails with
  /// [`Error::NotFound`] rather than silently succeeding.
  pub async fn delete(&self, id: Uuid) -> Result<Outcome> {
    let book = self.store.delete(id).await?;
    info!(book_id = %id, "deleted book");

    Ok(Outcome::Deleted { label: book.name().to_owned() })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::{
    book::Book,
    schema::{FieldErrorKind, FieldValue},
    store::StoreError,
  };

  // ── In-memory store double ────────────────────────────────────────────

  /// Insertion-ordered in-memory backend; `unavailable` makes every call
  /// fail the way a down database would.
  #[derive(Clone, Default)]
  struct MemStore {
    books:       Arc<Mutex<Vec<Book>>>,
    unavailable: bool,
  }

  impl MemStore {
    fn check(&self) -> Result<(), StoreError> {
      if self.unavailable {
        Err(StoreError::Unavailable("connection refused".into()))
      } else {
        Ok(())
      }
    }

    fn all(&self) -> Vec<Book> {
      self.books.lock().unwrap().clone()
    }
  }

  impl BookStore for MemStore {
    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
      self.check()?;
      let book = Book::from_parts(Uuid::new_v4(), book);
      self.books.lock().unwrap().push(book.clone());
      Ok(book)
    }

    async fn load(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
      self.check()?;
      Ok(self.all().into_iter().find(|b| b.book_id() == id))
    }

    async fn update(&self, book: &Book) -> Result<(), StoreError> {
      self.check()?;
      let mut books = self.books.lock().unwrap();
      let slot = books
        .iter_mut()
        .find(|b| b.book_id() == book.book_id())
        .ok_or(StoreError::NotFound(book.book_id()))?;
      *slot = book.clone();
      Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Book, StoreError> {
      self.check()?;
      let mut books = self.books.lock().unwrap();
      let index = books
        .iter()
        .position(|b| b.book_id() == id)
        .ok_or(StoreError::NotFound(id))?;
      Ok(books.remove(index))
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
      self.check()?;
      Ok(self.all())
    }
  }

  fn catalogue() -> Catalogue<MemStore> {
    Catalogue::new(MemStore::default())
  }

  fn dune_draft() -> Draft {
    Draft::new()
      .text(schema::NAME, "Dune")
      .text(schema::ISBN, "9780441013593")
      .integer(schema::YEAR, 1965)
      .reference(schema::PUBLISHER, "pub1")
      .reference(schema::AUTHOR, "auth1")
  }

  async fn created_id(c: &Catalogue<MemStore>, draft: Draft) -> Uuid {
    match c.create(draft, "u1").await.unwrap() {
      Outcome::Created { book_id, .. } => book_id,
      other => panic!("expected Created, got {other:?}"),
    }
  }

  // ── Create ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_merges_owner_and_publish_defaults() {
    let c = catalogue();
    let id = created_id(&c, dune_draft()).await;

    let book = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(book.name(), "Dune");
    assert_eq!(book.owner_id(), "u1");
    assert!(book.is_published());
    assert_eq!(book.created_at(), book.changed_at());
  }

  #[tokio::test]
  async fn create_keeps_an_explicit_owner() {
    let c = catalogue();
    let draft = dune_draft().reference(schema::OWNER, "u2");
    let id = created_id(&c, draft).await;

    let book = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(book.owner_id(), "u2");
  }

  #[tokio::test]
  async fn create_missing_year_persists_nothing() {
    let c = catalogue();
    let draft = Draft::new()
      .text(schema::NAME, "Dune")
      .text(schema::ISBN, "9780441013593")
      .reference(schema::PUBLISHER, "pub1")
      .reference(schema::AUTHOR, "auth1");

    let err = c.create(draft, "u1").await.unwrap_err();
    match err {
      Error::Validation(errors) => {
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, schema::YEAR);
        assert_eq!(errors[0].kind, FieldErrorKind::Missing);
      }
      other => panic!("expected Validation, got {other:?}"),
    }

    assert!(c.store().list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn create_reports_every_invalid_field_at_once() {
    let c = catalogue();
    let draft = Draft::new()
      .text(schema::YEAR, "someday")
      .reference(schema::AUTHOR, "auth1");

    let err = c.create(draft, "u1").await.unwrap_err();
    let Error::Validation(errors) = err else {
      panic!("expected Validation");
    };

    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![
      schema::NAME,
      schema::ISBN,
      schema::YEAR,
      schema::PUBLISHER,
    ]);
  }

  #[tokio::test]
  async fn create_rejects_an_overlong_name() {
    let c = catalogue();
    let draft = dune_draft().text(schema::NAME, "x".repeat(256));

    let Error::Validation(errors) = c.create(draft, "u1").await.unwrap_err()
    else {
      panic!("expected Validation");
    };
    assert_eq!(errors[0].field, schema::NAME);
    assert_eq!(errors[0].kind, FieldErrorKind::TooLong { max: 255 });
  }

  #[tokio::test]
  async fn create_accepts_year_submitted_as_text() {
    let c = catalogue();
    let draft = dune_draft().text(schema::YEAR, "1965");
    let id = created_id(&c, draft).await;

    let book = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(book.year(), 1965);
  }

  // ── Update ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_patches_only_named_fields() {
    let c = catalogue();
    let id = created_id(&c, dune_draft()).await;
    let before = c.store().load(id).await.unwrap().unwrap();

    let outcome = c
      .update(id, Draft::new().text(schema::NAME, "Dune Messiah"))
      .await
      .unwrap();
    assert_eq!(outcome, Outcome::Updated {
      book_id: id,
      label:   "Dune Messiah".into(),
    });

    let after = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(after.name(), "Dune Messiah");
    assert_eq!(after.isbn(), before.isbn());
    assert_eq!(after.year(), before.year());
    assert_eq!(after.owner_id(), before.owner_id());
    assert_eq!(after.created_at(), before.created_at());
    assert!(after.changed_at() >= before.changed_at());
  }

  #[tokio::test]
  async fn update_unknown_id_is_not_found() {
    let c = catalogue();
    let id = Uuid::new_v4();

    let err = c
      .update(id, Draft::new().text(schema::NAME, "X"))
      .await
      .unwrap_err();
    match err {
      Error::NotFound(missing) => assert_eq!(missing, id),
      other => panic!("expected NotFound, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn update_rejects_invalid_patch_and_keeps_the_record() {
    let c = catalogue();
    let id = created_id(&c, dune_draft()).await;

    let err = c
      .update(id, Draft::new().text(schema::YEAR, "later"))
      .await
      .unwrap_err();
    let Error::Validation(errors) = err else { panic!("expected Validation") };
    assert_eq!(errors[0].kind, FieldErrorKind::NotInteger);

    let book = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(book.year(), 1965);
  }

  #[tokio::test]
  async fn update_can_unpublish() {
    let c = catalogue();
    let id = created_id(&c, dune_draft()).await;

    c.update(id, Draft::new().boolean(schema::PUBLISHED, false))
      .await
      .unwrap();

    let book = c.store().load(id).await.unwrap().unwrap();
    assert!(!book.is_published());
  }

  // ── Delete ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_then_second_delete_is_not_found() {
    let c = catalogue();
    let id = created_id(&c, dune_draft()).await;

    let outcome = c.delete(id).await.unwrap();
    assert_eq!(outcome, Outcome::Deleted { label: "Dune".into() });
    assert!(c.store().load(id).await.unwrap().is_none());

    let err = c.delete(id).await.unwrap_err();
    match err {
      Error::NotFound(missing) => assert_eq!(missing, id),
      other => panic!("expected NotFound, got {other:?}"),
    }
  }

  // ── Storage failures ──────────────────────────────────────────────────

  #[tokio::test]
  async fn unavailable_store_surfaces_without_retry() {
    let c = Catalogue::new(MemStore {
      unavailable: true,
      ..MemStore::default()
    });

    let err = c.create(dune_draft(), "u1").await.unwrap_err();
    match err {
      Error::Unavailable(msg) => assert_eq!(msg, "connection refused"),
      other => panic!("expected Unavailable, got {other:?}"),
    }
  }

  // ── Outcomes ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn outcome_messages_and_redirects_match_host_copy() {
    let c = catalogue();

    let created = c.create(dune_draft(), "u1").await.unwrap();
    assert_eq!(created.message(), "Created the Dune Book.");
    let Outcome::Created { book_id, .. } = created.clone() else {
      panic!("expected Created");
    };
    assert_eq!(created.redirect(), Route::Canonical { book_id });

    let updated = c
      .update(book_id, Draft::new().text(schema::NAME, "Dune Messiah"))
      .await
      .unwrap();
    assert_eq!(updated.message(), "Saved the Dune Messiah Book.");
    assert_eq!(updated.redirect(), Route::Canonical { book_id });

    let deleted = c.delete(book_id).await.unwrap();
    assert_eq!(deleted.message(), "The Dune Messiah Book has been deleted.");
    assert_eq!(deleted.redirect(), Route::Collection);
  }

  #[tokio::test]
  async fn validated_references_normalize_textual_ids() {
    let c = catalogue();
    let draft = Draft::new()
      .text(schema::NAME, "Dune")
      .text(schema::ISBN, "9780441013593")
      .integer(schema::YEAR, 1965)
      .text(schema::PUBLISHER, "pub1")
      .text(schema::AUTHOR, "auth1");
    let id = created_id(&c, draft).await;

    let book = c.store().load(id).await.unwrap().unwrap();
    assert_eq!(book.publisher_id(), "pub1");
    assert_eq!(
      book.field(schema::AUTHOR),
      Some(FieldValue::Reference("auth1".into()))
    );
  }
}
