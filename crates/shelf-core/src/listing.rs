//! Listing projection — the tabular view of the catalogue.
//!
//! The projector turns stored records into display rows. It is pure and
//! order-preserving: the listing order is whatever enumeration order the
//! store produced.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::book::Book;

// ─── Routes ──────────────────────────────────────────────────────────────────

/// A named route understood by the host router.
///
/// The core supplies the route name and the record id; URL template
/// construction is the host's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
  Canonical { book_id: Uuid },
  AddForm,
  EditForm { book_id: Uuid },
  DeleteForm { book_id: Uuid },
  Collection,
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One listing row: identifier, display label, and the canonical link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
  pub id:   Uuid,
  pub name: String,
  pub link: Route,
}

/// Project records into listing rows, preserving input order.
pub fn project(books: &[Book]) -> Vec<Row> {
  books
    .iter()
    .map(|book| Row {
      id:   book.book_id(),
      name: book.name().to_owned(),
      link: Route::Canonical { book_id: book.book_id() },
    })
    .collect()
}
