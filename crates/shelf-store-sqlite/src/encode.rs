//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; UUIDs as hyphenated
//! lowercase strings. Reference columns are opaque host-owned ids and
//! pass through untouched.

use chrono::{DateTime, Utc};
use shelf_core::book::{Book, NewBook};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `books` row.
pub struct RawBook {
  pub book_id:    String,
  pub name:       String,
  pub isbn:       String,
  pub year:       i64,
  pub series:     Option<String>,
  pub publisher:  String,
  pub author:     String,
  pub cover:      Option<String>,
  pub owner:      String,
  pub published:  bool,
  pub created_at: String,
  pub changed_at: String,
}

impl RawBook {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:    row.get(0)?,
      name:       row.get(1)?,
      isbn:       row.get(2)?,
      year:       row.get(3)?,
      series:     row.get(4)?,
      publisher:  row.get(5)?,
      author:     row.get(6)?,
      cover:      row.get(7)?,
      owner:      row.get(8)?,
      published:  row.get(9)?,
      created_at: row.get(10)?,
      changed_at: row.get(11)?,
    })
  }

  pub fn into_book(self) -> Result<Book> {
    let book_id = decode_uuid(&self.book_id)?;
    let created_at = decode_dt(&self.created_at)?;
    let changed_at = decode_dt(&self.changed_at)?;

    Ok(Book::from_parts(book_id, NewBook {
      name: self.name,
      isbn: self.isbn,
      year: self.year,
      series: self.series,
      publisher_id: self.publisher,
      author_id: self.author,
      cover: self.cover,
      owner_id: self.owner,
      published: self.published,
      created_at,
      changed_at,
    }))
  }
}

/// The column list matching [`RawBook::from_row`]'s indices.
pub const BOOK_COLUMNS: &str = "book_id, name, isbn, year, series, \
                                publisher, author, cover, owner, \
                                published, created_at, changed_at";
