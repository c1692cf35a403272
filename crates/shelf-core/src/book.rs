//! The Book record — a catalogued title and its ownership metadata.
//!
//! Records are assembled by the lifecycle controller after a draft has
//! passed schema validation, or rehydrated by a store backend from rows
//! that were validated when written. There is no public field-by-field
//! constructor, so every observable record went through one validation
//! pass — setters do not re-validate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{self, Draft, FieldValue};

// ─── User handles ────────────────────────────────────────────────────────────

/// A user resolved by the host platform's account system.
///
/// The record stores only the identifier; the handle form is accepted as
/// a convenience and normalised on assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
  pub user_id:      String,
  pub display_name: Option<String>,
}

impl UserHandle {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self { user_id: user_id.into(), display_name: None }
  }
}

// ─── NewBook ─────────────────────────────────────────────────────────────────

/// A validated book awaiting its store-assigned identifier.
///
/// Input to [`crate::store::BookStore::create`]. Produced by the
/// lifecycle controller from a draft that passed full-schema validation;
/// store backends consume the fields verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
  pub name:         String,
  pub isbn:         String,
  pub year:         i64,
  pub series:       Option<String>,
  pub publisher_id: String,
  pub author_id:    String,
  pub cover:        Option<String>,
  pub owner_id:     String,
  pub published:    bool,
  pub created_at:   DateTime<Utc>,
  pub changed_at:   DateTime<Utc>,
}

impl NewBook {
  /// Assemble from a draft that has passed [`schema::validate_full`].
  ///
  /// Reads are non-panicking: required fields are guaranteed present by
  /// the validation pass, absent optionals fall back to their documented
  /// defaults. Both timestamps are set to `now`, so a fresh record has
  /// `created_at == changed_at`.
  pub(crate) fn from_validated(fields: &Draft, now: DateTime<Utc>) -> Self {
    Self {
      name:         fields.text_value(schema::NAME).unwrap_or_default().to_owned(),
      isbn:         fields.text_value(schema::ISBN).unwrap_or_default().to_owned(),
      year:         fields.integer_value(schema::YEAR).unwrap_or_default(),
      series:       fields
        .text_value(schema::SERIES)
        .filter(|s| !s.is_empty())
        .map(str::to_owned),
      publisher_id: fields
        .reference_value(schema::PUBLISHER)
        .unwrap_or_default()
        .to_owned(),
      author_id:    fields
        .reference_value(schema::AUTHOR)
        .unwrap_or_default()
        .to_owned(),
      cover:        fields.image_value(schema::COVER).map(str::to_owned),
      owner_id:     fields
        .reference_value(schema::OWNER)
        .unwrap_or_default()
        .to_owned(),
      published:    fields.boolean_value(schema::PUBLISHED).unwrap_or(true),
      created_at:   now,
      changed_at:   now,
    }
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// A catalogued book.
///
/// Publisher, author, owner and cover are weak references — the record
/// holds foreign identifiers only, and deleting a book never cascades
/// into the referenced entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  book_id:      Uuid,
  name:         String,
  isbn:         String,
  year:         i64,
  series:       Option<String>,
  publisher_id: String,
  author_id:    String,
  cover:        Option<String>,
  owner_id:     String,
  published:    bool,
  created_at:   DateTime<Utc>,
  changed_at:   DateTime<Utc>,
}

impl Book {
  /// Storage-layer assembly: joins a store-assigned id with validated
  /// parts. Invariants were enforced when the parts were produced.
  pub fn from_parts(book_id: Uuid, parts: NewBook) -> Self {
    Self {
      book_id,
      name: parts.name,
      isbn: parts.isbn,
      year: parts.year,
      series: parts.series,
      publisher_id: parts.publisher_id,
      author_id: parts.author_id,
      cover: parts.cover,
      owner_id: parts.owner_id,
      published: parts.published,
      created_at: parts.created_at,
      changed_at: parts.changed_at,
    }
  }

  /// The store-assigned identifier; immutable for the record's lifetime.
  pub fn book_id(&self) -> Uuid {
    self.book_id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }

  pub fn isbn(&self) -> &str {
    &self.isbn
  }

  pub fn set_isbn(&mut self, isbn: impl Into<String>) {
    self.isbn = isbn.into();
  }

  pub fn year(&self) -> i64 {
    self.year
  }

  pub fn set_year(&mut self, year: i64) {
    self.year = year;
  }

  pub fn series(&self) -> Option<&str> {
    self.series.as_deref()
  }

  pub fn set_series(&mut self, series: Option<String>) {
    self.series = series;
  }

  pub fn publisher_id(&self) -> &str {
    &self.publisher_id
  }

  pub fn set_publisher_id(&mut self, id: impl Into<String>) {
    self.publisher_id = id.into();
  }

  pub fn author_id(&self) -> &str {
    &self.author_id
  }

  pub fn set_author_id(&mut self, id: impl Into<String>) {
    self.author_id = id.into();
  }

  pub fn cover(&self) -> Option<&str> {
    self.cover.as_deref()
  }

  pub fn set_cover(&mut self, cover: Option<String>) {
    self.cover = cover;
  }

  pub fn owner_id(&self) -> &str {
    &self.owner_id
  }

  pub fn set_owner_id(&mut self, id: impl Into<String>) {
    self.owner_id = id.into();
  }

  /// Assign ownership from a resolved handle; stores the identifier.
  pub fn set_owner(&mut self, owner: &UserHandle) {
    self.owner_id = owner.user_id.clone();
  }

  pub fn is_published(&self) -> bool {
    self.published
  }

  pub fn set_published(&mut self, published: bool) {
    self.published = published;
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn set_created_at(&mut self, at: DateTime<Utc>) {
    self.created_at = at;
  }

  pub fn changed_at(&self) -> DateTime<Utc> {
    self.changed_at
  }

  pub fn set_changed_at(&mut self, at: DateTime<Utc>) {
    self.changed_at = at;
  }

  /// Dynamic lookup by schema name. Returns `None` for unset optional
  /// fields and for names the schema does not declare.
  pub fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      schema::NAME => Some(FieldValue::Text(self.name.clone())),
      schema::ISBN => Some(FieldValue::Text(self.isbn.clone())),
      schema::YEAR => Some(FieldValue::Integer(self.year)),
      schema::SERIES => self.series.clone().map(FieldValue::Text),
      schema::PUBLISHER => {
        Some(FieldValue::Reference(self.publisher_id.clone()))
      }
      schema::AUTHOR => Some(FieldValue::Reference(self.author_id.clone())),
      schema::COVER => self.cover.clone().map(FieldValue::Image),
      schema::OWNER => Some(FieldValue::Reference(self.owner_id.clone())),
      schema::PUBLISHED => Some(FieldValue::Boolean(self.published)),
      schema::CREATED => Some(FieldValue::Timestamp(self.created_at)),
      schema::CHANGED => Some(FieldValue::Timestamp(self.changed_at)),
      _ => None,
    }
  }

  /// Patch the record from a normalised partial draft. Only fields the
  /// draft mentions are overwritten; `created`/`changed` are system
  /// fields and are never taken from a draft. An optional field recorded
  /// as empty text by [`schema::validate_partial`] is cleared.
  pub(crate) fn apply(&mut self, fields: &Draft) {
    if let Some(v) = fields.text_value(schema::NAME) {
      if !v.is_empty() {
        self.name = v.to_owned();
      }
    }
    if let Some(v) = fields.text_value(schema::ISBN) {
      if !v.is_empty() {
        self.isbn = v.to_owned();
      }
    }
    if let Some(v) = fields.integer_value(schema::YEAR) {
      self.year = v;
    }
    if fields.contains(schema::SERIES) {
      self.series = fields
        .text_value(schema::SERIES)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    }
    if let Some(v) = fields.reference_value(schema::PUBLISHER) {
      self.publisher_id = v.to_owned();
    }
    if let Some(v) = fields.reference_value(schema::AUTHOR) {
      self.author_id = v.to_owned();
    }
    if fields.contains(schema::COVER) {
      if let Some(v) = fields.image_value(schema::COVER) {
        self.cover = Some(v.to_owned());
      } else {
        self.cover = None;
      }
    }
    if let Some(v) = fields.reference_value(schema::OWNER) {
      self.owner_id = v.to_owned();
    }
    if let Some(v) = fields.boolean_value(schema::PUBLISHED) {
      self.published = v;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dune_parts(now: DateTime<Utc>) -> NewBook {
    NewBook {
      name:         "Dune".into(),
      isbn:         "9780441013593".into(),
      year:         1965,
      series:       Some("Dune Chronicles".into()),
      publisher_id: "pub1".into(),
      author_id:    "auth1".into(),
      cover:        None,
      owner_id:     "u1".into(),
      published:    true,
      created_at:   now,
      changed_at:   now,
    }
  }

  #[test]
  fn from_parts_exposes_every_accessor() {
    let now = Utc::now();
    let book = Book::from_parts(Uuid::new_v4(), dune_parts(now));

    assert_eq!(book.name(), "Dune");
    assert_eq!(book.isbn(), "9780441013593");
    assert_eq!(book.year(), 1965);
    assert_eq!(book.series(), Some("Dune Chronicles"));
    assert_eq!(book.publisher_id(), "pub1");
    assert_eq!(book.author_id(), "auth1");
    assert_eq!(book.cover(), None);
    assert_eq!(book.owner_id(), "u1");
    assert!(book.is_published());
    assert_eq!(book.created_at(), now);
    assert_eq!(book.changed_at(), now);
  }

  #[test]
  fn owner_setters_normalize_to_the_identifier() {
    let mut book = Book::from_parts(Uuid::new_v4(), dune_parts(Utc::now()));

    book.set_owner_id("u2");
    assert_eq!(book.owner_id(), "u2");

    let handle = UserHandle {
      user_id:      "u3".into(),
      display_name: Some("Paul".into()),
    };
    book.set_owner(&handle);
    assert_eq!(book.owner_id(), "u3");

    book.set_owner(&UserHandle::new("u4"));
    assert_eq!(book.owner_id(), "u4");
  }

  #[test]
  fn field_lookup_matches_accessors() {
    let now = Utc::now();
    let book = Book::from_parts(Uuid::new_v4(), dune_parts(now));

    assert_eq!(book.field(schema::NAME), Some(FieldValue::Text("Dune".into())));
    assert_eq!(book.field(schema::YEAR), Some(FieldValue::Integer(1965)));
    assert_eq!(
      book.field(schema::PUBLISHER),
      Some(FieldValue::Reference("pub1".into()))
    );
    assert_eq!(book.field(schema::COVER), None);
    assert_eq!(
      book.field(schema::CREATED),
      Some(FieldValue::Timestamp(now))
    );
    assert_eq!(book.field("langcode"), None);
  }

  #[test]
  fn apply_patches_only_mentioned_fields() {
    let mut book = Book::from_parts(Uuid::new_v4(), dune_parts(Utc::now()));

    let patch = Draft::new()
      .text(schema::NAME, "Dune Messiah")
      .integer(schema::YEAR, 1969);
    book.apply(&patch);

    assert_eq!(book.name(), "Dune Messiah");
    assert_eq!(book.year(), 1969);
    assert_eq!(book.isbn(), "9780441013593");
    assert_eq!(book.series(), Some("Dune Chronicles"));
    assert_eq!(book.owner_id(), "u1");
  }

  #[test]
  fn apply_clears_optional_fields_submitted_empty() {
    let mut book = Book::from_parts(Uuid::new_v4(), dune_parts(Utc::now()));

    let patch = Draft::new().text(schema::SERIES, "");
    book.apply(&patch);
    assert_eq!(book.series(), None);
  }
}
