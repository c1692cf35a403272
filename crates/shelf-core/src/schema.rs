//! Field schema — the named, typed, constrained attributes of a book.
//!
//! The schema is declared once (see [`book_fields`]) and consulted by the
//! lifecycle controller before every commit. Validation is pure: a field
//! definition checks one submitted value at a time, reports a structured
//! error, and never touches storage. Batch drivers ([`validate_full`],
//! [`validate_partial`]) collect every failure instead of stopping at the
//! first one, so a caller fixing a form sees all problems at once.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Field names ─────────────────────────────────────────────────────────────

pub const NAME: &str = "name";
pub const ISBN: &str = "isbn";
pub const YEAR: &str = "year";
pub const SERIES: &str = "series";
pub const PUBLISHER: &str = "publisher";
pub const AUTHOR: &str = "author";
pub const COVER: &str = "cover";
pub const OWNER: &str = "owner";
pub const PUBLISHED: &str = "published";
pub const CREATED: &str = "created";
pub const CHANGED: &str = "changed";

// ─── Kinds and values ────────────────────────────────────────────────────────

/// The type of a field — determines what shape its value takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
  ShortText,
  LongText,
  Integer,
  Boolean,
  EntityReference,
  Image,
  Timestamp,
}

/// A single submitted or stored field value.
///
/// Form submissions arrive loosely typed; validation normalises them
/// (textual integers are parsed, reference ids submitted as text become
/// [`FieldValue::Reference`], and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
  Text(String),
  Integer(i64),
  Boolean(bool),
  /// The identifier of another entity (publisher, author, user). The
  /// referenced entity is not verified to exist — reference resolution
  /// belongs to the host platform and may fail at read time.
  Reference(String),
  /// A stored file reference returned by the host's upload handling.
  Image(String),
  Timestamp(DateTime<Utc>),
}

// ─── Validation errors ───────────────────────────────────────────────────────

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
  #[error("value is required")]
  Missing,

  #[error("value exceeds {max} characters")]
  TooLong { max: usize },

  #[error("value is not a whole number")]
  NotInteger,

  #[error("reference is required")]
  MissingReference,
}

/// A rejected field, keyed by its schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
  pub field: &'static str,
  pub kind:  FieldErrorKind,
}

// ─── Field definitions ───────────────────────────────────────────────────────

/// The complete definition of a single named attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
  pub name:             &'static str,
  pub kind:             FieldKind,
  pub required:         bool,
  /// Character cap for text fields.
  pub max_length:       Option<usize>,
  /// For [`FieldKind::EntityReference`] fields, the entity type the
  /// value points at.
  pub reference_target: Option<&'static str>,
  /// Static default injected when a full validation pass finds the
  /// field absent.
  pub default:          Option<FieldValue>,
}

impl FieldDef {
  pub fn new(name: &'static str, kind: FieldKind) -> Self {
    Self {
      name,
      kind,
      required: false,
      max_length: None,
      reference_target: None,
      default: None,
    }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn max_length(mut self, max: usize) -> Self {
    self.max_length = Some(max);
    self
  }

  pub fn targets(mut self, entity: &'static str) -> Self {
    self.reference_target = Some(entity);
    self
  }

  pub fn default_value(mut self, value: FieldValue) -> Self {
    self.default = Some(value);
    self
  }

  /// Validate one submitted value against this definition.
  ///
  /// Returns the normalised value. Empty text counts as absent for the
  /// required check; on optional text fields it passes through so an
  /// update can clear the stored value. A value of the wrong shape is
  /// treated as absent, except for integers, where unparseable input is
  /// reported as [`FieldErrorKind::NotInteger`].
  pub fn validate(
    &self,
    value: Option<&FieldValue>,
  ) -> Result<Option<FieldValue>, FieldErrorKind> {
    let normalized = match value {
      None => None,
      Some(v) => self.normalize(v)?,
    };

    match (normalized, self.required, self.kind) {
      (Some(v), _, _) => Ok(Some(v)),
      (None, false, _) => Ok(None),
      (None, true, FieldKind::EntityReference) => {
        Err(FieldErrorKind::MissingReference)
      }
      (None, true, _) => Err(FieldErrorKind::Missing),
    }
  }

  /// Coerce `value` into the shape this field stores, or decide it is
  /// effectively absent.
  fn normalize(
    &self,
    value: &FieldValue,
  ) -> Result<Option<FieldValue>, FieldErrorKind> {
    match self.kind {
      FieldKind::ShortText | FieldKind::LongText => match value {
        FieldValue::Text(s) if s.is_empty() && self.required => Ok(None),
        FieldValue::Text(s) => {
          if let Some(max) = self.max_length {
            if s.chars().count() > max {
              return Err(FieldErrorKind::TooLong { max });
            }
          }
          Ok(Some(FieldValue::Text(s.clone())))
        }
        _ => Ok(None),
      },

      FieldKind::Integer => match value {
        FieldValue::Integer(i) => Ok(Some(FieldValue::Integer(*i))),
        // Form values arrive as text; a whole number in decimal notation
        // is accepted, anything else is not an integer.
        FieldValue::Text(s) if s.is_empty() => Ok(None),
        FieldValue::Text(s) => s
          .trim()
          .parse::<i64>()
          .map(|i| Some(FieldValue::Integer(i)))
          .map_err(|_| FieldErrorKind::NotInteger),
        _ => Err(FieldErrorKind::NotInteger),
      },

      FieldKind::Boolean => match value {
        FieldValue::Boolean(b) => Ok(Some(FieldValue::Boolean(*b))),
        FieldValue::Text(s) => match s.as_str() {
          "1" | "true" => Ok(Some(FieldValue::Boolean(true))),
          "0" | "false" => Ok(Some(FieldValue::Boolean(false))),
          _ => Ok(None),
        },
        _ => Ok(None),
      },

      FieldKind::EntityReference => match value {
        FieldValue::Reference(id) if !id.is_empty() => {
          Ok(Some(FieldValue::Reference(id.clone())))
        }
        // Autocomplete widgets submit the target id as plain text.
        FieldValue::Text(id) if !id.is_empty() => {
          Ok(Some(FieldValue::Reference(id.clone())))
        }
        _ => Ok(None),
      },

      FieldKind::Image => match value {
        FieldValue::Image(r) if !r.is_empty() => {
          Ok(Some(FieldValue::Image(r.clone())))
        }
        FieldValue::Text(r) if !r.is_empty() => {
          Ok(Some(FieldValue::Image(r.clone())))
        }
        _ => Ok(None),
      },

      FieldKind::Timestamp => match value {
        FieldValue::Timestamp(t) => Ok(Some(FieldValue::Timestamp(*t))),
        _ => Ok(None),
      },
    }
  }
}

// ─── The Book schema ─────────────────────────────────────────────────────────

/// The Book field table, declared once at process start.
///
/// `created` and `changed` are maintained by the lifecycle controller and
/// are never taken from a draft.
pub fn book_fields() -> &'static [FieldDef] {
  static FIELDS: LazyLock<Vec<FieldDef>> = LazyLock::new(|| {
    vec![
      FieldDef::new(NAME, FieldKind::ShortText).required().max_length(255),
      FieldDef::new(ISBN, FieldKind::ShortText).required().max_length(255),
      FieldDef::new(YEAR, FieldKind::Integer).required(),
      FieldDef::new(SERIES, FieldKind::ShortText).max_length(255),
      FieldDef::new(PUBLISHER, FieldKind::EntityReference)
        .required()
        .targets("publisher"),
      FieldDef::new(AUTHOR, FieldKind::EntityReference)
        .required()
        .targets("author"),
      FieldDef::new(COVER, FieldKind::Image),
      FieldDef::new(OWNER, FieldKind::EntityReference).targets("user"),
      FieldDef::new(PUBLISHED, FieldKind::Boolean)
        .default_value(FieldValue::Boolean(true)),
      FieldDef::new(CREATED, FieldKind::Timestamp),
      FieldDef::new(CHANGED, FieldKind::Timestamp),
    ]
  });
  &FIELDS
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// A candidate field-value set, as submitted by a form or an import.
///
/// Names are schema names; fields the schema does not know are ignored
/// by validation and never reach storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft(BTreeMap<String, FieldValue>);

impl Draft {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
    self.0.insert(name.into(), value);
  }

  pub fn value(mut self, name: impl Into<String>, value: FieldValue) -> Self {
    self.set(name, value);
    self
  }

  pub fn text(self, name: impl Into<String>, s: impl Into<String>) -> Self {
    self.value(name, FieldValue::Text(s.into()))
  }

  pub fn integer(self, name: impl Into<String>, i: i64) -> Self {
    self.value(name, FieldValue::Integer(i))
  }

  pub fn boolean(self, name: impl Into<String>, b: bool) -> Self {
    self.value(name, FieldValue::Boolean(b))
  }

  pub fn reference(self, name: impl Into<String>, id: impl Into<String>) -> Self {
    self.value(name, FieldValue::Reference(id.into()))
  }

  pub fn image(self, name: impl Into<String>, r: impl Into<String>) -> Self {
    self.value(name, FieldValue::Image(r.into()))
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self.0.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  // ── Typed reads, used when assembling records from validated drafts ──

  pub fn text_value(&self, name: &str) -> Option<&str> {
    match self.get(name) {
      Some(FieldValue::Text(s)) => Some(s),
      _ => None,
    }
  }

  pub fn integer_value(&self, name: &str) -> Option<i64> {
    match self.get(name) {
      Some(FieldValue::Integer(i)) => Some(*i),
      _ => None,
    }
  }

  pub fn boolean_value(&self, name: &str) -> Option<bool> {
    match self.get(name) {
      Some(FieldValue::Boolean(b)) => Some(*b),
      _ => None,
    }
  }

  pub fn reference_value(&self, name: &str) -> Option<&str> {
    match self.get(name) {
      Some(FieldValue::Reference(id)) => Some(id),
      _ => None,
    }
  }

  pub fn image_value(&self, name: &str) -> Option<&str> {
    match self.get(name) {
      Some(FieldValue::Image(r)) => Some(r),
      _ => None,
    }
  }
}

// ─── Batch drivers ───────────────────────────────────────────────────────────

/// Validate a draft against every field in `fields`, collecting all
/// failures. Static defaults fill in for absent fields. On success the
/// returned draft holds the normalised value of every present field.
pub fn validate_full(
  fields: &[FieldDef],
  draft: &Draft,
) -> Result<Draft, Vec<FieldError>> {
  let mut normalized = Draft::new();
  let mut errors = Vec::new();

  for def in fields {
    let submitted = draft.get(def.name).or(def.default.as_ref());
    match def.validate(submitted) {
      Ok(Some(value)) => normalized.set(def.name, value),
      Ok(None) => {}
      Err(kind) => errors.push(FieldError { field: def.name, kind }),
    }
  }

  if errors.is_empty() { Ok(normalized) } else { Err(errors) }
}

/// Validate only the fields a draft actually mentions — partial-update
/// semantics. Absent fields keep their stored values, so no defaults are
/// injected and no `Missing` error is raised for them.
pub fn validate_partial(
  fields: &[FieldDef],
  draft: &Draft,
) -> Result<Draft, Vec<FieldError>> {
  let mut normalized = Draft::new();
  let mut errors = Vec::new();

  for def in fields {
    if !draft.contains(def.name) {
      continue;
    }
    match def.validate(draft.get(def.name)) {
      Ok(Some(value)) => normalized.set(def.name, value),
      Ok(None) => normalized.set(def.name, FieldValue::Text(String::new())),
      Err(kind) => errors.push(FieldError { field: def.name, kind }),
    }
  }

  if errors.is_empty() { Ok(normalized) } else { Err(errors) }
}
