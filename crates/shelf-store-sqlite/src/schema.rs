//! SQL schema for the Shelf SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// One row per book. Publisher, author and owner columns hold foreign
/// identifiers owned by the host platform; no foreign-key constraint is
/// declared because those entities live outside this database.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS books (
    book_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    isbn       TEXT NOT NULL,
    year       INTEGER NOT NULL,
    series     TEXT,
    publisher  TEXT NOT NULL,    -- id of the publisher entity
    author     TEXT NOT NULL,    -- id of the author entity
    cover      TEXT,             -- stored file reference; upload is host-owned
    owner      TEXT NOT NULL,    -- id of the owning user
    published  INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,    -- ISO 8601 UTC
    changed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS books_owner_idx ON books(owner);

PRAGMA user_version = 1;
";
