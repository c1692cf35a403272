//! [`SqliteStore`] — the SQLite implementation of [`BookStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use shelf_core::{
  book::{Book, NewBook},
  store::{BookStore, StoreError},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{BOOK_COLUMNS, RawBook, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Shelf book store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Book`] into the `books` table.
  async fn insert_book(&self, book: &Book) -> Result<()> {
    let book_id_str    = encode_uuid(book.book_id());
    let name           = book.name().to_owned();
    let isbn           = book.isbn().to_owned();
    let year           = book.year();
    let series         = book.series().map(str::to_owned);
    let publisher      = book.publisher_id().to_owned();
    let author         = book.author_id().to_owned();
    let cover          = book.cover().map(str::to_owned);
    let owner          = book.owner_id().to_owned();
    let published      = book.is_published();
    let created_at_str = encode_dt(book.created_at());
    let changed_at_str = encode_dt(book.changed_at());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO books (
             book_id, name, isbn, year, series,
             publisher, author, cover, owner,
             published, created_at, changed_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            book_id_str,
            name,
            isbn,
            year,
            series,
            publisher,
            author,
            cover,
            owner,
            published,
            created_at_str,
            changed_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1"),
              rusqlite::params![id_str],
              RawBook::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  /// Select and delete a row in one store call; `None` if it never
  /// existed.
  async fn take_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1"),
            rusqlite::params![id_str],
            RawBook::from_row,
          )
          .optional()?;

        if raw.is_some() {
          conn.execute(
            "DELETE FROM books WHERE book_id = ?1",
            rusqlite::params![id_str],
          )?;
        }

        Ok(raw)
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn update_book(&self, book: &Book) -> Result<()> {
    let book_id        = book.book_id();
    let book_id_str    = encode_uuid(book_id);
    let name           = book.name().to_owned();
    let isbn           = book.isbn().to_owned();
    let year           = book.year();
    let series         = book.series().map(str::to_owned);
    let publisher      = book.publisher_id().to_owned();
    let author         = book.author_id().to_owned();
    let cover          = book.cover().map(str::to_owned);
    let owner          = book.owner_id().to_owned();
    let published      = book.is_published();
    let changed_at_str = encode_dt(book.changed_at());

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE books SET
             name = ?2, isbn = ?3, year = ?4, series = ?5,
             publisher = ?6, author = ?7, cover = ?8, owner = ?9,
             published = ?10, changed_at = ?11
           WHERE book_id = ?1",
          rusqlite::params![
            book_id_str,
            name,
            isbn,
            year,
            series,
            publisher,
            author,
            cover,
            owner,
            published,
            changed_at_str,
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::BookNotFound(book_id));
    }
    Ok(())
  }

  async fn list_books(&self) -> Result<Vec<Book>> {
    let raws: Vec<RawBook> = self
      .conn
      .call(|conn| {
        // rowid preserves insertion order.
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOOK_COLUMNS} FROM books ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map([], RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }
}

// ─── BookStore impl ──────────────────────────────────────────────────────────

impl BookStore for SqliteStore {
  async fn create(&self, parts: NewBook) -> Result<Book, StoreError> {
    let book = Book::from_parts(Uuid::new_v4(), parts);
    self.insert_book(&book).await?;
    Ok(book)
  }

  async fn load(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
    Ok(self.fetch_book(id).await?)
  }

  async fn update(&self, book: &Book) -> Result<(), StoreError> {
    Ok(self.update_book(book).await?)
  }

  async fn delete(&self, id: Uuid) -> Result<Book, StoreError> {
    self
      .take_book(id)
      .await?
      .ok_or(StoreError::NotFound(id))
  }

  async fn list(&self) -> Result<Vec<Book>, StoreError> {
    Ok(self.list_books().await?)
  }
}
