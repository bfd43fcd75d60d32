//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD + transactional-batch APIs over the `libros` table.
//! - Own the catalog connection and bootstrap its schema idempotently.
//!
//! # Invariants
//! - `list` returns rows in insertion order (`ORDER BY id ASC`).
//! - `run_in_transaction` commits only when every batched operation
//!   succeeds; any failure rolls back the whole batch and reports `false`.

use crate::db::{close_db, open_db, open_db_in_memory, DbResult};
use crate::model::book::{Book, BookId};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::path::Path;

// STRICT makes a mismatched value type a statement error instead of a
// silent coercion.
const BOOK_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS libros (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    autor  TEXT NOT NULL,
    anio   INTEGER NOT NULL
) STRICT;";

const BOOK_SELECT_SQL: &str = "SELECT id, titulo, autor, anio FROM libros";

/// Repository interface for the book catalog.
pub trait BookRepository {
    /// Inserts one book, assigns the new identity into the record and
    /// returns it. The statement autocommits.
    fn create(&self, book: &mut Book) -> RepoResult<BookId>;
    /// Fetches one book by identity. `Ok(None)` when no row matches.
    fn get(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Lists all books in insertion order.
    fn list(&self) -> RepoResult<Vec<Book>>;
    /// Case-insensitive substring match against `titulo`.
    fn search_by_title(&self, pattern: &str) -> RepoResult<Vec<Book>>;
    /// Case-insensitive substring match against `autor`.
    fn search_by_author(&self, pattern: &str) -> RepoResult<Vec<Book>>;
    /// Overwrites all mutable fields of the row matching `book.id`.
    /// Returns `false` when that identity no longer exists.
    fn update(&self, book: &Book) -> RepoResult<bool>;
    /// Removes the row with that identity. Returns `false` when absent.
    fn delete(&self, id: BookId) -> RepoResult<bool>;
    /// Runs a caller-supplied batch of write operations in one transaction.
    ///
    /// Commits and returns `true` only if every operation succeeds. On any
    /// failure the whole batch is rolled back, the cause is logged, and the
    /// call reports `false` instead of propagating the error.
    fn run_in_transaction<F>(&mut self, ops: F) -> bool
    where
        F: FnOnce(&BookBatch<'_>) -> RepoResult<()>,
        Self: Sized;
}

/// SQLite-backed book repository owning its connection.
pub struct SqliteBookRepository {
    conn: Connection,
}

impl SqliteBookRepository {
    /// Opens (or creates) the catalog database at `path` and ensures the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens an in-memory catalog, used by tests.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Takes ownership of a configured connection and bootstraps the schema.
    ///
    /// Safe to call against an already-bootstrapped database.
    pub fn try_new(mut conn: Connection) -> RepoResult<Self> {
        let tx = conn.transaction()?;
        tx.execute_batch(BOOK_SCHEMA_SQL)?;
        tx.commit()?;
        info!("event=schema_bootstrap module=book_repo status=ok table=libros");
        Ok(Self { conn })
    }

    /// Releases the owned connection exactly once.
    ///
    /// Dropping the repository also closes the connection; this variant
    /// surfaces flush failures instead of discarding them.
    pub fn close(self) -> DbResult<()> {
        close_db(self.conn)
    }
}

impl BookRepository for SqliteBookRepository {
    fn create(&self, book: &mut Book) -> RepoResult<BookId> {
        insert_book(&self.conn, book)
    }

    fn get(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Book::from_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Book>> {
        collect_books(&self.conn, &format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn search_by_title(&self, pattern: &str) -> RepoResult<Vec<Book>> {
        collect_books(
            &self.conn,
            &format!("{BOOK_SELECT_SQL} WHERE titulo LIKE ?1 ORDER BY id ASC;"),
            [format!("%{pattern}%")],
        )
    }

    fn search_by_author(&self, pattern: &str) -> RepoResult<Vec<Book>> {
        collect_books(
            &self.conn,
            &format!("{BOOK_SELECT_SQL} WHERE autor LIKE ?1 ORDER BY id ASC;"),
            [format!("%{pattern}%")],
        )
    }

    fn update(&self, book: &Book) -> RepoResult<bool> {
        update_book(&self.conn, book)
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        delete_book(&self.conn, id)
    }

    fn run_in_transaction<F>(&mut self, ops: F) -> bool
    where
        F: FnOnce(&BookBatch<'_>) -> RepoResult<()>,
    {
        let result = run_batch(&mut self.conn, ops);
        match result {
            Ok(()) => {
                info!("event=tx_batch module=book_repo status=commit");
                true
            }
            Err(err) => {
                warn!("event=tx_batch module=book_repo status=rollback error={err}");
                false
            }
        }
    }
}

/// Write operations available to a batch closure within one transaction.
pub struct BookBatch<'tx> {
    tx: &'tx Transaction<'tx>,
}

impl BookBatch<'_> {
    /// Inserts one book inside the surrounding transaction.
    pub fn create(&self, book: &mut Book) -> RepoResult<BookId> {
        insert_book(self.tx, book)
    }

    /// Updates one book inside the surrounding transaction.
    pub fn update(&self, book: &Book) -> RepoResult<bool> {
        update_book(self.tx, book)
    }

    /// Deletes one book inside the surrounding transaction.
    pub fn delete(&self, id: BookId) -> RepoResult<bool> {
        delete_book(self.tx, id)
    }

    /// Raw access to the transaction-scoped connection for statements the
    /// typed API does not cover.
    pub fn connection(&self) -> &Connection {
        self.tx
    }
}

fn run_batch<F>(conn: &mut Connection, ops: F) -> RepoResult<()>
where
    F: FnOnce(&BookBatch<'_>) -> RepoResult<()>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let batch = BookBatch { tx: &tx };
    ops(&batch)?;
    tx.commit()?;
    Ok(())
}

fn insert_book(conn: &Connection, book: &mut Book) -> RepoResult<BookId> {
    conn.execute(
        "INSERT INTO libros (titulo, autor, anio) VALUES (?1, ?2, ?3);",
        params![book.title.as_str(), book.author.as_str(), book.year],
    )?;
    let id = conn.last_insert_rowid();
    book.id = Some(id);
    Ok(id)
}

fn update_book(conn: &Connection, book: &Book) -> RepoResult<bool> {
    let id = book.id.ok_or(RepoError::MissingId("book"))?;
    let changed = conn.execute(
        "UPDATE libros SET titulo = ?1, autor = ?2, anio = ?3 WHERE id = ?4;",
        params![book.title.as_str(), book.author.as_str(), book.year, id],
    )?;
    Ok(changed > 0)
}

fn delete_book(conn: &Connection, id: BookId) -> RepoResult<bool> {
    let changed = conn.execute("DELETE FROM libros WHERE id = ?1;", [id])?;
    Ok(changed > 0)
}

fn collect_books<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<Book>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut books = Vec::new();
    while let Some(row) = rows.next()? {
        books.push(Book::from_row(row)?);
    }
    Ok(books)
}
