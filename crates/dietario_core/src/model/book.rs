//! Book catalog record.
//!
//! # Responsibility
//! - Mirror one row of the `libros` table.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Auto-assigned row identity in the `libros` table.
pub type BookId = i64;

/// One catalogued book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// `None` until the record is first persisted.
    pub id: Option<BookId>,
    /// Serialized as `titulo` to match the external schema naming.
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "anio")]
    pub year: i64,
}

impl Book {
    /// Creates an unpersisted book record.
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Reconstructs a book from a fetched `libros` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            title: row.get("titulo")?,
            author: row.get("autor")?,
            year: row.get("anio")?,
        })
    }
}
