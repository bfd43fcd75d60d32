//! Patient record for the nutrition domain.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Auto-assigned row identity in the `pacientes` table.
pub type PatientId = i64;

/// One tracked patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// `None` until the record is first persisted.
    pub id: Option<PatientId>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "edad")]
    pub age: i64,
    /// Current weight in kilograms, stored as `peso_actual`.
    #[serde(rename = "peso_actual")]
    pub weight_kg: f64,
}

impl Patient {
    /// Creates an unpersisted patient record.
    pub fn new(name: impl Into<String>, age: i64, weight_kg: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            weight_kg,
        }
    }

    /// Reconstructs a patient from a fetched `pacientes` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("nombre")?,
            age: row.get("edad")?,
            weight_kg: row.get("peso_actual")?,
        })
    }
}
