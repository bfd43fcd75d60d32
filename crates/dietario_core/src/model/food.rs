//! Food record for the nutrition domain.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Auto-assigned row identity in the `alimentos` table.
pub type FoodId = i64;

/// One food with its per-unit calorie count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    /// `None` until the record is first persisted.
    pub id: Option<FoodId>,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Calories per unit, stored as `calorias`.
    #[serde(rename = "calorias")]
    pub calories: i64,
}

impl Food {
    /// Creates an unpersisted food record.
    pub fn new(name: impl Into<String>, calories: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            calories,
        }
    }

    /// Reconstructs a food from a fetched `alimentos` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("nombre")?,
            calories: row.get("calorias")?,
        })
    }
}
