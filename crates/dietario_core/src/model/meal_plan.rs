//! Meal plan record linking one patient to one food.
//!
//! # Invariants
//! - `patient_id` and `food_id` must reference existing rows for the joined
//!   report to include the plan; the store enforces this via foreign keys.
//! - `date` is expected in `YYYY-MM-DD` form. Callers validate it with
//!   [`crate::util::is_valid_date`]; the repository does not enforce it.

use crate::model::food::FoodId;
use crate::model::patient::PatientId;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Auto-assigned row identity in the `plan_comidas` table.
pub type MealPlanId = i64;

/// One scheduled quantity of a food for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// `None` until the record is first persisted.
    pub id: Option<MealPlanId>,
    #[serde(rename = "paciente_id")]
    pub patient_id: PatientId,
    #[serde(rename = "alimento_id")]
    pub food_id: FoodId,
    #[serde(rename = "fecha")]
    pub date: String,
    /// Number of food units, stored as `cantidad`.
    #[serde(rename = "cantidad")]
    pub quantity: f64,
}

impl MealPlan {
    /// Creates an unpersisted meal plan for already-persisted references.
    pub fn new(
        patient_id: PatientId,
        food_id: FoodId,
        date: impl Into<String>,
        quantity: f64,
    ) -> Self {
        Self {
            id: None,
            patient_id,
            food_id,
            date: date.into(),
            quantity,
        }
    }

    /// Creates a plan whose references are still unassigned.
    ///
    /// Used with composite creation, which wires `patient_id` and `food_id`
    /// to the identities it assigns inside the same transaction.
    pub fn draft(date: impl Into<String>, quantity: f64) -> Self {
        Self::new(0, 0, date, quantity)
    }

    /// Reconstructs a meal plan from a fetched `plan_comidas` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            patient_id: row.get("paciente_id")?,
            food_id: row.get("alimento_id")?,
            date: row.get("fecha")?,
            quantity: row.get("cantidad")?,
        })
    }
}
