//! Nutrition repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `pacientes`, `alimentos` and `plan_comidas`.
//! - Own cross-entity transactional creation and the joined plan report.
//!
//! # Invariants
//! - Meal plan foreign references are enforced by the store
//!   (`foreign_keys=ON`).
//! - `create_full` is all-or-nothing and re-raises the underlying error
//!   after rollback, unlike `run_in_transaction` which swallows and
//!   reports `false`. Callers depend on both failure contracts.

use crate::db::{close_db, open_db, open_db_in_memory, DbResult};
use crate::model::food::{Food, FoodId};
use crate::model::meal_plan::{MealPlan, MealPlanId};
use crate::model::patient::{Patient, PatientId};
use crate::repo::{RepoError, RepoResult};
use log::{error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::Path;

// CHECK constraints turn out-of-domain values (negative age, zero
// weight) into store-level failures.
const NUTRITION_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS pacientes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre      TEXT NOT NULL,
    edad        INTEGER NOT NULL CHECK (edad > 0),
    peso_actual REAL NOT NULL CHECK (peso_actual > 0.0)
) STRICT;
CREATE TABLE IF NOT EXISTS alimentos (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre   TEXT NOT NULL,
    calorias INTEGER NOT NULL CHECK (calorias >= 0)
) STRICT;
CREATE TABLE IF NOT EXISTS plan_comidas (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    paciente_id INTEGER NOT NULL REFERENCES pacientes(id),
    alimento_id INTEGER NOT NULL REFERENCES alimentos(id),
    fecha       TEXT NOT NULL,
    cantidad    REAL NOT NULL CHECK (cantidad > 0.0)
) STRICT;";

const PATIENT_SELECT_SQL: &str = "SELECT id, nombre, edad, peso_actual FROM pacientes";
const FOOD_SELECT_SQL: &str = "SELECT id, nombre, calorias FROM alimentos";
const PLAN_SELECT_SQL: &str =
    "SELECT id, paciente_id, alimento_id, fecha, cantidad FROM plan_comidas";

const PLAN_DETAILS_SQL: &str = "SELECT
    pc.id,
    p.nombre AS paciente_nombre,
    a.nombre AS alimento_nombre,
    pc.fecha,
    pc.cantidad,
    a.calorias * pc.cantidad AS calorias_totales
 FROM plan_comidas pc
 JOIN pacientes p ON pc.paciente_id = p.id
 JOIN alimentos a ON pc.alimento_id = a.id
 ORDER BY pc.id ASC;";

/// Denormalized joined-report row: column name to raw value.
///
/// Callers consume this structurally rather than through a typed record.
pub type MealPlanDetails = BTreeMap<String, Value>;

/// Repository interface for the nutrition-tracking domain.
pub trait NutritionRepository {
    fn create_patient(&self, patient: &mut Patient) -> RepoResult<PatientId>;
    fn get_patient(&self, id: PatientId) -> RepoResult<Option<Patient>>;
    /// Lists all patients in insertion order.
    fn list_patients(&self) -> RepoResult<Vec<Patient>>;
    /// Case-insensitive substring match against `nombre`.
    fn search_patients_by_name(&self, pattern: &str) -> RepoResult<Vec<Patient>>;
    fn update_patient(&self, patient: &Patient) -> RepoResult<bool>;
    /// Overwrites only the stored weight of one patient.
    fn update_patient_weight(&self, id: PatientId, weight_kg: f64) -> RepoResult<bool>;
    fn delete_patient(&self, id: PatientId) -> RepoResult<bool>;

    fn create_food(&self, food: &mut Food) -> RepoResult<FoodId>;
    fn get_food(&self, id: FoodId) -> RepoResult<Option<Food>>;
    /// Lists all foods in insertion order.
    fn list_foods(&self) -> RepoResult<Vec<Food>>;
    fn update_food(&self, food: &Food) -> RepoResult<bool>;
    fn delete_food(&self, id: FoodId) -> RepoResult<bool>;

    fn create_meal_plan(&self, plan: &mut MealPlan) -> RepoResult<MealPlanId>;
    fn get_meal_plan(&self, id: MealPlanId) -> RepoResult<Option<MealPlan>>;
    /// Lists all meal plans in insertion order.
    fn list_meal_plans(&self) -> RepoResult<Vec<MealPlan>>;
    fn update_meal_plan(&self, plan: &MealPlan) -> RepoResult<bool>;
    fn delete_meal_plan(&self, id: MealPlanId) -> RepoResult<bool>;
    /// One row per meal plan joined with patient and food names plus the
    /// derived `calorias_totales` (quantity x unit calories).
    fn list_meal_plans_with_details(&self) -> RepoResult<Vec<MealPlanDetails>>;

    /// Runs a caller-supplied batch of write operations in one transaction.
    ///
    /// Commits and returns `true` only if every operation succeeds. On any
    /// failure the whole batch is rolled back, the cause is logged, and the
    /// call reports `false` instead of propagating the error.
    fn run_in_transaction<F>(&mut self, ops: F) -> bool
    where
        F: FnOnce(&NutritionBatch<'_>) -> RepoResult<()>,
        Self: Sized;

    /// Inserts a patient, a food and a meal plan referencing both as one
    /// atomic unit, returning the three assigned identities.
    ///
    /// On any failure all three inserts are rolled back and the underlying
    /// error is re-raised so the caller can inspect the cause.
    fn create_full(
        &mut self,
        patient: &mut Patient,
        food: &mut Food,
        plan: &mut MealPlan,
    ) -> RepoResult<(PatientId, FoodId, MealPlanId)>;
}

/// SQLite-backed nutrition repository owning its connection.
pub struct SqliteNutritionRepository {
    conn: Connection,
}

impl SqliteNutritionRepository {
    /// Opens (or creates) the nutrition database at `path`, creating parent
    /// directories if needed, and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens an in-memory store, used by tests.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Takes ownership of a configured connection and bootstraps the schema.
    ///
    /// Safe to call against an already-bootstrapped database.
    pub fn try_new(mut conn: Connection) -> RepoResult<Self> {
        let tx = conn.transaction()?;
        tx.execute_batch(NUTRITION_SCHEMA_SQL)?;
        tx.commit()?;
        info!(
            "event=schema_bootstrap module=nutrition_repo status=ok \
             tables=pacientes,alimentos,plan_comidas"
        );
        Ok(Self { conn })
    }

    /// Releases the owned connection exactly once.
    pub fn close(self) -> DbResult<()> {
        close_db(self.conn)
    }
}

impl NutritionRepository for SqliteNutritionRepository {
    fn create_patient(&self, patient: &mut Patient) -> RepoResult<PatientId> {
        insert_patient(&self.conn, patient)
    }

    fn get_patient(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        fetch_one(
            &self.conn,
            &format!("{PATIENT_SELECT_SQL} WHERE id = ?1;"),
            id,
            Patient::from_row,
        )
    }

    fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        collect_rows(
            &self.conn,
            &format!("{PATIENT_SELECT_SQL} ORDER BY id ASC;"),
            [],
            Patient::from_row,
        )
    }

    fn search_patients_by_name(&self, pattern: &str) -> RepoResult<Vec<Patient>> {
        collect_rows(
            &self.conn,
            &format!("{PATIENT_SELECT_SQL} WHERE nombre LIKE ?1 ORDER BY id ASC;"),
            [format!("%{pattern}%")],
            Patient::from_row,
        )
    }

    fn update_patient(&self, patient: &Patient) -> RepoResult<bool> {
        update_patient(&self.conn, patient)
    }

    fn update_patient_weight(&self, id: PatientId, weight_kg: f64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE pacientes SET peso_actual = ?1 WHERE id = ?2;",
            params![weight_kg, id],
        )?;
        Ok(changed > 0)
    }

    fn delete_patient(&self, id: PatientId) -> RepoResult<bool> {
        delete_patient(&self.conn, id)
    }

    fn create_food(&self, food: &mut Food) -> RepoResult<FoodId> {
        insert_food(&self.conn, food)
    }

    fn get_food(&self, id: FoodId) -> RepoResult<Option<Food>> {
        fetch_one(
            &self.conn,
            &format!("{FOOD_SELECT_SQL} WHERE id = ?1;"),
            id,
            Food::from_row,
        )
    }

    fn list_foods(&self) -> RepoResult<Vec<Food>> {
        collect_rows(
            &self.conn,
            &format!("{FOOD_SELECT_SQL} ORDER BY id ASC;"),
            [],
            Food::from_row,
        )
    }

    fn update_food(&self, food: &Food) -> RepoResult<bool> {
        update_food(&self.conn, food)
    }

    fn delete_food(&self, id: FoodId) -> RepoResult<bool> {
        delete_food(&self.conn, id)
    }

    fn create_meal_plan(&self, plan: &mut MealPlan) -> RepoResult<MealPlanId> {
        insert_meal_plan(&self.conn, plan)
    }

    fn get_meal_plan(&self, id: MealPlanId) -> RepoResult<Option<MealPlan>> {
        fetch_one(
            &self.conn,
            &format!("{PLAN_SELECT_SQL} WHERE id = ?1;"),
            id,
            MealPlan::from_row,
        )
    }

    fn list_meal_plans(&self) -> RepoResult<Vec<MealPlan>> {
        collect_rows(
            &self.conn,
            &format!("{PLAN_SELECT_SQL} ORDER BY id ASC;"),
            [],
            MealPlan::from_row,
        )
    }

    fn update_meal_plan(&self, plan: &MealPlan) -> RepoResult<bool> {
        update_meal_plan(&self.conn, plan)
    }

    fn delete_meal_plan(&self, id: MealPlanId) -> RepoResult<bool> {
        delete_meal_plan(&self.conn, id)
    }

    fn list_meal_plans_with_details(&self) -> RepoResult<Vec<MealPlanDetails>> {
        let mut stmt = self.conn.prepare(PLAN_DETAILS_SQL)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query([])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapping = MealPlanDetails::new();
            for (index, name) in column_names.iter().enumerate() {
                mapping.insert(name.clone(), row.get::<_, Value>(index)?);
            }
            details.push(mapping);
        }
        Ok(details)
    }

    fn run_in_transaction<F>(&mut self, ops: F) -> bool
    where
        F: FnOnce(&NutritionBatch<'_>) -> RepoResult<()>,
    {
        match run_batch(&mut self.conn, ops) {
            Ok(()) => {
                info!("event=tx_batch module=nutrition_repo status=commit");
                true
            }
            Err(err) => {
                warn!("event=tx_batch module=nutrition_repo status=rollback error={err}");
                false
            }
        }
    }

    fn create_full(
        &mut self,
        patient: &mut Patient,
        food: &mut Food,
        plan: &mut MealPlan,
    ) -> RepoResult<(PatientId, FoodId, MealPlanId)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = insert_full(&tx, patient, food, plan);
        match inserted {
            Ok(ids) => {
                tx.commit()?;
                info!(
                    "event=tx_composite module=nutrition_repo status=commit \
                     patient_id={} food_id={} plan_id={}",
                    ids.0, ids.1, ids.2
                );
                Ok(ids)
            }
            Err(err) => {
                // Dropping the transaction rolls everything back; the error
                // is re-raised so the caller can diagnose the cause.
                error!("event=tx_composite module=nutrition_repo status=rollback error={err}");
                Err(err)
            }
        }
    }
}

/// Write operations available to a batch closure within one transaction.
pub struct NutritionBatch<'tx> {
    tx: &'tx Transaction<'tx>,
}

impl NutritionBatch<'_> {
    pub fn create_patient(&self, patient: &mut Patient) -> RepoResult<PatientId> {
        insert_patient(self.tx, patient)
    }

    pub fn update_patient(&self, patient: &Patient) -> RepoResult<bool> {
        update_patient(self.tx, patient)
    }

    pub fn delete_patient(&self, id: PatientId) -> RepoResult<bool> {
        delete_patient(self.tx, id)
    }

    pub fn create_food(&self, food: &mut Food) -> RepoResult<FoodId> {
        insert_food(self.tx, food)
    }

    pub fn update_food(&self, food: &Food) -> RepoResult<bool> {
        update_food(self.tx, food)
    }

    pub fn delete_food(&self, id: FoodId) -> RepoResult<bool> {
        delete_food(self.tx, id)
    }

    pub fn create_meal_plan(&self, plan: &mut MealPlan) -> RepoResult<MealPlanId> {
        insert_meal_plan(self.tx, plan)
    }

    pub fn update_meal_plan(&self, plan: &MealPlan) -> RepoResult<bool> {
        update_meal_plan(self.tx, plan)
    }

    pub fn delete_meal_plan(&self, id: MealPlanId) -> RepoResult<bool> {
        delete_meal_plan(self.tx, id)
    }

    /// Raw access to the transaction-scoped connection for statements the
    /// typed API does not cover.
    pub fn connection(&self) -> &Connection {
        self.tx
    }
}

fn run_batch<F>(conn: &mut Connection, ops: F) -> RepoResult<()>
where
    F: FnOnce(&NutritionBatch<'_>) -> RepoResult<()>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let batch = NutritionBatch { tx: &tx };
    ops(&batch)?;
    tx.commit()?;
    Ok(())
}

fn insert_full(
    tx: &Transaction<'_>,
    patient: &mut Patient,
    food: &mut Food,
    plan: &mut MealPlan,
) -> RepoResult<(PatientId, FoodId, MealPlanId)> {
    let patient_id = insert_patient(tx, patient)?;
    let food_id = insert_food(tx, food)?;
    plan.patient_id = patient_id;
    plan.food_id = food_id;
    let plan_id = insert_meal_plan(tx, plan)?;
    Ok((patient_id, food_id, plan_id))
}

fn insert_patient(conn: &Connection, patient: &mut Patient) -> RepoResult<PatientId> {
    conn.execute(
        "INSERT INTO pacientes (nombre, edad, peso_actual) VALUES (?1, ?2, ?3);",
        params![patient.name.as_str(), patient.age, patient.weight_kg],
    )?;
    let id = conn.last_insert_rowid();
    patient.id = Some(id);
    Ok(id)
}

fn update_patient(conn: &Connection, patient: &Patient) -> RepoResult<bool> {
    let id = patient.id.ok_or(RepoError::MissingId("patient"))?;
    let changed = conn.execute(
        "UPDATE pacientes SET nombre = ?1, edad = ?2, peso_actual = ?3 WHERE id = ?4;",
        params![patient.name.as_str(), patient.age, patient.weight_kg, id],
    )?;
    Ok(changed > 0)
}

fn delete_patient(conn: &Connection, id: PatientId) -> RepoResult<bool> {
    let changed = conn.execute("DELETE FROM pacientes WHERE id = ?1;", [id])?;
    Ok(changed > 0)
}

fn insert_food(conn: &Connection, food: &mut Food) -> RepoResult<FoodId> {
    conn.execute(
        "INSERT INTO alimentos (nombre, calorias) VALUES (?1, ?2);",
        params![food.name.as_str(), food.calories],
    )?;
    let id = conn.last_insert_rowid();
    food.id = Some(id);
    Ok(id)
}

fn update_food(conn: &Connection, food: &Food) -> RepoResult<bool> {
    let id = food.id.ok_or(RepoError::MissingId("food"))?;
    let changed = conn.execute(
        "UPDATE alimentos SET nombre = ?1, calorias = ?2 WHERE id = ?3;",
        params![food.name.as_str(), food.calories, id],
    )?;
    Ok(changed > 0)
}

fn delete_food(conn: &Connection, id: FoodId) -> RepoResult<bool> {
    let changed = conn.execute("DELETE FROM alimentos WHERE id = ?1;", [id])?;
    Ok(changed > 0)
}

fn insert_meal_plan(conn: &Connection, plan: &mut MealPlan) -> RepoResult<MealPlanId> {
    conn.execute(
        "INSERT INTO plan_comidas (paciente_id, alimento_id, fecha, cantidad)
         VALUES (?1, ?2, ?3, ?4);",
        params![plan.patient_id, plan.food_id, plan.date.as_str(), plan.quantity],
    )?;
    let id = conn.last_insert_rowid();
    plan.id = Some(id);
    Ok(id)
}

fn update_meal_plan(conn: &Connection, plan: &MealPlan) -> RepoResult<bool> {
    let id = plan.id.ok_or(RepoError::MissingId("meal plan"))?;
    let changed = conn.execute(
        "UPDATE plan_comidas
         SET paciente_id = ?1, alimento_id = ?2, fecha = ?3, cantidad = ?4
         WHERE id = ?5;",
        params![plan.patient_id, plan.food_id, plan.date.as_str(), plan.quantity, id],
    )?;
    Ok(changed > 0)
}

fn delete_meal_plan(conn: &Connection, id: MealPlanId) -> RepoResult<bool> {
    let changed = conn.execute("DELETE FROM plan_comidas WHERE id = ?1;", [id])?;
    Ok(changed > 0)
}

fn fetch_one<T>(
    conn: &Connection,
    sql: &str,
    id: i64,
    map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_row(row)?));
    }
    Ok(None)
}

fn collect_rows<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(map_row(row)?);
    }
    Ok(items)
}
