//! Demonstration entry point exercising the full repository contract.
//!
//! # Responsibility
//! - Walk both domains end to end: batched inserts, reads, updates,
//!   deletes, the joined report, composite creation and forced rollbacks.
//! - Keep output human-readable; correctness lives in the core tests.

use dietario_core::{
    default_log_level, init_logging, is_valid_date, Book, BookRepository, Food, MealPlan,
    NutritionRepository, Patient, RepoResult, SqliteBookRepository, SqliteNutritionRepository,
};
use rusqlite::types::Value;
use std::error::Error;

const BOOKS_DB_PATH: &str = "database/libros.db";
const NUTRITION_DB_PATH: &str = "database/nutricion.db";

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(current_dir) = std::env::current_dir() {
        let log_dir = current_dir.join("logs");
        if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    run_book_demo()?;
    run_nutrition_demo()?;
    Ok(())
}

fn run_book_demo() -> Result<(), Box<dyn Error>> {
    println!("=== Book catalog demo ===");
    let mut repo = SqliteBookRepository::open(BOOKS_DB_PATH)?;

    // Batch of inserts that commits as one unit.
    let ok = repo.run_in_transaction(|batch| {
        batch.create(&mut Book::new("El Martín Fierro", "José Hernández", 1872))?;
        batch.create(&mut Book::new("El Principito", "Antoine de Saint-Exupéry", 1943))?;
        batch.create(&mut Book::new("Cuentos de la selva", "Horacio Quiroga", 1918))?;
        Ok(())
    });
    println!("batch insert committed: {ok}");

    let books = repo.list()?;
    println!(
        "catalog after batch: {:?}",
        books.iter().map(|b| b.title.as_str()).collect::<Vec<_>>()
    );

    if let Some(first) = books.first() {
        let mut updated = first.clone();
        updated.year += 10;
        let changed = repo.update(&updated)?;
        println!("updated `{}` (+10 years): {changed}", updated.title);
        if let Some(id) = updated.id {
            println!("after update: {:?}", repo.get(id)?);
        }
    }

    if let Some(last) = books.last() {
        if let Some(id) = last.id {
            let deleted = repo.delete(id)?;
            println!("deleted `{}`: {deleted}", last.title);
        }
    }

    // Forced failure: the STRICT table rejects a text value in the integer
    // year column, so the whole batch must roll back.
    let ok = repo.run_in_transaction(|batch| {
        batch.create(&mut Book::new("Libro válido", "Autor", 2001))?;
        batch.connection().execute(
            "INSERT INTO libros (titulo, autor, anio)
             VALUES ('Libro con error', 'Autor', 'texto');",
            [],
        )?;
        Ok(())
    });
    println!("batch with forced type violation committed: {ok}");
    println!(
        "catalog after failed batch: {:?}",
        repo.list()?
            .iter()
            .map(|b| b.title.as_str())
            .collect::<Vec<_>>()
    );

    repo.close()?;
    Ok(())
}

fn run_nutrition_demo() -> Result<(), Box<dyn Error>> {
    println!("\n=== Nutrition tracking demo ===");
    let mut repo = SqliteNutritionRepository::open(NUTRITION_DB_PATH)?;

    let mut ana = Patient::new("Ana López", 35, 68.5);
    let mut carlos = Patient::new("Carlos Martínez", 42, 81.2);
    let ana_id = repo.create_patient(&mut ana)?;
    let carlos_id = repo.create_patient(&mut carlos)?;
    println!("patients created with ids: {ana_id}, {carlos_id}");

    let mut apple = Food::new("Manzana", 52);
    let mut yogurt = Food::new("Yogur natural", 59);
    let mut chicken = Food::new("Pollo a la plancha", 165);
    let apple_id = repo.create_food(&mut apple)?;
    let yogurt_id = repo.create_food(&mut yogurt)?;
    let chicken_id = repo.create_food(&mut chicken)?;
    println!("foods created with ids: {apple_id}, {yogurt_id}, {chicken_id}");

    let date = "2023-06-15";
    let mut yogurt_plan_id = None;
    if is_valid_date(date) {
        repo.create_meal_plan(&mut MealPlan::new(ana_id, apple_id, date, 2.0))?;
        repo.create_meal_plan(&mut MealPlan::new(ana_id, chicken_id, date, 0.3))?;
        let mut plan = MealPlan::new(carlos_id, yogurt_id, date, 1.0);
        repo.create_meal_plan(&mut plan)?;
        yogurt_plan_id = plan.id;
        println!("meal plans created for {date}");
    }

    println!("\n-- meal plans with details --");
    print_plan_details(&repo)?;

    let changed = repo.update_patient_weight(ana_id, 67.8)?;
    println!("\nweight updated for Ana: {changed}");
    println!("patient now: {:?}", repo.get_patient(ana_id)?);

    if let Some(plan_id) = yogurt_plan_id {
        let deleted = repo.delete_meal_plan(plan_id)?;
        println!("yogurt plan deleted: {deleted}");
    }
    let deleted = repo.delete_patient(carlos_id)?;
    println!("Carlos deleted: {deleted}");

    println!("\n-- composite creation (one transaction) --");
    let mut laura = Patient::new("Laura García", 28, 65.7);
    let mut salad = Food::new("Ensalada mixta", 45);
    let mut plan = MealPlan::draft("2023-06-16", 1.5);
    let (patient_id, food_id, plan_id) = repo.create_full(&mut laura, &mut salad, &mut plan)?;
    println!("created patient={patient_id} food={food_id} plan={plan_id}");

    // Negative age violates the pacientes CHECK constraint, so all three
    // inserts must roll back and the error must reach us.
    let mut invalid = Patient::new("", -5, -10.0);
    let mut chocolate = Food::new("Chocolate", 546);
    let mut bad_plan = MealPlan::draft("2023-06-17", 0.2);
    match repo.create_full(&mut invalid, &mut chocolate, &mut bad_plan) {
        Ok(_) => println!("unexpected: invalid composite creation succeeded"),
        Err(err) => println!("composite creation rejected as expected: {err}"),
    }

    println!("\n-- final patients --");
    for patient in repo.list_patients()? {
        println!("{patient:?}");
    }

    repo.close()?;
    Ok(())
}

fn print_plan_details(repo: &SqliteNutritionRepository) -> RepoResult<()> {
    for detail in repo.list_meal_plans_with_details()? {
        let line: Vec<String> = detail
            .iter()
            .map(|(column, value)| format!("{column}={}", format_value(value)))
            .collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
