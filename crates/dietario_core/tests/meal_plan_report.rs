use dietario_core::{
    Food, MealPlan, NutritionRepository, Patient, SqliteNutritionRepository,
};
use rusqlite::types::Value;

#[test]
fn report_joins_names_and_derives_total_calories() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut ana = Patient::new("Ana", 35, 68.5);
    let mut apple = Food::new("Manzana", 52);
    let ana_id = repo.create_patient(&mut ana).unwrap();
    let apple_id = repo.create_food(&mut apple).unwrap();

    let mut plan = MealPlan::new(ana_id, apple_id, "2023-06-15", 2.0);
    let plan_id = repo.create_meal_plan(&mut plan).unwrap();

    let details = repo.list_meal_plans_with_details().unwrap();
    assert_eq!(details.len(), 1);

    let row = &details[0];
    assert_eq!(row.get("id"), Some(&Value::Integer(plan_id)));
    assert_eq!(
        row.get("paciente_nombre"),
        Some(&Value::Text("Ana".to_string()))
    );
    assert_eq!(
        row.get("alimento_nombre"),
        Some(&Value::Text("Manzana".to_string()))
    );
    assert_eq!(
        row.get("fecha"),
        Some(&Value::Text("2023-06-15".to_string()))
    );
    assert_eq!(row.get("cantidad"), Some(&Value::Real(2.0)));
    assert_eq!(row.get("calorias_totales"), Some(&Value::Real(104.0)));
}

#[test]
fn report_has_one_row_per_plan_and_reflects_deletes() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut ana = Patient::new("Ana", 35, 68.5);
    let mut carlos = Patient::new("Carlos", 42, 81.2);
    let ana_id = repo.create_patient(&mut ana).unwrap();
    let carlos_id = repo.create_patient(&mut carlos).unwrap();

    let mut apple = Food::new("Manzana", 52);
    let mut yogurt = Food::new("Yogur natural", 59);
    let apple_id = repo.create_food(&mut apple).unwrap();
    let yogurt_id = repo.create_food(&mut yogurt).unwrap();

    let mut plan_a = MealPlan::new(ana_id, apple_id, "2023-06-15", 2.0);
    let mut plan_b = MealPlan::new(carlos_id, yogurt_id, "2023-06-15", 1.0);
    repo.create_meal_plan(&mut plan_a).unwrap();
    let plan_b_id = repo.create_meal_plan(&mut plan_b).unwrap();

    assert_eq!(repo.list_meal_plans_with_details().unwrap().len(), 2);

    repo.delete_meal_plan(plan_b_id).unwrap();
    let details = repo.list_meal_plans_with_details().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(
        details[0].get("paciente_nombre"),
        Some(&Value::Text("Ana".to_string()))
    );
}

#[test]
fn report_is_empty_without_plans() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut ana = Patient::new("Ana", 35, 68.5);
    repo.create_patient(&mut ana).unwrap();

    assert!(repo.list_meal_plans_with_details().unwrap().is_empty());
}
