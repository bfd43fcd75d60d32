use dietario_core::{
    Food, MealPlan, NutritionRepository, Patient, RepoError, SqliteNutritionRepository,
};

fn seeded_repo() -> (SqliteNutritionRepository, i64, i64) {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();
    let mut patient = Patient::new("Ana López", 35, 68.5);
    let mut food = Food::new("Manzana", 52);
    let patient_id = repo.create_patient(&mut patient).unwrap();
    let food_id = repo.create_food(&mut food).unwrap();
    (repo, patient_id, food_id)
}

#[test]
fn patient_create_get_roundtrip() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut patient = Patient::new("Carlos Martínez", 42, 81.2);
    let id = repo.create_patient(&mut patient).unwrap();
    assert!(id > 0);
    assert_eq!(patient.id, Some(id));

    let loaded = repo.get_patient(id).unwrap().unwrap();
    assert_eq!(loaded, patient);
    assert!(repo.get_patient(id + 100).unwrap().is_none());
}

#[test]
fn patient_search_matches_substring() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    repo.create_patient(&mut Patient::new("Carlos Martínez", 42, 81.2))
        .unwrap();
    repo.create_patient(&mut Patient::new("Ana López", 35, 68.5))
        .unwrap();

    let hits = repo.search_patients_by_name("art").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Carlos Martínez");

    // LIKE is case-insensitive for ASCII.
    assert_eq!(repo.search_patients_by_name("ANA").unwrap().len(), 1);
    assert!(repo.search_patients_by_name("zz").unwrap().is_empty());
}

#[test]
fn patient_update_and_weight_shortcut_report_affect_counts() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut patient = Patient::new("Ana López", 35, 68.5);
    let id = repo.create_patient(&mut patient).unwrap();

    patient.age = 36;
    assert!(repo.update_patient(&patient).unwrap());
    assert_eq!(repo.get_patient(id).unwrap().unwrap().age, 36);

    assert!(repo.update_patient_weight(id, 67.8).unwrap());
    assert_eq!(repo.get_patient(id).unwrap().unwrap().weight_kg, 67.8);

    assert!(!repo.update_patient_weight(id + 50, 70.0).unwrap());

    let unsaved = Patient::new("Nadie", 20, 60.0);
    assert!(matches!(
        repo.update_patient(&unsaved).unwrap_err(),
        RepoError::MissingId("patient")
    ));
}

#[test]
fn patient_delete_reports_affect_count() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut patient = Patient::new("Temporal", 30, 70.0);
    let id = repo.create_patient(&mut patient).unwrap();

    assert!(repo.delete_patient(id).unwrap());
    assert!(repo.get_patient(id).unwrap().is_none());
    assert!(!repo.delete_patient(id).unwrap());
}

#[test]
fn food_crud_roundtrip() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut food = Food::new("Yogur natural", 59);
    let id = repo.create_food(&mut food).unwrap();
    assert_eq!(repo.get_food(id).unwrap().unwrap(), food);

    food.calories = 61;
    assert!(repo.update_food(&food).unwrap());
    assert_eq!(repo.get_food(id).unwrap().unwrap().calories, 61);

    assert!(repo.delete_food(id).unwrap());
    assert!(repo.get_food(id).unwrap().is_none());
    assert!(!repo.delete_food(id).unwrap());
}

#[test]
fn foods_list_in_insertion_order() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    repo.create_food(&mut Food::new("Manzana", 52)).unwrap();
    repo.create_food(&mut Food::new("Pollo a la plancha", 165))
        .unwrap();

    let names: Vec<String> = repo
        .list_foods()
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, ["Manzana", "Pollo a la plancha"]);
}

#[test]
fn meal_plan_crud_roundtrip() {
    let (repo, patient_id, food_id) = seeded_repo();

    let mut plan = MealPlan::new(patient_id, food_id, "2023-06-15", 2.0);
    let id = repo.create_meal_plan(&mut plan).unwrap();
    assert_eq!(plan.id, Some(id));

    let loaded = repo.get_meal_plan(id).unwrap().unwrap();
    assert_eq!(loaded, plan);

    plan.quantity = 3.0;
    plan.date = "2023-06-16".to_string();
    assert!(repo.update_meal_plan(&plan).unwrap());
    let loaded = repo.get_meal_plan(id).unwrap().unwrap();
    assert_eq!(loaded.quantity, 3.0);
    assert_eq!(loaded.date, "2023-06-16");

    assert!(repo.delete_meal_plan(id).unwrap());
    assert!(repo.get_meal_plan(id).unwrap().is_none());

    assert_eq!(repo.list_meal_plans().unwrap().len(), 0);
}

#[test]
fn meal_plan_foreign_references_are_enforced() {
    let (repo, patient_id, food_id) = seeded_repo();

    let mut dangling = MealPlan::new(patient_id + 99, food_id, "2023-06-15", 1.0);
    assert!(repo.create_meal_plan(&mut dangling).is_err());

    let mut dangling = MealPlan::new(patient_id, food_id + 99, "2023-06-15", 1.0);
    assert!(repo.create_meal_plan(&mut dangling).is_err());

    // A patient referenced by a plan cannot be deleted out from under it.
    let mut plan = MealPlan::new(patient_id, food_id, "2023-06-15", 1.0);
    repo.create_meal_plan(&mut plan).unwrap();
    assert!(repo.delete_patient(patient_id).is_err());
}

#[test]
fn out_of_domain_patient_values_are_rejected_by_the_store() {
    let repo = SqliteNutritionRepository::open_in_memory().unwrap();

    let mut negative_age = Patient::new("Inválido", -5, 70.0);
    assert!(repo.create_patient(&mut negative_age).is_err());

    let mut zero_weight = Patient::new("Inválido", 30, 0.0);
    assert!(repo.create_patient(&mut zero_weight).is_err());

    assert!(repo.list_patients().unwrap().is_empty());
}
