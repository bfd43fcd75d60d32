//! Core persistence layer for dietario.
//!
//! Two unrelated domains share one transactional repository pattern: a
//! personal book catalog and a nutrition-tracking system. Each repository
//! owns a single SQLite connection, bootstraps its schema idempotently and
//! guarantees all-or-nothing multi-statement writes.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod util;

pub use db::{close_db, open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging};
pub use model::book::{Book, BookId};
pub use model::food::{Food, FoodId};
pub use model::meal_plan::{MealPlan, MealPlanId};
pub use model::patient::{Patient, PatientId};
pub use repo::book_repo::{BookBatch, BookRepository, SqliteBookRepository};
pub use repo::nutrition_repo::{
    MealPlanDetails, NutritionBatch, NutritionRepository, SqliteNutritionRepository,
};
pub use repo::{RepoError, RepoResult};
pub use util::{is_valid_date, total_calories};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
