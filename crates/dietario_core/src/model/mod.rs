//! Domain records persisted by the dietario repositories.
//!
//! # Responsibility
//! - Define the plain data holders mirroring one table row each.
//! - Provide row-to-record constructors keyed by column name.
//!
//! # Invariants
//! - `id` is `None` until first persistence and immutable afterwards.
//! - A record with `id = Some(..)` corresponds 1:1 to a stored row.

pub mod book;
pub mod food;
pub mod meal_plan;
pub mod patient;
