//! Approximate nutrition totals from ingredient lists.

pub mod estimator;
pub mod tables;

pub use estimator::{Amount, IngredientEntry, IngredientRecord, NormalizedIngredient, NutritionEstimator};
pub use tables::{NUTRIENT_KEYS, NutrientProfile, NutrientTable, ReferenceTables, UnitTable};
