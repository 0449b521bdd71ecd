//! Turning extracted page text into structured recipe data.

pub mod ingredient_line;
pub mod recipe_text;

pub use ingredient_line::{ParsedIngredient, parse_ingredient_line};
pub use recipe_text::{ParsedRecipe, RecipeTextParser, Section};
