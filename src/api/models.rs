use serde::{Deserialize, Serialize};

use crate::models::Recipe;
use crate::nutrition::IngredientEntry;
use crate::parser::ParsedRecipe;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub url: Option<String>,
    /// Also store the parsed recipe.
    #[serde(default)]
    pub save: bool,
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    #[serde(flatten)]
    pub recipe: ParsedRecipe,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_recipe: Option<Recipe>,
}

#[derive(Deserialize)]
pub struct NutritionRequest {
    pub ingredients: Option<Vec<IngredientEntry>>,
}

#[derive(Serialize)]
pub struct PdfResponse {
    pub pdf_path: String,
}

#[derive(Serialize)]
pub struct Deleted {
    pub id: u64,
}

#[derive(Deserialize, Default)]
pub struct MealPlanListQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct MealPlanRecipeRequest {
    pub recipe_id: Option<u64>,
    pub day: Option<String>,
    pub meal_type: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct RemoveRecipeRequest {
    pub day: Option<String>,
    pub meal_type: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct GenerateShoppingListRequest {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckItemRequest {
    pub checked: bool,
}

#[derive(Deserialize, Default)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}
