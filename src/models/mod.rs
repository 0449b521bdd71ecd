pub mod meal_plan;
pub mod pantry;
pub mod recipe;
pub mod shopping_list;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, Result};

pub use meal_plan::{MealPlan, MealPlanEntry, MealPlanPatch, MealPlanPayload, MealPlanView};
pub use pantry::{Inventory, InventoryItem, InventoryItemPayload, InventoryItemView, InventoryPayload, InventoryView};
pub use recipe::{Ingredient, NutritionInfo, Recipe, RecipePatch, RecipePayload};
pub use shopping_list::{ShoppingList, ShoppingListItem};

const DATE_FORMAT_MESSAGE: &str = "Dates must be ISO formatted strings (YYYY-MM-DD)";

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accepts `YYYY-MM-DD` or an ISO date-time. Blank means no date.
pub fn parse_iso_datetime(value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(parsed));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| AppError::Validation(DATE_FORMAT_MESSAGE.to_string()))
}

pub fn parse_iso_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::Validation(DATE_FORMAT_MESSAGE.to_string()))
}

/// `None` for missing or whitespace-only text.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
