use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Recipe, double_option};
use crate::store::Record;

/// One scheduled recipe. `(recipe_id, day, meal_type)` is unique per plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub recipe_id: u64,
    pub day: String,
    pub meal_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: u64,
    pub name: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<MealPlanEntry>,
}

impl Record for MealPlan {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealPlanPayload {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealPlanPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
}

/// Day → meal type → recipes.
pub type DaySchedule = BTreeMap<String, BTreeMap<String, Vec<Recipe>>>;

/// A plan with its recipes grouped by day and meal.
#[derive(Debug, Clone, Serialize)]
pub struct MealPlanView {
    #[serde(flatten)]
    pub plan: MealPlan,
    pub has_shopping_list: bool,
    pub days: DaySchedule,
}
