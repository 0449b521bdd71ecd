use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::meal_plan::DaySchedule;
use crate::models::{
    MealPlan, MealPlanEntry, MealPlanPatch, MealPlanPayload, MealPlanView, Recipe, ShoppingList, non_blank,
    parse_iso_datetime,
};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct MealPlanService {
    plans: Arc<MemoryStore<MealPlan>>,
    recipes: Arc<MemoryStore<Recipe>>,
    shopping_lists: Arc<MemoryStore<ShoppingList>>,
}

impl MealPlanService {
    pub fn new(
        plans: Arc<MemoryStore<MealPlan>>,
        recipes: Arc<MemoryStore<Recipe>>,
        shopping_lists: Arc<MemoryStore<ShoppingList>>,
    ) -> Self {
        MealPlanService { plans, recipes, shopping_lists }
    }

    /// Newest first.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<MealPlan>> {
        let mut plans = self.plans.all()?;
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit.filter(|limit| *limit > 0) {
            plans.truncate(limit);
        }
        Ok(plans)
    }

    pub fn get(&self, id: u64) -> Result<Option<MealPlan>> {
        self.plans.get(id)
    }

    /// Groups the plan's recipes by day and meal type. `ensure` guarantees a
    /// (possibly empty) slot for that day and, if given, meal type.
    pub fn with_recipes(&self, plan: MealPlan, ensure: Option<(&str, Option<&str>)>) -> Result<MealPlanView> {
        let mut days = DaySchedule::new();
        for entry in &plan.entries {
            // entries whose recipe has since been deleted are skipped
            let Some(recipe) = self.recipes.get(entry.recipe_id)? else {
                continue;
            };
            days.entry(entry.day.clone())
                .or_default()
                .entry(entry.meal_type.clone())
                .or_default()
                .push(recipe);
        }

        if let Some((day, meal_type)) = ensure {
            let meals = days.entry(day.to_string()).or_default();
            if let Some(meal_type) = meal_type {
                meals.entry(meal_type.to_string()).or_default();
            }
        }

        let plan_id = plan.id;
        let has_shopping_list = !self.shopping_lists.list(|list| list.meal_plan_id == plan_id)?.is_empty();

        Ok(MealPlanView { plan, has_shopping_list, days })
    }

    pub fn create(&self, payload: MealPlanPayload) -> Result<MealPlan> {
        let name = non_blank(payload.name.as_deref())
            .ok_or_else(|| AppError::Validation("'name' is a required field".to_string()))?
            .to_string();
        let start_date = parse_iso_datetime(payload.start_date.as_deref())?;
        let end_date = parse_iso_datetime(payload.end_date.as_deref())?;

        let plan = self.plans.insert(|id| {
            let now = Utc::now();
            Ok(MealPlan {
                id,
                name,
                start_date,
                end_date,
                created_at: now,
                updated_at: now,
                entries: Vec::new(),
            })
        })?;

        tracing::info!(meal_plan_id = plan.id, name = %plan.name, "created meal plan");
        Ok(plan)
    }

    pub fn update(&self, id: u64, patch: MealPlanPatch) -> Result<Option<MealPlan>> {
        self.plans.update(id, |plan| {
            if let Some(name) = patch.name {
                if name.trim().is_empty() {
                    return Err(AppError::Validation("'name' cannot be empty".to_string()));
                }
                plan.name = name;
            }
            if let Some(start_date) = patch.start_date {
                plan.start_date = parse_iso_datetime(start_date.as_deref())?;
            }
            if let Some(end_date) = patch.end_date {
                plan.end_date = parse_iso_datetime(end_date.as_deref())?;
            }
            plan.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Deleting a plan also drops its shopping list.
    pub fn delete(&self, id: u64) -> Result<bool> {
        let deleted = self.plans.remove(id)?;
        if deleted {
            let lists = self.shopping_lists.remove_where(|list| list.meal_plan_id == id)?;
            tracing::info!(meal_plan_id = id, shopping_lists = lists, "deleted meal plan");
        }
        Ok(deleted)
    }

    /// Schedules a recipe. `Ok(None)` when the plan or the recipe is missing;
    /// scheduling the same slot twice is a no-op.
    pub fn add_recipe(
        &self,
        plan_id: u64,
        recipe_id: Option<u64>,
        day: Option<&str>,
        meal_type: Option<&str>,
    ) -> Result<Option<MealPlan>> {
        let recipe_id = recipe_id
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::Validation("'recipe_id' is required".to_string()))?;
        let day = non_blank(day).ok_or_else(|| AppError::Validation("'day' is required".to_string()))?;
        let meal_type =
            non_blank(meal_type).ok_or_else(|| AppError::Validation("'meal_type' is required".to_string()))?;

        if self.recipes.get(recipe_id)?.is_none() {
            return Ok(None);
        }

        let entry = MealPlanEntry {
            recipe_id,
            day: day.to_string(),
            meal_type: meal_type.to_string(),
        };
        self.plans.update(plan_id, |plan| {
            if !plan.entries.contains(&entry) {
                tracing::debug!(meal_plan_id = plan.id, ?entry, "scheduling recipe");
                plan.entries.push(entry);
                plan.updated_at = Utc::now();
            }
            Ok(())
        })
    }

    /// Unschedules a recipe, optionally only from one day and/or meal.
    /// `Ok(None)` when the plan is missing or nothing matched.
    pub fn remove_recipe(
        &self,
        plan_id: u64,
        recipe_id: u64,
        day: Option<&str>,
        meal_type: Option<&str>,
    ) -> Result<Option<MealPlan>> {
        let day = non_blank(day);
        let meal_type = non_blank(meal_type);
        let mut removed = 0;

        let plan = self.plans.update(plan_id, |plan| {
            let before = plan.entries.len();
            plan.entries.retain(|entry| {
                let matches = entry.recipe_id == recipe_id
                    && day.is_none_or(|d| entry.day == d)
                    && meal_type.is_none_or(|m| entry.meal_type == m);
                !matches
            });
            removed = before - plan.entries.len();
            if removed > 0 {
                plan.updated_at = Utc::now();
            }
            Ok(())
        })?;

        tracing::debug!(meal_plan_id = plan_id, recipe_id, removed, "unscheduled recipe");
        Ok(plan.filter(|_| removed > 0))
    }
}
