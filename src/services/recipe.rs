use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NutritionInfo, Recipe, RecipePatch, RecipePayload, non_blank};
use crate::services::pdf::PdfRenderer;
use crate::store::MemoryStore;

/// Query parameters accepted by [`RecipeService::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub search: Option<String>,
    pub ingredient: Option<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub limit: Option<usize>,
}

impl RecipeFilter {
    fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(term) = non_blank(self.search.as_deref()) {
            let term = term.to_lowercase();
            let in_title = recipe.title.to_lowercase().contains(&term);
            let in_description = recipe
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(name) = non_blank(self.ingredient.as_deref()) {
            let name = name.to_lowercase();
            if !recipe.ingredients.iter().any(|i| i.name.to_lowercase().contains(&name)) {
                return false;
            }
        }

        if self.min_calories.is_some() || self.max_calories.is_some() {
            let Some(calories) = recipe.nutrition.as_ref().and_then(|n| n.calories) else {
                return false;
            };
            if self.min_calories.is_some_and(|min| calories < min) {
                return false;
            }
            if self.max_calories.is_some_and(|max| calories > max) {
                return false;
            }
        }

        true
    }
}

const SORT_FIELDS: &[&str] = &[
    "id", "title", "description", "prep_time", "cook_time", "servings", "created_at", "updated_at",
];

fn compare_by(field: &str, a: &Recipe, b: &Recipe) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "title" => a.title.cmp(&b.title),
        "description" => a.description.cmp(&b.description),
        "prep_time" => a.prep_time.cmp(&b.prep_time),
        "cook_time" => a.cook_time.cmp(&b.cook_time),
        "servings" => a.servings.cmp(&b.servings),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => Ordering::Equal,
    }
}

#[derive(Clone)]
pub struct RecipeService {
    store: Arc<MemoryStore<Recipe>>,
    renderer: Arc<dyn PdfRenderer>,
    pdf_output_dir: PathBuf,
}

impl RecipeService {
    pub fn new(store: Arc<MemoryStore<Recipe>>, renderer: Arc<dyn PdfRenderer>, pdf_output_dir: PathBuf) -> Self {
        RecipeService { store, renderer, pdf_output_dir }
    }

    pub fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let mut recipes = self.store.list(|recipe| filter.matches(recipe))?;

        if let Some(field) = filter.sort_by.as_deref() {
            let descending = filter
                .sort_direction
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case("desc"));
            if SORT_FIELDS.contains(&field) {
                recipes.sort_by(|a, b| {
                    let ordering = compare_by(field, a, b);
                    if descending { ordering.reverse() } else { ordering }
                });
            } else {
                tracing::debug!(field, "ignoring unknown sort field");
            }
        }

        if let Some(limit) = filter.limit.filter(|limit| *limit > 0) {
            recipes.truncate(limit);
        }
        Ok(recipes)
    }

    pub fn get(&self, id: u64) -> Result<Option<Recipe>> {
        self.store.get(id)
    }

    pub fn create(&self, payload: RecipePayload) -> Result<Recipe> {
        let title = non_blank(payload.title.as_deref())
            .ok_or_else(|| AppError::Validation("'title' is a required field".to_string()))?
            .to_string();

        let recipe = self.store.insert(|id| {
            let now = Utc::now();
            Ok(Recipe {
                id,
                title,
                description: payload.description,
                instructions: payload.instructions,
                prep_time: payload.prep_time,
                cook_time: payload.cook_time,
                servings: payload.servings,
                image_url: payload.image_url,
                source_url: payload.source_url,
                pdf_path: None,
                created_at: now,
                updated_at: now,
                ingredients: payload.ingredients,
                nutrition: payload.nutrition.filter(|n| !n.is_empty()),
                tags: payload.tags,
            })
        })?;

        tracing::info!(recipe_id = recipe.id, title = %recipe.title, "created recipe");
        Ok(recipe)
    }

    pub fn update(&self, id: u64, patch: RecipePatch) -> Result<Option<Recipe>> {
        let updated = self.store.update(id, |recipe| {
            if let Some(title) = patch.title {
                if title.trim().is_empty() {
                    return Err(AppError::Validation("'title' cannot be empty".to_string()));
                }
                recipe.title = title;
            }
            if let Some(description) = patch.description {
                recipe.description = description;
            }
            if let Some(instructions) = patch.instructions {
                recipe.instructions = instructions;
            }
            if let Some(prep_time) = patch.prep_time {
                recipe.prep_time = prep_time;
            }
            if let Some(cook_time) = patch.cook_time {
                recipe.cook_time = cook_time;
            }
            if let Some(servings) = patch.servings {
                recipe.servings = servings;
            }
            if let Some(image_url) = patch.image_url {
                recipe.image_url = image_url;
            }
            if let Some(source_url) = patch.source_url {
                recipe.source_url = source_url;
            }
            if let Some(ingredients) = patch.ingredients {
                recipe.ingredients = ingredients.unwrap_or_default();
            }
            if let Some(nutrition) = patch.nutrition.filter(|n| !n.is_empty()) {
                recipe
                    .nutrition
                    .get_or_insert_with(NutritionInfo::default)
                    .merge(&nutrition);
            }
            if let Some(tags) = patch.tags {
                recipe.tags = tags;
            }
            recipe.updated_at = Utc::now();
            Ok(())
        })?;

        if updated.is_some() {
            tracing::info!(recipe_id = id, "updated recipe");
        }
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        let deleted = self.store.remove(id)?;
        if deleted {
            tracing::info!(recipe_id = id, "deleted recipe");
        }
        Ok(deleted)
    }

    /// Renders the recipe and records the file on it. `Ok(None)` when the
    /// recipe does not exist.
    pub fn generate_pdf(&self, id: u64) -> Result<Option<PathBuf>> {
        let Some(recipe) = self.store.get(id)? else {
            return Ok(None);
        };

        let filename = format!("recipe_{}_{}.pdf", recipe.id, Utc::now().timestamp());
        let output_path = self.pdf_output_dir.join(filename);

        if !self.renderer.render_recipe(&recipe, &output_path) {
            return Err(AppError::Pdf(format!("Unable to render PDF for recipe {}", id)));
        }

        let pdf_path = output_path.to_string_lossy().into_owned();
        let updated = self.store.update(id, |recipe| {
            recipe.pdf_path = Some(pdf_path);
            Ok(())
        })?;

        Ok(updated.map(|_| output_path))
    }
}
