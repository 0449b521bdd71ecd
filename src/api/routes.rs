use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::{delete, get, post, put},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::api::models::{
    CheckItemRequest, Deleted, ExpiringQuery, GenerateShoppingListRequest, MealPlanListQuery, MealPlanRecipeRequest,
    NutritionRequest, PdfResponse, RemoveRecipeRequest, ScrapeRequest, ScrapeResponse,
};
use crate::api::response::{self, Reply};
use crate::error::{AppError, Result};
use crate::models::{
    InventoryItemPayload, InventoryItemView, InventoryPayload, InventoryView, MealPlanPatch, MealPlanPayload,
    MealPlanView, Recipe, RecipePatch, RecipePayload, ShoppingList,
};
use crate::nutrition::{NutrientProfile, NutritionEstimator};
use crate::services::RecipeFilter;
use crate::services::scrape::scrape_recipe;

const DEFAULT_EXPIRING_DAYS: i64 = 3;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route("/api/recipes/:id", get(get_recipe).put(update_recipe).delete(delete_recipe))
        .route("/api/recipes/:id/pdf", post(generate_recipe_pdf))
        .route("/api/meal-plans", get(list_meal_plans).post(create_meal_plan))
        .route(
            "/api/meal-plans/:id",
            get(get_meal_plan).put(update_meal_plan).delete(delete_meal_plan),
        )
        .route("/api/meal-plans/:id/recipes", post(add_meal_plan_recipe))
        .route("/api/meal-plans/:id/recipes/:recipe_id", delete(remove_meal_plan_recipe))
        .route("/api/meal-plans/:id/shopping-list", post(generate_shopping_list))
        .route("/api/shopping-lists", get(list_shopping_lists))
        .route("/api/shopping-lists/:id", get(get_shopping_list).delete(delete_shopping_list))
        .route("/api/shopping-lists/:id/items/:item_id", put(check_shopping_list_item))
        .route("/api/pantries", get(list_pantries).post(create_pantry))
        .route("/api/pantries/:id", get(get_pantry).delete(delete_pantry))
        .route("/api/pantries/:id/items", post(add_pantry_item))
        .route("/api/pantries/:id/items/:item_id", delete(remove_pantry_item))
        .route("/api/pantries/:id/expiring", get(expiring_pantry_items))
        .route("/api/nutrition/calculate", post(calculate_nutrition))
        .route("/api/scrape", post(scrape_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

// Recipes

async fn list_recipes(
    State(state): State<AppState>,
    filter: std::result::Result<Query<RecipeFilter>, QueryRejection>,
) -> Result<Reply<Vec<Recipe>>> {
    let Query(filter) = filter?;
    Ok(response::success(state.recipes.list(&filter)?))
}

async fn create_recipe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Reply<Recipe>> {
    let Json(payload) = payload?;
    Ok(response::created(state.recipes.create(payload)?))
}

async fn get_recipe(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<Recipe>> {
    let Path(id) = id?;
    let recipe = state.recipes.get(id)?.ok_or_else(|| not_found("Recipe"))?;
    Ok(response::success(recipe))
}

async fn update_recipe(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    patch: std::result::Result<Json<RecipePatch>, JsonRejection>,
) -> Result<Reply<Recipe>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let recipe = state.recipes.update(id, patch)?.ok_or_else(|| not_found("Recipe"))?;
    Ok(response::success(recipe))
}

async fn delete_recipe(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<Deleted>> {
    let Path(id) = id?;
    if !state.recipes.delete(id)? {
        return Err(not_found("Recipe"));
    }
    Ok(response::message(Deleted { id }, "Recipe deleted"))
}

async fn generate_recipe_pdf(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<PdfResponse>> {
    let Path(id) = id?;
    let path = state.recipes.generate_pdf(id)?.ok_or_else(|| not_found("Recipe"))?;
    Ok(response::success(PdfResponse {
        pdf_path: path.to_string_lossy().into_owned(),
    }))
}

// Meal plans

async fn list_meal_plans(
    State(state): State<AppState>,
    query: std::result::Result<Query<MealPlanListQuery>, QueryRejection>,
) -> Result<Reply<Vec<MealPlanView>>> {
    let Query(query) = query?;
    let views = state
        .meal_plans
        .list(query.limit)?
        .into_iter()
        .map(|plan| state.meal_plans.with_recipes(plan, None))
        .collect::<Result<Vec<_>>>()?;
    Ok(response::success(views))
}

async fn create_meal_plan(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MealPlanPayload>, JsonRejection>,
) -> Result<Reply<MealPlanView>> {
    let Json(payload) = payload?;
    let plan = state.meal_plans.create(payload)?;
    Ok(response::created(state.meal_plans.with_recipes(plan, None)?))
}

async fn get_meal_plan(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<MealPlanView>> {
    let Path(id) = id?;
    let plan = state.meal_plans.get(id)?.ok_or_else(|| not_found("Meal plan"))?;
    Ok(response::success(state.meal_plans.with_recipes(plan, None)?))
}

async fn update_meal_plan(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    patch: std::result::Result<Json<MealPlanPatch>, JsonRejection>,
) -> Result<Reply<MealPlanView>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let plan = state.meal_plans.update(id, patch)?.ok_or_else(|| not_found("Meal plan"))?;
    Ok(response::success(state.meal_plans.with_recipes(plan, None)?))
}

async fn delete_meal_plan(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<Deleted>> {
    let Path(id) = id?;
    if !state.meal_plans.delete(id)? {
        return Err(not_found("Meal plan"));
    }
    Ok(response::message(Deleted { id }, "Meal plan deleted"))
}

async fn add_meal_plan_recipe(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    payload: std::result::Result<Json<MealPlanRecipeRequest>, JsonRejection>,
) -> Result<Reply<MealPlanView>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let plan = state
        .meal_plans
        .add_recipe(id, req.recipe_id, req.day.as_deref(), req.meal_type.as_deref())?
        .ok_or_else(|| not_found("Meal plan or recipe"))?;

    let ensure = req.day.as_deref().map(|day| (day, req.meal_type.as_deref()));
    Ok(response::success(state.meal_plans.with_recipes(plan, ensure)?))
}

/// The body is optional; without it every scheduling of the recipe is removed.
async fn remove_meal_plan_recipe(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(u64, u64)>, PathRejection>,
    payload: Option<Json<RemoveRecipeRequest>>,
) -> Result<Reply<MealPlanView>> {
    let Path((id, recipe_id)) = ids?;
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let plan = state
        .meal_plans
        .remove_recipe(id, recipe_id, req.day.as_deref(), req.meal_type.as_deref())?
        .ok_or_else(|| not_found("Meal plan or recipe"))?;

    let ensure = req.day.as_deref().map(|day| (day, req.meal_type.as_deref()));
    Ok(response::success(state.meal_plans.with_recipes(plan, ensure)?))
}

async fn generate_shopping_list(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    payload: Option<Json<GenerateShoppingListRequest>>,
) -> Result<Reply<ShoppingList>> {
    let Path(id) = id?;
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let list = state
        .shopping_lists
        .generate(id, req.name.as_deref())?
        .ok_or_else(|| not_found("Meal plan"))?;
    Ok(response::created(list))
}

// Shopping lists

async fn list_shopping_lists(State(state): State<AppState>) -> Result<Reply<Vec<ShoppingList>>> {
    Ok(response::success(state.shopping_lists.list()?))
}

async fn get_shopping_list(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<ShoppingList>> {
    let Path(id) = id?;
    let list = state.shopping_lists.get(id)?.ok_or_else(|| not_found("Shopping list"))?;
    Ok(response::success(list))
}

async fn delete_shopping_list(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<Deleted>> {
    let Path(id) = id?;
    if !state.shopping_lists.delete(id)? {
        return Err(not_found("Shopping list"));
    }
    Ok(response::message(Deleted { id }, "Shopping list deleted"))
}

async fn check_shopping_list_item(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(u64, u64)>, PathRejection>,
    payload: std::result::Result<Json<CheckItemRequest>, JsonRejection>,
) -> Result<Reply<ShoppingList>> {
    let Path((id, item_id)) = ids?;
    let Json(req) = payload?;
    let list = state
        .shopping_lists
        .set_checked(id, item_id, req.checked)?
        .ok_or_else(|| not_found("Shopping list item"))?;
    Ok(response::success(list))
}

// Pantries

async fn list_pantries(State(state): State<AppState>) -> Result<Reply<Vec<InventoryView>>> {
    let today = Utc::now().date_naive();
    let views: Vec<InventoryView> = state.pantries.list()?.iter().map(|inventory| inventory.view(today)).collect();
    Ok(response::success(views))
}

async fn create_pantry(
    State(state): State<AppState>,
    payload: Option<Json<InventoryPayload>>,
) -> Result<Reply<InventoryView>> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let inventory = state.pantries.create(payload)?;
    Ok(response::created(inventory.view(Utc::now().date_naive())))
}

async fn get_pantry(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<InventoryView>> {
    let Path(id) = id?;
    let inventory = state.pantries.get(id)?.ok_or_else(|| not_found("Pantry"))?;
    Ok(response::success(inventory.view(Utc::now().date_naive())))
}

async fn delete_pantry(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Reply<Deleted>> {
    let Path(id) = id?;
    if !state.pantries.delete(id)? {
        return Err(not_found("Pantry"));
    }
    Ok(response::message(Deleted { id }, "Pantry deleted"))
}

async fn add_pantry_item(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    payload: std::result::Result<Json<InventoryItemPayload>, JsonRejection>,
) -> Result<Reply<InventoryItemView>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let item = state.pantries.add_item(id, payload)?.ok_or_else(|| not_found("Pantry"))?;
    Ok(response::created(item.view(Utc::now().date_naive())))
}

async fn remove_pantry_item(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(u64, u64)>, PathRejection>,
) -> Result<Reply<InventoryView>> {
    let Path((id, item_id)) = ids?;
    let inventory = state
        .pantries
        .remove_item(id, item_id)?
        .ok_or_else(|| not_found("Pantry item"))?;
    Ok(response::success(inventory.view(Utc::now().date_naive())))
}

async fn expiring_pantry_items(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    query: std::result::Result<Query<ExpiringQuery>, QueryRejection>,
) -> Result<Reply<Vec<InventoryItemView>>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let today = Utc::now().date_naive();
    let items = state
        .pantries
        .expiring(id, query.days.unwrap_or(DEFAULT_EXPIRING_DAYS), today)?
        .ok_or_else(|| not_found("Pantry"))?;
    let views: Vec<InventoryItemView> = items.iter().map(|item| item.view(today)).collect();
    Ok(response::success(views))
}

// Nutrition and scraping

async fn calculate_nutrition(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NutritionRequest>, JsonRejection>,
) -> Result<Reply<NutrientProfile>> {
    let Json(req) = payload?;
    let ingredients = req
        .ingredients
        .ok_or_else(|| AppError::Validation("Request must include an 'ingredients' field".to_string()))?;

    let totals = NutritionEstimator::new(&state.tables).calculate(&ingredients)?;
    tracing::debug!(ingredients = ingredients.len(), calories = totals.calories, "calculated nutrition");
    Ok(response::success(totals))
}

async fn scrape_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Reply<ScrapeResponse>> {
    let Json(req) = payload?;
    let url = req
        .url
        .ok_or_else(|| AppError::Validation("Request must include a 'url' field".to_string()))?;

    let start_time = std::time::Instant::now();
    let recipe = scrape_recipe(&state.tables, &url, state.config.fetch_timeout).await?;
    tracing::info!(url = %url, elapsed = ?start_time.elapsed(), title = %recipe.title, "scraped recipe");

    if !req.save {
        return Ok(response::success(ScrapeResponse { recipe, saved_recipe: None }));
    }

    let saved = state.recipes.create(RecipePayload::from(recipe.clone()))?;
    Ok(response::created(ScrapeResponse {
        recipe,
        saved_recipe: Some(saved),
    }))
}
