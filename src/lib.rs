pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod nutrition;
pub mod page;
pub mod parser;
pub mod services;
pub mod store;

use std::sync::Arc;
use config::Config;
use nutrition::ReferenceTables;
use services::{LopdfRenderer, MealPlanService, PantryService, PdfRenderer, RecipeService, ShoppingListService};
use store::MemoryStore;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tables: Arc<ReferenceTables>,
    pub recipes: RecipeService,
    pub meal_plans: MealPlanService,
    pub shopping_lists: ShoppingListService,
    pub pantries: PantryService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_renderer(config, Arc::new(LopdfRenderer))
    }

    pub fn with_renderer(config: Config, renderer: Arc<dyn PdfRenderer>) -> Self {
        let recipe_store = Arc::new(MemoryStore::new());
        let plan_store = Arc::new(MemoryStore::new());
        let list_store = Arc::new(MemoryStore::new());

        AppState {
            recipes: RecipeService::new(recipe_store.clone(), renderer, config.pdf_output_dir.clone()),
            meal_plans: MealPlanService::new(plan_store.clone(), recipe_store.clone(), list_store.clone()),
            shopping_lists: ShoppingListService::new(list_store, plan_store, recipe_store),
            pantries: PantryService::new(Arc::new(MemoryStore::new())),
            tables: Arc::new(ReferenceTables::standard()),
            config: Arc::new(config),
        }
    }
}
