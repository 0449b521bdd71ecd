pub mod meal_plan;
pub mod pantry;
pub mod pdf;
pub mod recipe;
pub mod scrape;
pub mod shopping_list;

pub use meal_plan::MealPlanService;
pub use pantry::PantryService;
pub use pdf::{LopdfRenderer, PdfRenderer};
pub use recipe::{RecipeFilter, RecipeService};
pub use shopping_list::ShoppingListService;
