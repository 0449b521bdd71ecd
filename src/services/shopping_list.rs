use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{MealPlan, Recipe, ShoppingList, ShoppingListItem, non_blank};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct ShoppingListService {
    lists: Arc<MemoryStore<ShoppingList>>,
    plans: Arc<MemoryStore<MealPlan>>,
    recipes: Arc<MemoryStore<Recipe>>,
}

/// Merges ingredients sharing a name and unit (case-insensitive), in first-seen
/// order. Quantities add up; a line stays without quantity only if no
/// occurrence had one.
fn aggregate<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> Vec<ShoppingListItem> {
    let mut items: Vec<ShoppingListItem> = Vec::new();
    let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();

    for ingredient in recipes.into_iter().flat_map(|recipe| &recipe.ingredients) {
        let name = ingredient.name.trim();
        if name.is_empty() {
            continue;
        }
        let unit = non_blank(ingredient.unit.as_deref()).map(str::to_lowercase);
        let key = (name.to_lowercase(), unit.clone());

        match index.get(&key) {
            Some(&position) => {
                let item = &mut items[position];
                if let Some(amount) = ingredient.amount {
                    item.quantity = Some(item.quantity.unwrap_or(0.0) + amount);
                }
            }
            None => {
                index.insert(key, items.len());
                items.push(ShoppingListItem {
                    id: items.len() as u64 + 1,
                    ingredient_name: name.to_string(),
                    quantity: ingredient.amount,
                    unit,
                    checked: false,
                });
            }
        }
    }

    items
}

impl ShoppingListService {
    pub fn new(
        lists: Arc<MemoryStore<ShoppingList>>,
        plans: Arc<MemoryStore<MealPlan>>,
        recipes: Arc<MemoryStore<Recipe>>,
    ) -> Self {
        ShoppingListService { lists, plans, recipes }
    }

    /// Builds the plan's shopping list, replacing any earlier one. A recipe
    /// scheduled twice is bought twice. `Ok(None)` when the plan is missing.
    pub fn generate(&self, meal_plan_id: u64, name: Option<&str>) -> Result<Option<ShoppingList>> {
        let Some(plan) = self.plans.get(meal_plan_id)? else {
            return Ok(None);
        };

        let mut recipes = Vec::with_capacity(plan.entries.len());
        for entry in &plan.entries {
            if let Some(recipe) = self.recipes.get(entry.recipe_id)? {
                recipes.push(recipe);
            }
        }
        let items = aggregate(&recipes);

        let name = non_blank(name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Shopping list for {}", plan.name));

        let replaced = self.lists.remove_where(|list| list.meal_plan_id == meal_plan_id)?;
        let list = self.lists.insert(|id| {
            let now = Utc::now();
            Ok(ShoppingList {
                id,
                name,
                meal_plan_id,
                created_at: now,
                updated_at: now,
                items,
            })
        })?;

        tracing::info!(
            shopping_list_id = list.id,
            meal_plan_id,
            items = list.items.len(),
            replaced,
            "generated shopping list"
        );
        Ok(Some(list))
    }

    pub fn list(&self) -> Result<Vec<ShoppingList>> {
        self.lists.all()
    }

    pub fn get(&self, id: u64) -> Result<Option<ShoppingList>> {
        self.lists.get(id)
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.lists.remove(id)
    }

    /// `Ok(None)` when the list or the item does not exist.
    pub fn set_checked(&self, list_id: u64, item_id: u64, checked: bool) -> Result<Option<ShoppingList>> {
        let mut found = false;
        let list = self.lists.update(list_id, |list| {
            if let Some(item) = list.items.iter_mut().find(|item| item.id == item_id) {
                item.checked = checked;
                found = true;
                list.updated_at = Utc::now();
            }
            Ok(())
        })?;
        Ok(list.filter(|_| found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, MealPlanEntry};

    fn ingredient(name: &str, amount: Option<f64>, unit: Option<&str>) -> Ingredient {
        Ingredient { name: name.into(), amount, unit: unit.map(str::to_string) }
    }

    fn recipe(id: u64, ingredients: Vec<Ingredient>) -> Recipe {
        let now = Utc::now();
        Recipe {
            id,
            title: format!("recipe {}", id),
            description: None,
            instructions: None,
            prep_time: None,
            cook_time: None,
            servings: None,
            image_url: None,
            source_url: None,
            pdf_path: None,
            created_at: now,
            updated_at: now,
            ingredients,
            nutrition: None,
            tags: vec![],
        }
    }

    #[test]
    fn aggregate_merges_same_name_and_unit() {
        let recipes = [
            recipe(1, vec![ingredient("Flour", Some(1.0), Some("cup")), ingredient("salt", None, None)]),
            recipe(2, vec![ingredient("flour", Some(0.5), Some("CUP")), ingredient("flour", Some(100.0), Some("g"))]),
        ];
        let items = aggregate(&recipes);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].ingredient_name, "Flour");
        assert_eq!(items[0].quantity, Some(1.5));
        assert_eq!(items[0].unit.as_deref(), Some("cup"));
        assert_eq!(items[1].quantity, None);
        assert_eq!(items[2].quantity, Some(100.0));
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), [1, 2, 3]);
    }

    fn service() -> (ShoppingListService, Arc<MemoryStore<MealPlan>>, Arc<MemoryStore<Recipe>>) {
        let plans = Arc::new(MemoryStore::new());
        let recipes = Arc::new(MemoryStore::new());
        let service = ShoppingListService::new(Arc::new(MemoryStore::new()), plans.clone(), recipes.clone());
        (service, plans, recipes)
    }

    fn plan_with(plans: &MemoryStore<MealPlan>, recipe_ids: &[u64]) -> u64 {
        plans
            .insert(|id| {
                Ok(MealPlan {
                    id,
                    name: "Week 1".into(),
                    start_date: None,
                    end_date: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    entries: recipe_ids
                        .iter()
                        .enumerate()
                        .map(|(i, recipe_id)| MealPlanEntry {
                            recipe_id: *recipe_id,
                            day: format!("day {}", i),
                            meal_type: "dinner".into(),
                        })
                        .collect(),
                })
            })
            .unwrap()
            .id
    }

    #[test]
    fn generate_replaces_previous_list() {
        let (service, plans, recipes) = service();
        let recipe_id = recipes
            .insert(|id| Ok(recipe(id, vec![ingredient("egg", Some(2.0), Some("whole"))])))
            .unwrap()
            .id;
        let plan_id = plan_with(&plans, &[recipe_id, recipe_id]);

        let first = service.generate(plan_id, None).unwrap().unwrap();
        assert_eq!(first.name, "Shopping list for Week 1");
        assert_eq!(first.items[0].quantity, Some(4.0));

        let second = service.generate(plan_id, Some("Groceries")).unwrap().unwrap();
        assert_eq!(service.list().unwrap().len(), 1);
        assert_eq!(service.get(first.id).unwrap(), None);
        assert_eq!(second.name, "Groceries");
    }

    #[test]
    fn generate_for_missing_plan() {
        let (service, _, _) = service();
        assert_eq!(service.generate(3, None).unwrap(), None);
    }

    #[test]
    fn set_checked_reports_missing_items() {
        let (service, plans, recipes) = service();
        let recipe_id = recipes
            .insert(|id| Ok(recipe(id, vec![ingredient("milk", Some(1.0), Some("l"))])))
            .unwrap()
            .id;
        let list = service.generate(plan_with(&plans, &[recipe_id]), None).unwrap().unwrap();

        let updated = service.set_checked(list.id, 1, true).unwrap().unwrap();
        assert!(updated.items[0].checked);
        assert_eq!(service.set_checked(list.id, 99, true).unwrap(), None);
        assert_eq!(service.set_checked(99, 1, true).unwrap(), None);
        assert!(service.delete(list.id).unwrap());
    }
}
