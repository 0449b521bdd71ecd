use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::double_option;
use crate::nutrition::NutrientProfile;
use crate::parser::ParsedRecipe;
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Stored nutrition. Every key is optional so partial payloads can be merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
}

impl NutritionInfo {
    /// Overwrites only the keys `other` sets.
    pub fn merge(&mut self, other: &NutritionInfo) {
        let pairs = [
            (&mut self.calories, other.calories),
            (&mut self.protein, other.protein),
            (&mut self.carbs, other.carbs),
            (&mut self.fat, other.fat),
            (&mut self.sugar, other.sugar),
            (&mut self.sodium, other.sodium),
            (&mut self.fiber, other.fiber),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                *slot = value;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == NutritionInfo::default()
    }
}

impl From<NutrientProfile> for NutritionInfo {
    fn from(profile: NutrientProfile) -> Self {
        NutritionInfo {
            calories: Some(profile.calories),
            protein: Some(profile.protein),
            carbs: Some(profile.carbs),
            fat: Some(profile.fat),
            sugar: Some(profile.sugar),
            sodium: Some(profile.sodium),
            fiber: Some(profile.fiber),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub servings: Option<u32>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ingredients: Vec<Ingredient>,
    pub nutrition: Option<NutritionInfo>,
    pub tags: Vec<String>,
}

impl Record for Recipe {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub servings: Option<u32>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    pub nutrition: Option<NutritionInfo>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<ParsedRecipe> for RecipePayload {
    fn from(parsed: ParsedRecipe) -> Self {
        let ingredients = parsed
            .ingredients
            .into_iter()
            .map(|ingredient| Ingredient {
                name: ingredient.name,
                amount: ingredient.amount,
                unit: ingredient.unit,
            })
            .collect();

        RecipePayload {
            title: Some(parsed.title),
            description: Some(parsed.description).filter(|d| !d.is_empty()),
            instructions: Some(parsed.instructions).filter(|i| !i.is_empty()),
            prep_time: parsed.prep_time,
            cook_time: parsed.cook_time,
            servings: parsed.servings,
            image_url: parsed.image_url,
            source_url: Some(parsed.source_url),
            ingredients,
            nutrition: Some(parsed.nutrition.into()),
            tags: Vec::new(),
        }
    }
}

/// Partial update: absent fields stay, `null` clears nullable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instructions: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub prep_time: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cook_time: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub servings: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub source_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ingredients: Option<Option<Vec<Ingredient>>>,
    #[serde(default)]
    pub nutrition: Option<NutritionInfo>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
