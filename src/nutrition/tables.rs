//! Fixed reference data for nutrition estimation.
//!
//! Both tables are built once at startup and shared read-only. The nutrient
//! table is ordered: lookups walk it front to back and the first key contained
//! in the ingredient name wins, so "butter" never reaches "milk" and
//! "buttermilk" resolves to butter.

use std::collections::HashMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Nutrient keys in output order.
pub const NUTRIENT_KEYS: [&str; 7] = [
    "calories", "protein", "carbs", "fat", "sugar", "sodium", "fiber",
];

/// Per-100g nutrient composition. Also used for accumulated totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub fiber: f64,
}

impl NutrientProfile {
    pub const ZERO: NutrientProfile = NutrientProfile::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    pub const fn new(
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        sugar: f64,
        sodium: f64,
        fiber: f64,
    ) -> Self {
        NutrientProfile { calories, protein, carbs, fat, sugar, sodium, fiber }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|value| value * factor)
    }

    /// Rounds every value to two decimal places.
    pub fn rounded(&self) -> Self {
        self.map(|value| (value * 100.0).round() / 100.0)
    }

    /// `(key, value)` pairs in [`NUTRIENT_KEYS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
            ("fiber", self.fiber),
        ]
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        NutrientProfile {
            calories: f(self.calories),
            protein: f(self.protein),
            carbs: f(self.carbs),
            fat: f(self.fat),
            sugar: f(self.sugar),
            sodium: f(self.sodium),
            fiber: f(self.fiber),
        }
    }
}

impl AddAssign for NutrientProfile {
    fn add_assign(&mut self, other: Self) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.sugar += other.sugar;
        self.sodium += other.sodium;
        self.fiber += other.fiber;
    }
}

#[derive(Debug, Clone)]
pub struct NutrientTable {
    entries: Vec<(String, NutrientProfile)>,
}

impl NutrientTable {
    pub fn standard() -> Self {
        Self::from_entries(vec![
            ("flour", NutrientProfile::new(364.0, 10.0, 76.0, 1.0, 0.3, 2.0, 2.7)),
            ("sugar", NutrientProfile::new(387.0, 0.0, 100.0, 0.0, 100.0, 1.0, 0.0)),
            ("butter", NutrientProfile::new(717.0, 0.9, 0.1, 81.0, 0.1, 11.0, 0.0)),
            ("egg", NutrientProfile::new(155.0, 13.0, 1.1, 11.0, 1.1, 124.0, 0.0)),
            ("milk", NutrientProfile::new(42.0, 3.4, 5.0, 1.0, 5.0, 44.0, 0.0)),
            ("oil", NutrientProfile::new(884.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0)),
            ("salt", NutrientProfile::new(0.0, 0.0, 0.0, 0.0, 0.0, 38758.0, 0.0)),
        ])
    }

    pub fn from_entries<K: Into<String>>(entries: Vec<(K, NutrientProfile)>) -> Self {
        NutrientTable {
            entries: entries.into_iter().map(|(key, profile)| (key.into(), profile)).collect(),
        }
    }

    /// Profile of the first key contained in `name`, or all zeros.
    pub fn lookup(&self, name: &str) -> NutrientProfile {
        self.entries
            .iter()
            .find(|(key, _)| name.contains(key.as_str()))
            .map(|(_, profile)| *profile)
            .unwrap_or(NutrientProfile::ZERO)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct UnitTable {
    grams_per_unit: HashMap<String, f64>,
}

impl UnitTable {
    pub fn standard() -> Self {
        let grams_per_unit = [
            ("g", 1.0),
            ("gram", 1.0),
            ("grams", 1.0),
            ("kg", 1000.0),
            ("mg", 0.001),
            ("oz", 28.3495),
            ("ounce", 28.3495),
            ("lb", 453.592),
            ("pound", 453.592),
            ("tsp", 4.2),
            ("teaspoon", 4.2),
            ("tbsp", 14.3),
            ("tablespoon", 14.3),
            ("cup", 120.0),
            ("ml", 1.0),
            ("l", 1000.0),
            // rough average for eggs and fruit
            ("whole", 50.0),
            ("unit", 50.0),
        ]
        .into_iter()
        .map(|(unit, grams)| (unit.to_string(), grams))
        .collect();

        UnitTable { grams_per_unit }
    }

    pub fn factor(&self, unit: &str) -> Option<f64> {
        self.grams_per_unit.get(&unit.to_lowercase()).copied()
    }

    /// Unknown units are taken to already be grams.
    pub fn to_grams(&self, amount: f64, unit: &str) -> f64 {
        match self.factor(unit) {
            Some(factor) => amount * factor,
            None => amount,
        }
    }
}

/// Immutable lookup data shared by every estimator.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub nutrients: NutrientTable,
    pub units: UnitTable,
}

impl ReferenceTables {
    pub fn standard() -> Self {
        ReferenceTables {
            nutrients: NutrientTable::standard(),
            units: UnitTable::standard(),
        }
    }
}
