use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::nutrition::tables::{NutrientProfile, ReferenceTables};

/// One entry of a nutrition request: a bare name or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientEntry {
    Name(String),
    Record(IngredientRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Amounts arrive either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Resolves the amount, treating `0` and `""` as unset (1.0).
    pub fn value(&self) -> Result<f64> {
        match self {
            Amount::Number(n) if *n == 0.0 => Ok(1.0),
            Amount::Number(n) => Ok(*n),
            Amount::Text(s) if s.is_empty() => Ok(1.0),
            Amount::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                AppError::Validation(format!("could not convert amount '{}' to a number", s))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl IngredientEntry {
    pub fn normalize(&self) -> Result<NormalizedIngredient> {
        match self {
            IngredientEntry::Name(name) => Ok(NormalizedIngredient {
                name: name.to_lowercase(),
                amount: 1.0,
                unit: "unit".to_string(),
            }),
            IngredientEntry::Record(record) => {
                let amount = match &record.amount {
                    Some(amount) => amount.value()?,
                    None => 1.0,
                };
                Ok(NormalizedIngredient {
                    name: record.name.as_deref().unwrap_or_default().to_lowercase(),
                    amount,
                    unit: record.unit.as_deref().unwrap_or("g").to_lowercase(),
                })
            }
        }
    }
}

pub struct NutritionEstimator<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> NutritionEstimator<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        NutritionEstimator { tables }
    }

    /// Totals for raw request entries. Fails only on an unparsable amount.
    pub fn calculate(&self, entries: &[IngredientEntry]) -> Result<NutrientProfile> {
        let normalized = entries
            .iter()
            .map(IngredientEntry::normalize)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.estimate(normalized))
    }

    pub fn estimate<I>(&self, ingredients: I) -> NutrientProfile
    where
        I: IntoIterator<Item = NormalizedIngredient>,
    {
        let mut totals = NutrientProfile::ZERO;
        for ingredient in ingredients {
            let profile = self.tables.nutrients.lookup(&ingredient.name);
            // negative or NaN quantities contribute nothing
            let grams = self
                .tables
                .units
                .to_grams(ingredient.amount, &ingredient.unit)
                .max(0.0);
            totals += profile.scaled(grams / 100.0);
        }

        tracing::trace!(?totals, "estimated nutrition");
        totals.rounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(json: serde_json::Value) -> Vec<IngredientEntry> {
        serde_json::from_value(json).unwrap()
    }

    fn calculate(json: serde_json::Value) -> Result<NutrientProfile> {
        let tables = ReferenceTables::standard();
        NutritionEstimator::new(&tables).calculate(&entries(json))
    }

    #[test]
    fn hundred_grams_of_flour_matches_profile() {
        let totals = calculate(serde_json::json!([{"name": "flour", "amount": 100, "unit": "g"}])).unwrap();
        assert_eq!(totals, NutrientProfile::new(364.0, 10.0, 76.0, 1.0, 0.3, 2.0, 2.7));
    }

    #[test]
    fn bare_names_count_as_fifty_grams_each() {
        let totals = calculate(serde_json::json!(["flour", "sugar", "egg"])).unwrap();
        assert_eq!(totals.calories, 453.0);
        assert_eq!(totals.protein, 11.5);
        assert_eq!(totals.carbs, 88.55);
        assert_eq!(totals.fat, 6.0);
        assert_eq!(totals.sugar, 50.7);
        assert_eq!(totals.sodium, 63.5);
        assert_eq!(totals.fiber, 1.35);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(calculate(serde_json::json!([])).unwrap(), NutrientProfile::ZERO);
    }

    #[test]
    fn unrecognized_unit_treats_amount_as_grams() {
        let totals = calculate(serde_json::json!([{"name": "butter", "amount": 10, "unit": "smidge"}])).unwrap();
        assert_eq!(totals.calories, 71.7);
        assert_eq!(totals.fat, 8.1);
    }

    #[test]
    fn record_defaults_to_one_gram() {
        let totals = calculate(serde_json::json!([{"name": "Sugar"}])).unwrap();
        assert_eq!(totals.calories, 3.87);
    }

    #[test]
    fn zero_amount_is_treated_as_unset() {
        let totals = calculate(serde_json::json!([{"name": "oil", "amount": 0, "unit": "g"}])).unwrap();
        assert_eq!(totals.calories, 8.84);
    }

    #[test]
    fn numeric_string_amount_is_accepted() {
        let totals = calculate(serde_json::json!([{"name": "milk", "amount": " 2 ", "unit": "cup"}])).unwrap();
        assert_eq!(totals.calories, 100.8);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let err = calculate(serde_json::json!([{"name": "milk", "amount": "lots"}])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_name_contributes_nothing() {
        let totals = calculate(serde_json::json!([{"amount": 500, "unit": "g"}])).unwrap();
        assert_eq!(totals, NutrientProfile::ZERO);
    }

    #[test]
    fn totals_never_negative() {
        let totals = calculate(serde_json::json!([
            {"name": "salt", "amount": -3, "unit": "tsp"},
            {"name": "flour", "amount": "1", "unit": "cup"},
            "egg"
        ]))
        .unwrap();
        assert!(totals.entries().iter().all(|(_, value)| *value >= 0.0));
    }

    #[test]
    fn estimation_is_repeatable() {
        let input = serde_json::json!(["butter", {"name": "flour", "amount": 2, "unit": "cup"}]);
        assert_eq!(calculate(input.clone()).unwrap(), calculate(input).unwrap());
    }
}
