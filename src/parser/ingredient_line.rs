use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::nutrition::NormalizedIngredient;

static BULLET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-•]\s*").expect("Failed to compile bullet pattern")
});

/// An ingredient line split into its parts. `amount` and `unit` are only set
/// when the line starts with a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

impl ParsedIngredient {
    /// Shape used by the estimator: a zero or missing amount counts as 1,
    /// a missing unit as grams.
    pub fn normalized(&self) -> NormalizedIngredient {
        NormalizedIngredient {
            name: self.name.to_lowercase(),
            amount: self.amount.filter(|amount| *amount != 0.0).unwrap_or(1.0),
            unit: self.unit.as_deref().unwrap_or("g").to_lowercase(),
        }
    }
}

pub fn parse_ingredient_line(line: &str) -> ParsedIngredient {
    let line = BULLET_PATTERN.replace(line, "");
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let Some((first, rest)) = tokens.split_first() else {
        return ParsedIngredient {
            name: line.to_string(),
            amount: None,
            unit: None,
        };
    };

    let (amount, unit, name_tokens) = match first.parse::<f64>() {
        Ok(amount) => match rest.split_first() {
            Some((unit, name_tokens)) => (Some(amount), Some(unit.to_string()), name_tokens),
            None => (Some(amount), None, rest),
        },
        Err(_) => (None, None, tokens.as_slice()),
    };

    let name = if !name_tokens.is_empty() {
        name_tokens.join(" ")
    } else if let Some(unit) = &unit {
        unit.clone()
    } else {
        line.to_string()
    };

    ParsedIngredient { name, amount, unit }
}
