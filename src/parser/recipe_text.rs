//! Heuristic segmentation of extracted page text into a recipe.
//!
//! The text is scanned once, top to bottom. Header lines ("Ingredients",
//! "Instructions") switch the current [`Section`]; metadata lines ("Prep time",
//! "Cook time", "Servings") are picked up wherever they appear; everything else
//! lands in whichever section is active. Headers must precede their content,
//! there is no second pass.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::nutrition::{NutrientProfile, NutritionEstimator, ReferenceTables};
use crate::parser::ingredient_line::{ParsedIngredient, parse_ingredient_line};

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)").expect("Failed to compile number pattern")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: String,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub servings: Option<u32>,
    pub image_url: Option<String>,
    pub source_url: String,
    pub nutrition: NutrientProfile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    None,
    Ingredients,
    Instructions,
}

#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    IngredientsHeader,
    InstructionsHeader,
    PrepTime(Option<u32>),
    CookTime(Option<u32>),
    Servings(Option<u32>),
    Content(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    let lower = line.to_lowercase();
    if lower.starts_with("ingredients") {
        LineKind::IngredientsHeader
    } else if lower.starts_with("instructions") {
        LineKind::InstructionsHeader
    } else if lower.starts_with("prep time") {
        LineKind::PrepTime(extract_number(line))
    } else if lower.starts_with("cook time") {
        LineKind::CookTime(extract_number(line))
    } else if lower.starts_with("servings") {
        LineKind::Servings(extract_number(line))
    } else {
        LineKind::Content(line)
    }
}

fn extract_number(text: &str) -> Option<u32> {
    NUMBER_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn strip_step_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | ')' | ' '))
}

pub struct RecipeTextParser<'a> {
    estimator: NutritionEstimator<'a>,
}

impl<'a> RecipeTextParser<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        RecipeTextParser {
            estimator: NutritionEstimator::new(tables),
        }
    }

    pub fn parse(&self, text: &str, source_url: &str) -> Result<ParsedRecipe> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let title = lines
            .next()
            .ok_or_else(|| AppError::Extraction("Extracted content was empty".to_string()))?
            .to_string();

        let mut section = Section::None;
        let mut description = String::new();
        let mut ingredients = Vec::new();
        let mut instructions: Vec<&str> = Vec::new();
        let (mut prep_time, mut cook_time, mut servings) = (None, None, None);

        for line in lines {
            match classify(line) {
                LineKind::IngredientsHeader => section = Section::Ingredients,
                LineKind::InstructionsHeader => section = Section::Instructions,
                LineKind::PrepTime(minutes) => prep_time = minutes,
                LineKind::CookTime(minutes) => cook_time = minutes,
                LineKind::Servings(count) => servings = count,
                LineKind::Content(content) => match section {
                    Section::Ingredients => ingredients.push(parse_ingredient_line(content)),
                    Section::Instructions => instructions.push(strip_step_marker(content)),
                    Section::None if description.is_empty() => description = content.to_string(),
                    Section::None => {}
                },
            }
        }

        let nutrition = self
            .estimator
            .estimate(ingredients.iter().map(ParsedIngredient::normalized));

        tracing::debug!(
            title = %title,
            ingredients = ingredients.len(),
            steps = instructions.len(),
            "parsed recipe text"
        );

        Ok(ParsedRecipe {
            title,
            description,
            ingredients,
            instructions: instructions.join("\n"),
            prep_time,
            cook_time,
            servings,
            image_url: None,
            source_url: source_url.to_string(),
            nutrition,
        })
    }
}
