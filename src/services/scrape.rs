use std::time::Duration;

use crate::error::{AppError, Result};
use crate::nutrition::ReferenceTables;
use crate::page::{extract_text, fetch_page};
use crate::parser::{ParsedRecipe, RecipeTextParser};

/// Fetches `url` and parses the page into a recipe.
pub async fn scrape_recipe(tables: &ReferenceTables, url: &str, timeout: Duration) -> Result<ParsedRecipe> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("A URL must be provided".to_string()));
    }

    tracing::info!(url, "scraping recipe");
    let html = fetch_page(url, timeout).await?;
    recipe_from_html(tables, &html, url)
}

pub fn recipe_from_html(tables: &ReferenceTables, html: &str, source_url: &str) -> Result<ParsedRecipe> {
    let text = extract_text(html)
        .ok_or_else(|| AppError::Extraction("Unable to extract recipe content from the page".to_string()))?;
    tracing::debug!(chars = text.len(), "extracted page text");

    RecipeTextParser::new(tables).parse(&text, source_url)
}
