//! Single-page recipe PDFs.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::{AppError, Result};
use crate::models::Recipe;

/// Renders a recipe to `output_path`. `false` means nothing usable was written.
pub trait PdfRenderer: Send + Sync {
    fn render_recipe(&self, recipe: &Recipe, output_path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLine {
    pub style: LineStyle,
    pub text: String,
}

impl PdfLine {
    fn body(text: impl Into<String>) -> Self {
        PdfLine { style: LineStyle::Body, text: text.into() }
    }
}

/// `-` for missing and zero values.
fn or_dash<T: ToString + Default + PartialEq>(value: Option<T>) -> String {
    value
        .filter(|v| *v != T::default())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text layout of a recipe page, top to bottom.
pub fn recipe_lines(recipe: &Recipe) -> Vec<PdfLine> {
    let title = if recipe.title.is_empty() { "Recipe" } else { recipe.title.as_str() };
    let mut lines = vec![PdfLine { style: LineStyle::Title, text: title.to_string() }];

    if let Some(description) = recipe.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(PdfLine::body(""));
        lines.push(PdfLine::body(description));
    }

    lines.push(PdfLine::body(""));
    lines.push(PdfLine::body(format!("Prep time: {} minutes", or_dash(recipe.prep_time))));
    lines.push(PdfLine::body(format!("Cook time: {} minutes", or_dash(recipe.cook_time))));
    lines.push(PdfLine::body(format!("Servings: {}", or_dash(recipe.servings))));

    lines.push(PdfLine::body(""));
    lines.push(PdfLine::body("Ingredients:"));
    for ingredient in &recipe.ingredients {
        let parts: Vec<String> = [
            ingredient.amount.map(|a| a.to_string()),
            ingredient.unit.clone(),
            Some(ingredient.name.clone()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
        lines.push(PdfLine::body(format!("  - {}", parts.join(" "))));
    }

    if let Some(instructions) = recipe.instructions.as_deref().filter(|i| !i.is_empty()) {
        lines.push(PdfLine::body(""));
        lines.push(PdfLine::body("Instructions:"));
        for step in instructions.lines() {
            lines.push(PdfLine::body(format!("  {}", step.trim())));
        }
    }

    if let Some(nutrition) = &recipe.nutrition {
        lines.push(PdfLine::body(""));
        lines.push(PdfLine::body("Nutrition:"));
        let values = [
            ("calories", nutrition.calories),
            ("protein", nutrition.protein),
            ("carbs", nutrition.carbs),
            ("fat", nutrition.fat),
            ("sugar", nutrition.sugar),
            ("sodium", nutrition.sodium),
            ("fiber", nutrition.fiber),
        ];
        for (key, value) in values {
            lines.push(PdfLine::body(format!("  {}: {}", capitalize(key), or_dash(value))));
        }
    }

    lines
}

// US letter, in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 40;
const TOP_MARGIN: i64 = 60;
const LEADING: i64 = 15;

/// Standard-font renderer built on `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRenderer;

impl PdfRenderer for LopdfRenderer {
    fn render_recipe(&self, recipe: &Recipe, output_path: &Path) -> bool {
        match write_pdf(&recipe_lines(recipe), output_path) {
            Ok(()) => {
                tracing::info!(recipe_id = recipe.id, path = %output_path.display(), "wrote recipe PDF");
                true
            }
            Err(err) => {
                tracing::error!(recipe_id = recipe.id, error = %err, "failed to write recipe PDF");
                false
            }
        }
    }
}

// WinAnsi agrees with Latin-1 only on its printable ranges; anything else is replaced.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn write_pdf(lines: &[PdfLine], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::Pdf(e.to_string()))?;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![LEFT_MARGIN.into(), (PAGE_HEIGHT - TOP_MARGIN).into()]),
    ];
    for line in lines {
        let (font, size): (&str, i64) = match line.style {
            LineStyle::Title => ("F2", 18),
            LineStyle::Body => ("F1", 12),
        };
        operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(encode_text(&line.text))]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations }
        .encode()
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(output_path).map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(())
}
