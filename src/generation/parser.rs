//! Line-oriented parser for model-written recipes.
//!
//! The model is asked for a title line, an `Ingredients:` heading with one item
//! per line, then an `Instructions:` heading with one step per line. Parsing is
//! keyword sniffing only: any line containing "ingredient" or "instruction"
//! (case-insensitive) is treated as a heading and switches the current section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl ParsedRecipe {
    /// True when nothing recognisable was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Ingredients,
    Instructions,
}

/// Splits raw model output into title, ingredient lines and instruction lines.
///
/// Never fails: text without headings yields its first non-blank line as the
/// title and two empty lists. Only the first line before any heading becomes
/// the title; further lines in that position are dropped.
pub fn parse_recipe(text: &str) -> ParsedRecipe {
    let mut recipe = ParsedRecipe::default();
    let mut section = Section::Title;

    for line in text.split('\n').filter(|l| !l.trim().is_empty()) {
        let lower = line.to_lowercase();
        if lower.contains("ingredient") {
            section = Section::Ingredients;
        } else if lower.contains("instruction") {
            section = Section::Instructions;
        } else {
            match section {
                Section::Title if recipe.title.is_empty() => recipe.title = line.trim().to_string(),
                Section::Title => {}
                Section::Ingredients => recipe.ingredients.push(line.trim().to_string()),
                Section::Instructions => recipe.instructions.push(line.trim().to_string()),
            }
        }
    }

    recipe
}
