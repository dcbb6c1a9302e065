use serde::{Deserialize, Serialize};

use super::repo::Recipe;

/// Body of both create and update: update is a full-field replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeInput {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    #[serde(default)]
    pub dietary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeEnvelope {
    pub message: &'static str,
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct RecipeListEnvelope {
    pub message: &'static str,
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: &'static str,
}
