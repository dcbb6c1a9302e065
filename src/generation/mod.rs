pub mod client;
pub mod handlers;
pub mod parser;
pub mod prompt;

pub use client::{GenerationError, OpenAiGenerator, RecipeGenerator};
pub use parser::{parse_recipe, ParsedRecipe};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::generation_routes()
}
