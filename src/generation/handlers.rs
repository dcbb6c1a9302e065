use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::{
    client::GenerationError,
    parser::{parse_recipe, ParsedRecipe},
};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

/// Longest ingredient list forwarded into the prompt, in characters.
pub const MAX_INGREDIENTS_CHARS: usize = 1_000;
pub const MAX_RESTRICTIONS_CHARS: usize = 300;
const BODY_LIMIT_BYTES: usize = 16 * 1024;

#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateRequest {
    pub ingredients: String,
    #[serde(default)]
    pub restrictions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    pub raw: String,
    pub recipe: ParsedRecipe,
}

pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(generate))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

fn too_long(field: &str, max: usize) -> ApiError {
    ApiError::BadRequest(format!("{field} must be at most {max} characters"))
}

#[instrument(skip(state, caller, payload), fields(user_id = %caller.id))]
pub async fn generate(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "malformed generate body");
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BadRequest("request body is too large".into())
        } else {
            ApiError::BadRequest("ingredients are required".into())
        }
    })?;

    let ingredients = req.ingredients.trim();
    if ingredients.is_empty() {
        return Err(ApiError::BadRequest("ingredients are required".into()));
    }
    if ingredients.chars().count() > MAX_INGREDIENTS_CHARS {
        warn!("ingredients over limit");
        return Err(too_long("ingredients", MAX_INGREDIENTS_CHARS));
    }
    let restrictions = req.restrictions.as_deref().map(str::trim);
    if restrictions.is_some_and(|r| r.chars().count() > MAX_RESTRICTIONS_CHARS) {
        warn!("restrictions over limit");
        return Err(too_long("restrictions", MAX_RESTRICTIONS_CHARS));
    }

    let raw = state
        .generator
        .generate(ingredients, restrictions)
        .await
        .map_err(|e| match e {
            GenerationError::NotConfigured => {
                warn!("generation requested without an api key");
                ApiError::Unavailable("Recipe generation is not configured")
            }
            GenerationError::NoContent => {
                warn!("model returned no content");
                ApiError::BadGateway("Something went wrong!")
            }
            other => {
                error!(error = %other, "recipe generation failed");
                ApiError::BadGateway("Error generating recipe. Please try again.")
            }
        })?;

    let recipe = parse_recipe(&raw);
    info!(
        ingredients = recipe.ingredients.len(),
        steps = recipe.instructions.len(),
        "recipe generated"
    );
    Ok(Json(GenerateResponse {
        message: "Recipe generated successfully".into(),
        raw,
        recipe,
    }))
}
