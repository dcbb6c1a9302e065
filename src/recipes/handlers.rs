use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{MessageEnvelope, RecipeEnvelope, RecipeInput, RecipeListEnvelope};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

const NOT_FOUND: ApiError = ApiError::NotFound("Recipe not found");

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// Ids that are not UUIDs cannot name a recipe, so they read as absent.
fn recipe_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| NOT_FOUND)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "malformed recipe body");
        ApiError::BadRequest("title, ingredients and instructions are required".into())
    })
}

#[instrument(skip(state, caller, payload), fields(user_id = %caller.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeEnvelope>), ApiError> {
    let input = body(payload)?;
    let recipe = state.recipes.create(caller.id, &input).await.map_err(|e| {
        error!(error = %e, "create recipe failed");
        ApiError::Internal
    })?;

    info!(recipe_id = %recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeEnvelope {
            message: "Recipe created successfully",
            recipe,
        }),
    ))
}

#[instrument(skip(state, caller), fields(user_id = %caller.id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<RecipeListEnvelope>, ApiError> {
    let recipes = state.recipes.list_by_user(caller.id).await.map_err(|e| {
        error!(error = %e, "list recipes failed");
        ApiError::Internal
    })?;

    Ok(Json(RecipeListEnvelope {
        message: "Recipes retrieved successfully",
        recipes,
    }))
}

#[instrument(skip(state, caller), fields(user_id = %caller.id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeEnvelope>, ApiError> {
    let id = recipe_id(&id)?;
    match state.recipes.find_owned(caller.id, id).await {
        Ok(Some(recipe)) => Ok(Json(RecipeEnvelope {
            message: "Recipe retrieved successfully",
            recipe,
        })),
        Ok(None) => Err(NOT_FOUND),
        Err(e) => {
            error!(error = %e, %id, "get recipe failed");
            Err(ApiError::Internal)
        }
    }
}

#[instrument(skip(state, caller, payload), fields(user_id = %caller.id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let id = recipe_id(&id)?;
    let input = body(payload)?;
    let updated = state
        .recipes
        .update_owned(caller.id, id, &input)
        .await
        .map_err(|e| {
            error!(error = %e, %id, "update recipe failed");
            ApiError::Internal
        })?;

    if updated == 0 {
        return Err(NOT_FOUND);
    }
    info!(recipe_id = %id, "recipe updated");
    Ok(Json(MessageEnvelope {
        message: "Recipe updated successfully",
    }))
}

#[instrument(skip(state, caller), fields(user_id = %caller.id))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let id = recipe_id(&id)?;
    let deleted = state.recipes.delete_owned(caller.id, id).await.map_err(|e| {
        error!(error = %e, %id, "delete recipe failed");
        ApiError::Internal
    })?;

    if deleted == 0 {
        return Err(NOT_FOUND);
    }
    info!(recipe_id = %id, "recipe deleted");
    Ok(Json(MessageEnvelope {
        message: "Recipe deleted successfully",
    }))
}
