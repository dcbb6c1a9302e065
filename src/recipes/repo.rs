use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::RecipeInput;

/// Saved recipe, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub dietary: Option<String>,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Owner-scoped recipe persistence. Every lookup and mutation by id also filters on `user_id`.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, input: &RecipeInput) -> anyhow::Result<Recipe>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>>;

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Recipe>>;

    /// Returns the number of rows updated (0 or 1).
    async fn update_owned(&self, user_id: Uuid, id: Uuid, input: &RecipeInput)
        -> anyhow::Result<u64>;

    /// Returns the number of rows deleted (0 or 1).
    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgRecipeRepository {
    db: PgPool,
}

impl PgRecipeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, user_id: Uuid, input: &RecipeInput) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (title, ingredients, instructions, dietary, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, ingredients, instructions, dietary, user_id, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.ingredients)
        .bind(&input.instructions)
        .bind(&input.dietary)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert recipe")?;
        Ok(recipe)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, ingredients, instructions, dietary, user_id, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list recipes by user")?;
        Ok(rows)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, ingredients, instructions, dietary, user_id, created_at
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find recipe")?;
        Ok(row)
    }

    async fn update_owned(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &RecipeInput,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE recipes
               SET title = $3, ingredients = $4, instructions = $5, dietary = $6
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.ingredients)
        .bind(&input.instructions)
        .bind(&input.dietary)
        .execute(&self.db)
        .await
        .context("update recipe")?;
        Ok(res.rows_affected())
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query(r#"DELETE FROM recipes WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete recipe")?;
        Ok(res.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn recipe_serializes_in_camel_case() {
        let recipe = Recipe {
            id: Uuid::nil(),
            title: "Pasta".into(),
            ingredients: "- pasta".into(),
            instructions: "1. boil".into(),
            dietary: None,
            user_id: Uuid::nil(),
            created_at: datetime!(2024-05-01 12:00 UTC),
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["userId"], Uuid::nil().to_string());
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
        assert!(json["dietary"].is_null());
        assert!(json.get("user_id").is_none());
    }
}
