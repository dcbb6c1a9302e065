//! In-process repositories and a canned generator backing `AppState::fake()`.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{User, UserRepository};
use crate::generation::{GenerationError, RecipeGenerator};
use crate::recipes::{dto::RecipeInput, repo::Recipe, repo::RecipeRepository};

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, email: &str, name: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        anyhow::ensure!(
            rows.iter().all(|u| u.email != email),
            "duplicate key value violates unique constraint \"users_email_key\""
        );
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(user.clone());
        Ok(user)
    }
}

/// Rows are kept in insertion order, which doubles as creation order.
#[derive(Default)]
pub struct MemoryRecipes {
    rows: Mutex<Vec<Recipe>>,
}

#[async_trait]
impl RecipeRepository for MemoryRecipes {
    async fn create(&self, user_id: Uuid, input: &RecipeInput) -> anyhow::Result<Recipe> {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            ingredients: input.ingredients.clone(),
            instructions: input.instructions.clone(),
            dietary: input.dietary.clone(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.lock().unwrap().push(recipe.clone());
        Ok(recipe)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &RecipeInput,
    ) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) {
            Some(r) => {
                r.title = input.title.clone();
                r.ingredients = input.ingredients.clone();
                r.instructions = input.instructions.clone();
                r.dietary = input.dietary.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok((before - rows.len()) as u64)
    }
}

/// Every call fails, as a dropped database connection would.
pub struct FailingRecipes;

#[async_trait]
impl RecipeRepository for FailingRecipes {
    async fn create(&self, _user_id: Uuid, _input: &RecipeInput) -> anyhow::Result<Recipe> {
        anyhow::bail!("connection refused")
    }
    async fn list_by_user(&self, _user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        anyhow::bail!("connection refused")
    }
    async fn find_owned(&self, _user_id: Uuid, _id: Uuid) -> anyhow::Result<Option<Recipe>> {
        anyhow::bail!("connection refused")
    }
    async fn update_owned(&self, _u: Uuid, _id: Uuid, _i: &RecipeInput) -> anyhow::Result<u64> {
        anyhow::bail!("connection refused")
    }
    async fn delete_owned(&self, _user_id: Uuid, _id: Uuid) -> anyhow::Result<u64> {
        anyhow::bail!("connection refused")
    }
}

pub const STUB_RECIPE: &str =
    "Pasta\n\nIngredients:\n- pasta\n- sauce\n\nInstructions:\n1. boil\n2. mix";

/// Answers with [`STUB_RECIPE`], or with a fresh error from `fail` when set.
#[derive(Default)]
pub struct StubGenerator {
    fail: Option<fn() -> GenerationError>,
}

impl StubGenerator {
    pub fn failing(fail: fn() -> GenerationError) -> Self {
        Self { fail: Some(fail) }
    }
}

#[async_trait]
impl RecipeGenerator for StubGenerator {
    async fn generate(
        &self,
        _ingredients: &str,
        _restrictions: Option<&str>,
    ) -> Result<String, GenerationError> {
        match self.fail {
            Some(fail) => Err(fail()),
            None => Ok(STUB_RECIPE.to_string()),
        }
    }
}
