use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use super::ClientError;
use crate::generation::handlers::{GenerateRequest, GenerateResponse};
use crate::recipes::{dto::RecipeInput, repo::Recipe};

#[derive(Deserialize)]
struct RecipeBody {
    recipe: Recipe,
}

#[derive(Deserialize)]
struct RecipeListBody {
    recipes: Vec<Recipe>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Typed client for `/api/recipes` and `/api/generate`.
#[derive(Clone)]
pub struct RecipeClient {
    http: Client,
    base_url: String,
}

impl RecipeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn create(&self, token: &str, input: &RecipeInput) -> Result<Recipe, ClientError> {
        let req = self.http.post(self.url("/recipes")).bearer_auth(token).json(input);
        Ok(send::<RecipeBody>(req).await?.recipe)
    }

    pub async fn list(&self, token: &str) -> Result<Vec<Recipe>, ClientError> {
        let req = self.http.get(self.url("/recipes")).bearer_auth(token);
        Ok(send::<RecipeListBody>(req).await?.recipes)
    }

    pub async fn get(&self, token: &str, id: Uuid) -> Result<Recipe, ClientError> {
        let req = self
            .http
            .get(self.url(&format!("/recipes/{id}")))
            .bearer_auth(token);
        Ok(send::<RecipeBody>(req).await?.recipe)
    }

    pub async fn update(
        &self,
        token: &str,
        id: Uuid,
        input: &RecipeInput,
    ) -> Result<(), ClientError> {
        let req = self
            .http
            .put(self.url(&format!("/recipes/{id}")))
            .bearer_auth(token)
            .json(input);
        send::<serde_json::Value>(req).await.map(|_| ())
    }

    pub async fn delete(&self, token: &str, id: Uuid) -> Result<(), ClientError> {
        let req = self
            .http
            .delete(self.url(&format!("/recipes/{id}")))
            .bearer_auth(token);
        send::<serde_json::Value>(req).await.map(|_| ())
    }

    pub async fn generate(
        &self,
        token: &str,
        ingredients: &str,
        restrictions: Option<&str>,
    ) -> Result<GenerateResponse, ClientError> {
        let body = GenerateRequest {
            ingredients: ingredients.to_string(),
            restrictions: restrictions.map(str::to_string),
        };
        let req = self
            .http
            .post(self.url("/generate"))
            .bearer_auth(token)
            .json(&body);
        send(req).await
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
    read(req.send().await?).await
}

async fn read<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }
    let message = res
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
