//! Client-side pieces of the recipe generator: the session store and its
//! storage, typed HTTP clients for the backend, and the scroll-reveal latch.

pub mod api;
pub mod recipes;
pub mod reveal;
pub mod session;
pub mod storage;

use thiserror::Error;

pub use api::{AuthApi, HttpAuthApi};
pub use recipes::RecipeClient;
pub use session::{AuthOutcome, RestoreOutcome, SessionSnapshot, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, recipes::dto::RecipeInput, state::AppState};

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_app(AppState::fake());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn soup() -> RecipeInput {
        RecipeInput {
            title: "Soup".into(),
            ingredients: "- water\n- salt".into(),
            instructions: "1. heat".into(),
            dietary: Some("vegan".into()),
        }
    }

    #[tokio::test]
    async fn session_and_recipes_end_to_end() {
        let base = spawn_server().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = SessionStore::new(
            HttpAuthApi::new(base.clone()),
            FileStorage::open(&path).unwrap(),
        );
        assert_eq!(session.restore(), RestoreOutcome::Empty);
        let outcome = session
            .register("Ada", "ada@example.com", "longenough")
            .await;
        assert_eq!(outcome, AuthOutcome::Success);
        let token = session.token().unwrap().to_string();

        let recipes = RecipeClient::new(base.clone());
        let created = recipes.create(&token, &soup()).await.unwrap();
        assert_eq!(Some(created.user_id), session.user().map(|u| u.id));

        let listed = recipes.list(&token).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let mut changed = soup();
        changed.title = "Salty soup".into();
        recipes.update(&token, created.id, &changed).await.unwrap();
        assert_eq!(recipes.get(&token, created.id).await.unwrap().title, "Salty soup");

        recipes.delete(&token, created.id).await.unwrap();
        let err = recipes.get(&token, created.id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Recipe not found"));

        // A fresh store over the same file picks the session back up.
        let mut reopened = SessionStore::new(
            HttpAuthApi::new(base.clone()),
            FileStorage::open(&path).unwrap(),
        );
        assert!(matches!(reopened.restore(), RestoreOutcome::Restored(_)));
        assert!(reopened.is_authenticated());

        let generated = recipes.generate(&token, "pasta", None).await.unwrap();
        assert_eq!(generated.recipe.title, "Pasta");
    }

    #[tokio::test]
    async fn bad_login_reports_server_message() {
        let base = spawn_server().await;
        let mut session = SessionStore::new(HttpAuthApi::new(base), MemoryStorage::default());
        session.restore();
        let outcome = session.login("nobody@example.com", "whatever1").await;
        assert_eq!(outcome.error(), Some("Invalid credentials"));
        assert!(!session.snapshot().is_authenticated);
    }

    #[tokio::test]
    async fn recipe_calls_without_valid_token_are_rejected() {
        let base = spawn_server().await;
        let recipes = RecipeClient::new(base);
        let err = recipes.list("garbage").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
