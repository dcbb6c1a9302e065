use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::dto::PublicUser;

/// Successful body of `/api/auth/login` and `/api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    /// The server answered with a non-success status, optionally explaining why.
    #[error("rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// The request never produced a usable answer.
    #[error("transport: {0}")]
    Transport(String),
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthApiError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSuccess, AuthApiError>;
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    message: Option<String>,
}

/// [`AuthApi`] over HTTP against the backend's `/api/auth` routes.
#[derive(Clone)]
pub struct HttpAuthApi {
    http: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthSuccess, AuthApiError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthApiError::Transport(e.to_string()))?;

        let status = res.status();
        debug!(%status, %url, "auth response");
        if status.is_success() {
            res.json::<AuthSuccess>()
                .await
                .map_err(|e| AuthApiError::Transport(e.to_string()))
        } else {
            let message = res.json::<FailureBody>().await.ok().and_then(|b| b.message);
            Err(AuthApiError::Rejected(message))
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthApiError> {
        let body = Credentials {
            name: None,
            email,
            password,
        };
        self.post("/api/auth/login", &body).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSuccess, AuthApiError> {
        let body = Credentials {
            name: Some(name),
            email,
            password,
        };
        self.post("/api/auth/register", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_body_omits_name() {
        let body = Credentials {
            name: None,
            email: "a@b.co",
            password: "pw",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["email"], "a@b.co");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = HttpAuthApi::new("http://localhost:5000/");
        assert_eq!(api.base_url, "http://localhost:5000");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = HttpAuthApi::new(format!("http://{addr}"));
        let err = api.login("a@b.co", "pw").await.unwrap_err();
        assert!(matches!(err, AuthApiError::Transport(_)));
    }
}
