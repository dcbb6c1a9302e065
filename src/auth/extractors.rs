use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{error, warn};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState};

/// Caller identity resolved from a bearer token and a live user row.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Token part of an `Authorization` header value: the second whitespace-separated word.
fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized("Access token required"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Forbidden("Invalid or expired token")
        })?;

        let user = match state.users.find_by_id(claims.sub).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(user_id = %claims.sub, "token for unknown user");
                return Err(ApiError::Unauthorized("Invalid token"));
            }
            Err(e) => {
                error!(error = %e, user_id = %claims.sub, "user lookup failed");
                return Err(ApiError::Internal);
            }
        };

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
