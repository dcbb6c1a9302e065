//! Client-side authentication session.
//!
//! A [`SessionStore`] owns the authenticated user and bearer token, mirrors them
//! into two storage slots (`token` and `user`), and talks to the backend through
//! an [`AuthApi`]. The slots are always written and cleared as a pair; any state
//! where only one of them is readable is treated as corrupt and wiped.

use tracing::{error, info, warn};

use super::api::{AuthApi, AuthApiError, AuthSuccess};
use super::storage::{SessionStorage, StorageError};
use crate::auth::dto::PublicUser;

pub const TOKEN_SLOT: &str = "token";
pub const USER_SLOT: &str = "user";

/// What [`SessionStore::restore`] found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(PublicUser),
    Empty,
    /// Both slots were present but the cached user did not parse; both were wiped.
    Corrupt,
    /// Only one slot was present; both were wiped.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success => None,
            AuthOutcome::Failure(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<PublicUser>,
    pub is_authenticated: bool,
    pub loading: bool,
}

pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    token: Option<String>,
    user: Option<PublicUser>,
    loading: bool,
}

impl<A: AuthApi, S: SessionStorage> SessionStore<A, S> {
    /// A store that has not looked at storage yet; call [`restore`](Self::restore) next.
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            token: None,
            user: None,
            loading: true,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated(),
            loading: self.loading,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn user(&self) -> Option<&PublicUser> {
        self.user.as_ref()
    }

    /// Bearer token for authenticated API calls.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn restore(&mut self) -> RestoreOutcome {
        let token = self.storage.get(TOKEN_SLOT).filter(|t| !t.is_empty());
        let cached = self.storage.get(USER_SLOT).filter(|u| !u.is_empty());

        let outcome = match (token, cached) {
            (Some(token), Some(raw)) => match serde_json::from_str::<PublicUser>(&raw) {
                Ok(user) => {
                    info!(user_id = %user.id, "session restored");
                    self.token = Some(token);
                    self.user = Some(user.clone());
                    RestoreOutcome::Restored(user)
                }
                Err(e) => {
                    warn!(error = %e, "cached user is corrupt; clearing session");
                    self.clear();
                    RestoreOutcome::Corrupt
                }
            },
            (None, None) => RestoreOutcome::Empty,
            (token, _) => {
                warn!(has_token = token.is_some(), "partial session in storage; clearing");
                self.clear();
                RestoreOutcome::Partial
            }
        };

        self.loading = false;
        outcome
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let result = self.api.login(email, password).await;
        self.complete(result, "Login failed")
    }

    /// Registers and, on success, signs the new user in.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let result = self.api.register(name, email, password).await;
        self.complete(result, "Registration failed")
    }

    pub fn logout(&mut self) {
        self.clear();
        info!("logged out");
    }

    fn complete(
        &mut self,
        result: Result<AuthSuccess, AuthApiError>,
        fallback: &str,
    ) -> AuthOutcome {
        match result {
            Ok(AuthSuccess { token, user }) => match self.persist(&token, &user) {
                Ok(()) => {
                    info!(user_id = %user.id, "authenticated");
                    self.token = Some(token);
                    self.user = Some(user);
                    AuthOutcome::Success
                }
                Err(e) => {
                    error!(error = %e, "could not persist session");
                    self.clear();
                    AuthOutcome::Failure(format!("Could not save session: {e}"))
                }
            },
            Err(AuthApiError::Rejected(message)) => AuthOutcome::Failure(
                message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ),
            Err(AuthApiError::Transport(message)) => {
                warn!(error = %message, "auth request failed");
                if message.trim().is_empty() {
                    AuthOutcome::Failure("Network error".into())
                } else {
                    AuthOutcome::Failure(message)
                }
            }
        }
    }

    fn persist(&self, token: &str, user: &PublicUser) -> Result<(), StorageError> {
        let cached = serde_json::to_string(user)?;
        self.storage.set(TOKEN_SLOT, token)?;
        self.storage.set(USER_SLOT, &cached)
    }

    /// Drops both slots and the in-memory session. Storage errors are logged only.
    fn clear(&mut self) {
        for slot in [TOKEN_SLOT, USER_SLOT] {
            if let Err(e) = self.storage.remove(slot) {
                warn!(error = %e, slot, "could not clear session slot");
            }
        }
        self.token = None;
        self.user = None;
    }
}
