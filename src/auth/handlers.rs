use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthFailure, AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
    },
    state::AppState,
};

type AuthResult<T> = Result<T, (StatusCode, Json<AuthFailure>)>;

fn failure(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<AuthFailure>) {
    (
        status,
        Json(AuthFailure {
            message: message.into(),
        }),
    )
}

fn internal() -> (StatusCode, Json<AuthFailure>) {
    failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)> {
    let Json(mut payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed register body");
        failure(StatusCode::BAD_REQUEST, "Name, email and password are required")
    })?;
    payload.email = payload.email.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();

    if payload.name.is_empty() {
        warn!("missing name");
        return Err(failure(StatusCode::BAD_REQUEST, "Name is required"));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid email"));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(failure(StatusCode::BAD_REQUEST, "Password too short"));
    }

    match state.users.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(failure(StatusCode::CONFLICT, "Email already registered"));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal());
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        internal()
    })?;

    let user = state
        .users
        .create(&payload.email, &payload.name, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            internal()
        })?;

    let token = JwtKeys::from_ref(&state).sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        internal()
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<AuthResponse>> {
    let Json(mut payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed login body");
        failure(StatusCode::BAD_REQUEST, "Email and password are required")
    })?;
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid email"));
    }

    let user = match state.users.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal());
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        internal()
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        internal()
    })?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip_all, fields(user_id = %caller.id))]
pub async fn get_me(caller: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: PublicUser {
            id: caller.id,
            email: caller.email,
            name: caller.name,
        },
    })
}
