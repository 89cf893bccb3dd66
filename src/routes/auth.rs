//! Auth routes — email/password signup and signin, session management.
//!
//! All handlers here need the database pool; without one (local-only
//! deployments) they answer 503 and the rest of the app keeps working.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use sqlx::PgPool;
use time::Duration;

use crate::services::{auth as auth_svc, session};
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

/// Session-established response: status, the session cookie, the user id.
/// `StatusCode` must lead the tuple for axum to treat the jar as parts.
fn session_response(status: StatusCode, token: String, user_id: uuid::Uuid) -> Response {
    let jar = CookieJar::new().add(session_cookie(token));
    (status, jar, Json(serde_json::json!({ "id": user_id }))).into_response()
}

fn require_pool(state: &AppState) -> Result<&PgPool, Response> {
    state.pool.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "PersistenceUnavailable" })),
        )
            .into_response()
    })
}

pub(crate) fn auth_error_to_status(err: &auth_svc::AuthError) -> StatusCode {
    match err {
        auth_svc::AuthError::InvalidEmail | auth_svc::AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        auth_svc::AuthError::EmailTaken => StatusCode::CONFLICT,
        auth_svc::AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        auth_svc::AuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let pool = app_state.pool.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
        let user = session::validate_session(pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct SignupBody {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/signup` — register, start a session, set the cookie.
pub async fn signup(State(state): State<AppState>, Json(body): Json<SignupBody>) -> Response {
    let pool = match require_pool(&state) {
        Ok(pool) => pool,
        Err(response) => return response,
    };

    let user_id = match auth_svc::create_user(pool, &body.email, &body.password, body.name.as_deref()).await {
        Ok(id) => id,
        Err(err) => {
            return (
                auth_error_to_status(&err),
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let Ok(token) = session::create_session(pool, user_id).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    session_response(StatusCode::CREATED, token, user_id)
}

/// `POST /api/auth/signin` — check credentials, start a session.
pub async fn signin(State(state): State<AppState>, Json(body): Json<SigninBody>) -> Response {
    let pool = match require_pool(&state) {
        Ok(pool) => pool,
        Err(response) => return response,
    };

    let user_id = match auth_svc::verify_credentials(pool, &body.email, &body.password).await {
        Ok(id) => id,
        Err(err) => {
            return (
                auth_error_to_status(&err),
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let Ok(token) = session::create_session(pool, user_id).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    session_response(StatusCode::OK, token, user_id)
}

/// `GET /api/auth/me` — current session user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/signout` — delete session, clear cookie.
pub async fn signout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Some(pool) = state.pool.as_ref() {
        let _ = session::delete_session(pool, &auth.token).await;
    }

    let cookie = Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO);

    let jar = CookieJar::new().add(cookie);
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
