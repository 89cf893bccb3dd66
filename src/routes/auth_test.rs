use axum::extract::FromRequestParts;

use super::*;
use crate::services::auth::AuthError;
use crate::state::test_helpers::{test_app_state, test_app_state_with_pool};

#[test]
fn auth_error_to_status_maps_all_variants() {
    assert_eq!(auth_error_to_status(&AuthError::InvalidEmail), StatusCode::BAD_REQUEST);
    assert_eq!(auth_error_to_status(&AuthError::WeakPassword), StatusCode::BAD_REQUEST);
    assert_eq!(auth_error_to_status(&AuthError::EmailTaken), StatusCode::CONFLICT);
    assert_eq!(auth_error_to_status(&AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
}

#[test]
fn session_cookie_is_http_only_and_lax() {
    let cookie = session_cookie("tok".into());
    assert_eq!(cookie.name(), "session_token");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
}

#[test]
fn session_response_carries_the_status_and_sets_the_cookie() {
    let user_id = uuid::Uuid::new_v4();
    let response = session_response(StatusCode::CREATED, "tok".into(), user_id);

    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("session_token=tok"));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn signup_without_a_pool_is_503() {
    let state = test_app_state();
    let body = SignupBody {
        email: "alice@example.com".into(),
        password: "hunter22hunter22".into(),
        name: None,
    };
    let response = signup(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn signin_without_a_pool_is_503() {
    let state = test_app_state();
    let body = SigninBody { email: "alice@example.com".into(), password: "hunter22hunter22".into() };
    let response = signin(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn auth_user_without_a_cookie_is_401() {
    let state = test_app_state_with_pool();
    let request = axum::http::Request::builder().body(()).unwrap();
    let (mut parts, ()) = request.into_parts();

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(StatusCode::UNAUTHORIZED)));
}

#[tokio::test]
async fn auth_user_without_a_pool_is_503() {
    let state = test_app_state();
    let request = axum::http::Request::builder()
        .header("cookie", "session_token=abc123")
        .body(())
        .unwrap();
    let (mut parts, ()) = request.into_parts();

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(StatusCode::SERVICE_UNAVAILABLE)));
}
