//! Raw AI-suggestion endpoints.
//!
//! These mirror the step controllers' suggestion calls without touching the
//! project store: callers get the analysis payload back and decide what to
//! save. Every response carries a `degraded` flag so clients can tell canned
//! fallback data from a real model reply.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::services::suggest::{
    self, CaptionRequest, HookRequest, IdeaRequest, PerformanceRequest, StructureRequest, SuggestError,
    SuggestOutcome,
};
use crate::state::AppState;

pub(crate) fn suggest_error_response(err: &SuggestError) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
}

/// Attach the `degraded` marker to the payload object.
pub(crate) fn suggestion_response(outcome: SuggestOutcome) -> Response {
    let mut payload = outcome.payload;
    if let Value::Object(map) = &mut payload {
        map.insert("degraded".into(), Value::Bool(outcome.degraded));
    }
    Json(payload).into_response()
}

/// `POST /api/ai/analyze-idea`
pub async fn analyze_idea(State(state): State<AppState>, Json(body): Json<IdeaRequest>) -> Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(err) => return suggest_error_response(&err),
    };
    suggestion_response(suggest::analyze_idea(state.llm.as_ref(), &input).await)
}

/// `POST /api/ai/generate-hooks`
pub async fn generate_hooks(State(state): State<AppState>, Json(body): Json<HookRequest>) -> Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(err) => return suggest_error_response(&err),
    };
    suggestion_response(suggest::generate_hooks(state.llm.as_ref(), &input).await)
}

/// `POST /api/ai/analyze-structure`
pub async fn analyze_structure(State(state): State<AppState>, Json(body): Json<StructureRequest>) -> Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(err) => return suggest_error_response(&err),
    };
    suggestion_response(suggest::analyze_structure(state.llm.as_ref(), &input).await)
}

/// `POST /api/ai/generate-captions`
pub async fn generate_captions(State(state): State<AppState>, Json(body): Json<CaptionRequest>) -> Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(err) => return suggest_error_response(&err),
    };
    suggestion_response(suggest::generate_captions(state.llm.as_ref(), &input).await)
}

/// `POST /api/ai/analyze-performance`
pub async fn analyze_performance(State(state): State<AppState>, Json(body): Json<PerformanceRequest>) -> Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(err) => return suggest_error_response(&err),
    };
    suggestion_response(suggest::analyze_performance(state.llm.as_ref(), &input).await)
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
