//! Wizard navigation routes.
//!
//! Navigation is free in both directions; prerequisite state is reported
//! but never enforced here.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::steps::prerequisite_met;
use crate::state::AppState;
use crate::wizard::WizardStep;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStatus {
    pub current_step: &'static str,
    /// 1-based position for the progress bar.
    pub position: usize,
    pub total: usize,
    /// Steps with a saved record on the current project.
    pub completed_steps: Vec<&'static str>,
    /// Whether the current step's advisory prerequisite is satisfied.
    pub prerequisite_met: bool,
}

#[derive(Deserialize)]
pub struct GotoBody {
    pub step: String,
}

async fn status(state: &AppState) -> WizardStatus {
    let navigator = state.navigator.read().await;
    let current = navigator.current();
    let (position, total) = navigator.progress();
    drop(navigator);

    let store = state.store.read().await;
    let project = store.current_project();
    let completed_steps = WizardStep::ALL
        .iter()
        .filter(|step| project.is_some_and(|p| p.step_present(**step)))
        .map(|step| step.as_str())
        .collect();

    WizardStatus {
        current_step: current.as_str(),
        position,
        total,
        completed_steps,
        prerequisite_met: prerequisite_met(current, project),
    }
}

/// `GET /api/wizard`
pub async fn get_status(State(state): State<AppState>) -> Json<WizardStatus> {
    Json(status(&state).await)
}

/// `POST /api/wizard/next`
pub async fn next(State(state): State<AppState>) -> Json<WizardStatus> {
    state.navigator.write().await.next();
    Json(status(&state).await)
}

/// `POST /api/wizard/previous`
pub async fn previous(State(state): State<AppState>) -> Json<WizardStatus> {
    state.navigator.write().await.previous();
    Json(status(&state).await)
}

/// `POST /api/wizard/goto {step}`
pub async fn goto(State(state): State<AppState>, Json(body): Json<GotoBody>) -> Response {
    let Some(step) = WizardStep::from_str(&body.step) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unknown wizard step" }))).into_response();
    };
    state.navigator.write().await.go_to(step);
    Json(status(&state).await).into_response()
}

#[cfg(test)]
#[path = "wizard_test.rs"]
mod tests;
