//! Step controllers — validate, suggest, save, advance.
//!
//! DESIGN
//! ======
//! One controller per wizard step. Each follows the same shape:
//!
//!   1. validate the request,
//!   2. mark the store loading and take a request token,
//!   3. call the suggestion service with no locks held,
//!   4. re-lock, settle the token, save the sub-record, advance the wizard.
//!
//! The token settle discards results that were superseded while the
//! suggestion call was in flight, whether by a newer request for the same
//! step or by the current project changing. A superseded submission saves
//! nothing, does not move the wizard, and leaves the loading flag to
//! whichever request now owns it.
//!
//! Prerequisite checks are advisory. Submitting a step out of order is
//! allowed; `prerequisite_met` only feeds the wizard status endpoint. The
//! one hard dependency is the hook step, which reads its content idea and
//! audience from the saved idea record.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::llm::LlmChat;
use crate::model::{
    Caption, ContentIdea, ContentStructure, Hook, Performance, Project, StepRecord, now_ms,
};
use crate::services::suggest::{
    self, CaptionRequest, HookInput, IdeaRequest, PerformanceRequest, StructureRequest, SuggestError,
};
use crate::store::{ProjectStore, StoreError};
use crate::wizard::{Navigator, WizardStep};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The request payload failed validation.
    #[error(transparent)]
    Invalid(#[from] SuggestError),

    /// No project is selected to attach the record to.
    #[error("no project is currently selected")]
    NoCurrentProject,

    /// A newer submission for the same step superseded this one; nothing
    /// was saved.
    #[error("request superseded by a newer submission for this step")]
    Superseded,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for StepError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NoCurrentProject => Self::NoCurrentProject,
            other => Self::Store(other),
        }
    }
}

/// Result of a successful step submission.
#[derive(Debug)]
pub struct StepOutcome {
    /// The project after the sub-record was saved.
    pub project: Project,
    /// The wizard step after auto-advance.
    pub current_step: WizardStep,
    /// Whether the attached suggestion payload is canned fallback data.
    pub degraded: bool,
}

/// Whether the advisory prerequisite for `step` is satisfied. The first
/// step has none; every later step wants its predecessor's record saved.
#[must_use]
pub fn prerequisite_met(step: WizardStep, project: Option<&Project>) -> bool {
    let Some(previous) = step.predecessor() else {
        return true;
    };
    project.is_some_and(|p| p.step_present(previous))
}

// =============================================================================
// SUBMISSION REQUESTS
// =============================================================================

/// Hook submissions only carry the hook's own fields; the content idea and
/// audience come from the saved idea record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSubmitRequest {
    pub hook_type: Option<String>,
    pub selected_hook: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSubmitRequest {
    #[serde(flatten)]
    pub fields: CaptionRequest,
    pub selected_caption: Option<String>,
}

// =============================================================================
// TOKEN LIFECYCLE
// =============================================================================

async fn begin(store: &RwLock<ProjectStore>, step: WizardStep) -> Result<uuid::Uuid, StepError> {
    let mut guard = store.write().await;
    if guard.current_project().is_none() {
        return Err(StepError::NoCurrentProject);
    }
    guard.set_loading(true);
    guard.set_error(None);
    Ok(guard.begin_request(step))
}

/// Settle the in-flight token, save the record, and advance the wizard.
async fn settle(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    step: WizardStep,
    token: uuid::Uuid,
    record: StepRecord,
    degraded: bool,
) -> Result<StepOutcome, StepError> {
    let mut guard = store.write().await;
    // A stale token must not touch the loading flag: the newer request for
    // this step (or the project switch that cancelled us) owns it now.
    if !guard.finish_request(step, token) {
        return Err(StepError::Superseded);
    }
    guard.set_loading(false);
    if let Err(e) = guard.update_step(record).await {
        guard.set_error(Some(e.to_string()));
        return Err(e.into());
    }
    let project = guard
        .current_project()
        .cloned()
        .ok_or(StepError::NoCurrentProject)?;
    drop(guard);

    let mut nav = navigator.write().await;
    if nav.current() == step {
        nav.next();
    }
    let current_step = nav.current();
    drop(nav);

    Ok(StepOutcome { project, current_step, degraded })
}

/// Preserve the original creation time when a step is re-submitted.
fn created_at_or(existing: Option<i64>, now: i64) -> i64 {
    existing.unwrap_or(now)
}

// =============================================================================
// CONTROLLERS
// =============================================================================

/// Analyze and save the idea step.
///
/// # Errors
///
/// Validation, missing current project, a superseded token, or a
/// persistence failure.
pub async fn submit_idea(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    llm: Option<&Arc<dyn LlmChat>>,
    request: &IdeaRequest,
) -> Result<StepOutcome, StepError> {
    let input = request.validate()?;
    let token = begin(store, WizardStep::Idea).await?;

    let outcome = suggest::analyze_idea(llm, &input).await;

    let now = now_ms();
    let existing = {
        let guard = store.read().await;
        guard
            .current_project()
            .and_then(|p| p.content_idea.as_ref().map(|r| r.created_at))
    };
    let record = ContentIdea {
        content_idea: input.content_idea,
        target_audience: input.target_audience,
        content_goal: input.content_goal,
        analysis: Some(outcome.payload),
        created_at: created_at_or(existing, now),
        updated_at: now,
    };
    settle(store, navigator, WizardStep::Idea, token, StepRecord::ContentIdea(record), outcome.degraded).await
}

/// Generate hooks and save the hook step. Reads the content idea and
/// audience from the saved idea record.
///
/// # Errors
///
/// `MissingFields` when the idea step has not been saved yet, plus the
/// usual validation/token/persistence failures.
pub async fn submit_hook(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    llm: Option<&Arc<dyn LlmChat>>,
    request: &HookSubmitRequest,
) -> Result<StepOutcome, StepError> {
    let hook_type = request
        .hook_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SuggestError::MissingFields)?
        .to_owned();

    let input = {
        let guard = store.read().await;
        let project = guard.current_project().ok_or(StepError::NoCurrentProject)?;
        let idea = project
            .content_idea
            .as_ref()
            .ok_or(SuggestError::MissingFields)?;
        HookInput {
            content_idea: idea.content_idea.clone(),
            hook_type: hook_type.clone(),
            target_audience: idea.target_audience.clone(),
        }
    };
    let token = begin(store, WizardStep::Hook).await?;

    let outcome = suggest::generate_hooks(llm, &input).await;

    let now = now_ms();
    let existing = {
        let guard = store.read().await;
        guard
            .current_project()
            .and_then(|p| p.hook.as_ref().map(|r| r.created_at))
    };
    let record = Hook {
        content_idea_id: None,
        hook_type,
        selected_hook: request
            .selected_hook
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        generated_hooks: Some(outcome.payload),
        created_at: created_at_or(existing, now),
        updated_at: now,
    };
    settle(store, navigator, WizardStep::Hook, token, StepRecord::Hook(record), outcome.degraded).await
}

/// Analyze and save the structure step.
///
/// # Errors
///
/// Validation, missing current project, a superseded token, or a
/// persistence failure.
pub async fn submit_structure(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    llm: Option<&Arc<dyn LlmChat>>,
    request: &StructureRequest,
) -> Result<StepOutcome, StepError> {
    let input = request.validate()?;
    let token = begin(store, WizardStep::Structure).await?;

    let outcome = suggest::analyze_structure(llm, &input).await;

    let now = now_ms();
    let existing = {
        let guard = store.read().await;
        guard
            .current_project()
            .and_then(|p| p.content_structure.as_ref().map(|r| r.created_at))
    };
    let record = ContentStructure {
        hook: input.hook,
        middle: input.middle,
        ending: input.ending,
        content_type: input.content_type,
        analysis: Some(outcome.payload),
        created_at: created_at_or(existing, now),
        updated_at: now,
    };
    settle(store, navigator, WizardStep::Structure, token, StepRecord::Structure(record), outcome.degraded).await
}

/// Generate captions and save the captions step.
///
/// # Errors
///
/// Validation, missing current project, a superseded token, or a
/// persistence failure.
pub async fn submit_captions(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    llm: Option<&Arc<dyn LlmChat>>,
    request: &CaptionSubmitRequest,
) -> Result<StepOutcome, StepError> {
    let input = request.fields.validate()?;
    let token = begin(store, WizardStep::Captions).await?;

    let outcome = suggest::generate_captions(llm, &input).await;

    let now = now_ms();
    let existing = {
        let guard = store.read().await;
        guard
            .current_project()
            .and_then(|p| p.caption.as_ref().map(|r| r.created_at))
    };
    let record = Caption {
        content_summary: input.content_summary,
        key_points: input.key_points,
        caption_style: input.caption_style,
        cta_type: input.cta_type,
        content_niche: input.content_niche,
        selected_caption: request
            .selected_caption
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        generated_captions: Some(outcome.payload),
        created_at: created_at_or(existing, now),
        updated_at: now,
    };
    settle(store, navigator, WizardStep::Captions, token, StepRecord::Caption(record), outcome.degraded).await
}

/// Analyze metrics and save the performance step.
///
/// # Errors
///
/// Validation (including named missing metrics), missing current project,
/// a superseded token, or a persistence failure.
pub async fn submit_performance(
    store: &RwLock<ProjectStore>,
    navigator: &RwLock<Navigator>,
    llm: Option<&Arc<dyn LlmChat>>,
    request: &PerformanceRequest,
) -> Result<StepOutcome, StepError> {
    let input = request.validate()?;
    let token = begin(store, WizardStep::Performance).await?;

    let outcome = suggest::analyze_performance(llm, &input).await;

    let now = now_ms();
    let existing = {
        let guard = store.read().await;
        guard
            .current_project()
            .and_then(|p| p.performance.as_ref().map(|r| r.created_at))
    };
    let record = Performance {
        metrics: input.metrics,
        content_category: input.content_category,
        platform: input.platform,
        time_frame: input.time_frame,
        analysis: Some(outcome.payload),
        created_at: created_at_or(existing, now),
        updated_at: now,
    };
    settle(store, navigator, WizardStep::Performance, token, StepRecord::Performance(record), outcome.degraded).await
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
