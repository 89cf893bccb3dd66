//! Project aggregate and wizard step sub-records.
//!
//! DESIGN
//! ======
//! A `Project` owns up to five optional step sub-records, one per wizard
//! step. Sub-records are replaced wholesale when a step is saved — there is
//! no partial-field patching. All `analysis` / `generated_*` payloads are
//! opaque `serde_json::Value` blobs: the verbatim result of the last
//! AI-suggestion call, stored but never interpreted by the core.
//!
//! JSON field names are camelCase to stay byte-compatible with the persisted
//! collection format (`vcw_projects`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::wizard::WizardStep;

/// Milliseconds since the Unix epoch. Clamps to 0 on a pre-epoch clock.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(duration) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}

// =============================================================================
// STEP SUB-RECORDS
// =============================================================================

/// Idea step: the raw concept plus the last analysis payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdea {
    pub content_idea: String,
    pub target_audience: String,
    pub content_goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Hook step. `content_idea_id` is a denormalized display hint back to the
/// sibling idea record; it is never validated against the parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_idea_id: Option<Uuid>,
    pub hook_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_hook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_hooks: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Structure step: hook / middle / ending beats plus the last analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStructure {
    pub hook: String,
    pub middle: String,
    pub ending: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Captions step inputs plus the generated captions/hashtags payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub content_summary: String,
    pub key_points: Vec<String>,
    pub caption_style: String,
    pub cta_type: String,
    pub content_niche: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_captions: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Raw performance numbers entered by the user. `watch_time` is a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
    pub watch_time: f64,
    pub followers_gained: u64,
    pub profile_visits: u64,
}

/// Performance step: metrics + context plus the last analysis payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub metrics: PerformanceMetrics,
    pub content_category: String,
    pub platform: String,
    pub time_frame: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// STEP RECORD
// =============================================================================

/// A saved wizard step payload. Each variant names the step slot it replaces.
#[derive(Debug, Clone)]
pub enum StepRecord {
    ContentIdea(ContentIdea),
    Hook(Hook),
    Structure(ContentStructure),
    Caption(Caption),
    Performance(Performance),
}

impl StepRecord {
    /// The wizard step this record belongs to.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        match self {
            Self::ContentIdea(_) => WizardStep::Idea,
            Self::Hook(_) => WizardStep::Hook,
            Self::Structure(_) => WizardStep::Structure,
            Self::Caption(_) => WizardStep::Captions,
            Self::Performance(_) => WizardStep::Performance,
        }
    }
}

// =============================================================================
// PROJECT
// =============================================================================

/// Root aggregate: one unit of work the user drafts through the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_idea: Option<ContentIdea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<Hook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_structure: Option<ContentStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    /// Build a fresh project with a new unique id and no step records.
    #[must_use]
    pub fn new(title: &str) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            content_idea: None,
            hook: None,
            content_structure: None,
            caption: None,
            performance: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of step sub-records present (0..=5).
    #[must_use]
    pub fn progress(&self) -> usize {
        WizardStep::ALL
            .iter()
            .filter(|step| self.step_present(**step))
            .count()
    }

    /// Whether the sub-record for `step` exists.
    #[must_use]
    pub fn step_present(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Idea => self.content_idea.is_some(),
            WizardStep::Hook => self.hook.is_some(),
            WizardStep::Structure => self.content_structure.is_some(),
            WizardStep::Captions => self.caption.is_some(),
            WizardStep::Performance => self.performance.is_some(),
        }
    }

    /// Replace the named step slot wholesale and refresh `updated_at`.
    ///
    /// `updated_at` advances strictly even when two mutations land within
    /// the same millisecond.
    pub fn apply_step(&mut self, record: StepRecord) {
        match record {
            StepRecord::ContentIdea(idea) => self.content_idea = Some(idea),
            StepRecord::Hook(hook) => self.hook = Some(hook),
            StepRecord::Structure(structure) => self.content_structure = Some(structure),
            StepRecord::Caption(caption) => self.caption = Some(caption),
            StepRecord::Performance(performance) => self.performance = Some(performance),
        }
        self.touch();
    }

    /// Advance `updated_at`, strictly past its previous value.
    pub fn touch(&mut self) {
        self.updated_at = now_ms().max(self.updated_at.saturating_add(1));
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
