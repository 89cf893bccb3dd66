//! Project store — single source of truth for the project collection.
//!
//! DESIGN
//! ======
//! An in-memory, observable collection of projects plus a single
//! current-project pointer. Every mutation computes the next state, persists
//! the full collection through the adapter, and only then commits in memory
//! — observers and storage never disagree, and a failed write leaves the
//! in-memory state untouched.
//!
//! Observers subscribe to a `watch` revision counter bumped on every
//! committed change, transient flags included.
//!
//! ERROR HANDLING
//! ==============
//! Precondition violations (empty title, no current project, unknown id)
//! surface as typed `StoreError` variants instead of the original's silent
//! no-ops; either way the collection is untouched.

use std::collections::HashMap;

use tokio::sync::watch;
use uuid::Uuid;

use crate::model::{Project, StepRecord};
use crate::persistence::{PersistenceError, ProjectPersistence};
use crate::wizard::WizardStep;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `create_project` called with an empty or whitespace-only title.
    #[error("project title must not be empty")]
    EmptyTitle,

    /// A step write was attempted with no project selected.
    #[error("no current project selected")]
    NoCurrentProject,

    /// The named project does not exist in the collection.
    #[error("project not found: {0}")]
    NotFound(Uuid),

    /// The persistence adapter rejected the write; nothing was applied.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Observable project collection with write-through persistence.
pub struct ProjectStore {
    projects: Vec<Project>,
    current_id: Option<Uuid>,
    loading: bool,
    error: Option<String>,
    /// Active AI request token per step. A response whose token no longer
    /// matches is stale and must be discarded by the caller. Cleared
    /// whenever the current pointer moves to a different project.
    pending_requests: HashMap<WizardStep, Uuid>,
    persistence: Box<dyn ProjectPersistence>,
    revision: watch::Sender<u64>,
}

impl ProjectStore {
    /// Build an empty store over the given adapter. Call [`Self::initialize`]
    /// to load persisted state — construction has no side effects, so tests
    /// get a fresh store per case.
    #[must_use]
    pub fn new(persistence: Box<dyn ProjectPersistence>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            projects: Vec::new(),
            current_id: None,
            loading: false,
            error: None,
            pending_requests: HashMap::new(),
            persistence,
            revision,
        }
    }

    /// Subscribe to mutation notifications.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Load the collection from the adapter, replacing in-memory state.
    /// Idempotent: repeated calls simply reload.
    ///
    /// # Errors
    ///
    /// `StoreError::Persistence` when the backend cannot be reached.
    pub async fn initialize(&mut self) -> Result<(), StoreError> {
        let previous = self.current_id;
        let (projects, current) = self.persistence.load_all().await?;
        // A dangling pointer (project deleted out from under us) unsets it.
        self.current_id = current.filter(|id| projects.iter().any(|p| p.id == *id));
        self.projects = projects;
        self.cancel_requests_if_switched(previous);
        self.bump();
        Ok(())
    }

    /// Create a project, append it, select it as current, and persist.
    ///
    /// # Errors
    ///
    /// `StoreError::EmptyTitle` for empty or whitespace titles;
    /// `StoreError::Persistence` when the write fails (nothing applied).
    pub async fn create_project(&mut self, title: &str) -> Result<Project, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let project = Project::new(title);
        let mut next = self.projects.clone();
        next.push(project.clone());

        let previous = self.current_id;
        self.persistence.save_all(&next, Some(project.id)).await?;
        self.projects = next;
        self.current_id = Some(project.id);
        self.cancel_requests_if_switched(previous);
        self.bump();
        Ok(project)
    }

    /// Select the current project by id.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when the id is not in the collection; the
    /// current pointer is left unchanged.
    pub async fn select_project(&mut self, id: Uuid) -> Result<(), StoreError> {
        if !self.projects.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound(id));
        }
        let previous = self.current_id;
        self.persistence.save_all(&self.projects, Some(id)).await?;
        self.current_id = Some(id);
        self.cancel_requests_if_switched(previous);
        self.bump();
        Ok(())
    }

    /// Merge imported projects into the collection and persist. Entries
    /// with a known id replace the stored copy; the rest are appended. The
    /// current pointer is untouched.
    ///
    /// # Errors
    ///
    /// `StoreError::Persistence` when the write fails (nothing applied).
    pub async fn import_projects(&mut self, imported: Vec<Project>) -> Result<(), StoreError> {
        let mut next = self.projects.clone();
        for project in imported {
            match next.iter_mut().find(|p| p.id == project.id) {
                Some(existing) => *existing = project,
                None => next.push(project),
            }
        }

        self.persistence.save_all(&next, self.current_id).await?;
        self.projects = next;
        self.bump();
        Ok(())
    }

    /// Replace the record's step slot on the current project and persist.
    ///
    /// # Errors
    ///
    /// `StoreError::NoCurrentProject` when nothing is selected;
    /// `StoreError::Persistence` when the write fails (nothing applied).
    pub async fn update_step(&mut self, record: StepRecord) -> Result<(), StoreError> {
        let current_id = self.current_id.ok_or(StoreError::NoCurrentProject)?;
        let index = self
            .projects
            .iter()
            .position(|p| p.id == current_id)
            .ok_or(StoreError::NotFound(current_id))?;

        let mut next = self.projects.clone();
        next[index].apply_step(record);

        self.persistence.save_all(&next, self.current_id).await?;
        self.projects = next;
        self.bump();
        Ok(())
    }

    /// Remove a project. Clears the current pointer if it pointed there.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when the id is absent;
    /// `StoreError::Persistence` when the write fails (nothing applied).
    pub async fn delete_project(&mut self, id: Uuid) -> Result<(), StoreError> {
        if !self.projects.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound(id));
        }

        let next = self.projects.iter().filter(|p| p.id != id).cloned().collect::<Vec<_>>();
        let next_current = self.current_id.filter(|current| *current != id);

        let previous = self.current_id;
        self.persistence.save_all(&next, next_current).await?;
        self.projects = next;
        self.current_id = next_current;
        self.cancel_requests_if_switched(previous);
        self.bump();
        Ok(())
    }

    /// Transient UI loading flag. Not persisted.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.bump();
    }

    /// Transient UI error flag. Not persisted.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.bump();
    }

    // =========================================================================
    // AI REQUEST TOKENS
    // =========================================================================

    /// Start an AI request for a step, superseding any in-flight one.
    pub fn begin_request(&mut self, step: WizardStep) -> Uuid {
        let token = Uuid::new_v4();
        self.pending_requests.insert(step, token);
        token
    }

    /// Invalidate every in-flight token when the current pointer moved.
    /// A request begun against one project must not settle onto another.
    fn cancel_requests_if_switched(&mut self, previous: Option<Uuid>) {
        if self.current_id != previous && !self.pending_requests.is_empty() {
            self.pending_requests.clear();
            self.loading = false;
        }
    }

    /// Settle an AI request. Returns `true` when the token still matches the
    /// active request for the step; a stale token returns `false` and the
    /// caller must discard the response.
    pub fn finish_request(&mut self, step: WizardStep, token: Uuid) -> bool {
        if self.pending_requests.get(&step) == Some(&token) {
            self.pending_requests.remove(&step);
            true
        } else {
            false
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_id?;
        self.projects.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn current_project_id(&self) -> Option<Uuid> {
        self.current_id
    }

    /// Step-completion count for a project, `None` when the id is unknown.
    #[must_use]
    pub fn progress_of(&self, id: Uuid) -> Option<usize> {
        self.projects.iter().find(|p| p.id == id).map(Project::progress)
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
