//! Persistence adapters — durable storage for the project collection.
//!
//! DESIGN
//! ======
//! The store talks to storage through one narrow seam: save the whole
//! collection plus the current-project pointer, or load them back. Guest
//! usage is backed by a local JSON key-value directory; authenticated usage
//! swaps in a Postgres document store scoped by owner id.
//!
//! ERROR HANDLING
//! ==============
//! Absent or corrupt stored data loads as an empty collection, never as an
//! error. Failed writes surface `PersistenceError::Unavailable` and the
//! caller's in-memory state stays untouched — a write is never half-applied.

pub mod local;
pub mod remote;

use uuid::Uuid;

use crate::model::Project;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backend could not be reached or the write failed.
    #[error("persistence backend unavailable: {0}")]
    Unavailable(String),

    /// A document-store lookup missed.
    #[error("project not found: {0}")]
    NotFound(Uuid),

    /// The collection could not be serialized for storage.
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Swappable durable backend for the project collection.
#[async_trait::async_trait]
pub trait ProjectPersistence: Send + Sync {
    /// Overwrite the entire stored collection and current-project pointer.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` when the backend write fails; the
    /// stored state is then unchanged.
    async fn save_all(&self, projects: &[Project], current: Option<Uuid>) -> Result<(), PersistenceError>;

    /// Load the stored collection and current-project pointer.
    ///
    /// Nothing stored, or corrupt stored data, yields `(vec![], None)`.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` when the backend cannot be reached.
    async fn load_all(&self) -> Result<(Vec<Project>, Option<Uuid>), PersistenceError>;
}
