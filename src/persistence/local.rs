//! Local key-value adapter — JSON files in a data directory.
//!
//! Mirrors the browser-local storage contract of the original application:
//! one namespaced key for the serialized project collection and one for the
//! current-project id, both JSON-encoded strings.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::model::Project;

use super::{PersistenceError, ProjectPersistence};

const PROJECTS_KEY: &str = "vcw_projects";
const CURRENT_PROJECT_KEY: &str = "vcw_current_project";

/// File-backed key-value store rooted at a data directory.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Write a key atomically: temp file in the same directory, then rename.
    /// A crash mid-write leaves the previous value intact.
    async fn write_key(&self, key: &str, contents: &str) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;

        let tmp = self.key_path(&format!("{key}.tmp"));
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, self.key_path(key))
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        tokio::fs::read_to_string(self.key_path(key)).await.ok()
    }

    async fn remove_key(&self, key: &str) {
        let _ = tokio::fs::remove_file(self.key_path(key)).await;
    }
}

#[async_trait::async_trait]
impl ProjectPersistence for LocalStore {
    async fn save_all(&self, projects: &[Project], current: Option<Uuid>) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(projects).map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        self.write_key(PROJECTS_KEY, &encoded).await?;

        match current {
            Some(id) => {
                let encoded_id =
                    serde_json::to_string(&id).map_err(|e| PersistenceError::Serialize(e.to_string()))?;
                self.write_key(CURRENT_PROJECT_KEY, &encoded_id).await?;
            }
            None => self.remove_key(CURRENT_PROJECT_KEY).await,
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<(Vec<Project>, Option<Uuid>), PersistenceError> {
        let projects = match self.read_key(PROJECTS_KEY).await {
            Some(raw) => match serde_json::from_str::<Vec<Project>>(&raw) {
                Ok(projects) => projects,
                Err(e) => {
                    // Corrupt data is treated as absent data, not a fatal error.
                    warn!(error = %e, path = %self.key_path(PROJECTS_KEY).display(), "stored projects unreadable; starting empty");
                    return Ok((Vec::new(), None));
                }
            },
            None => Vec::new(),
        };

        let current = match self.read_key(CURRENT_PROJECT_KEY).await {
            Some(raw) => serde_json::from_str::<Uuid>(&raw).ok(),
            None => None,
        };

        Ok((projects, current))
    }
}

/// Resolve the data directory from `DATA_DIR` (default `./data`).
#[must_use]
pub fn data_dir_from_env() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new("data").to_path_buf())
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
