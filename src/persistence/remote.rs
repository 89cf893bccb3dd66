//! Remote document-store adapter — Postgres JSONB rows keyed by owner id.
//!
//! DESIGN
//! ======
//! Each project is one `projects` row: the full aggregate serialized into a
//! `doc` JSONB column, scoped by the owner id supplied by the identity
//! collaborator. The current-project pointer lives in its own single-row
//! table per owner. `save_all` runs in one transaction so a failed write
//! never leaves the stored collection half-replaced.

use sqlx::PgPool;
use uuid::Uuid;

use crate::model::Project;

use super::{PersistenceError, ProjectPersistence};

/// Postgres-backed adapter scoped to one owner.
pub struct RemoteStore {
    pool: PgPool,
    owner_id: Uuid,
}

impl RemoteStore {
    #[must_use]
    pub fn new(pool: PgPool, owner_id: Uuid) -> Self {
        Self { pool, owner_id }
    }

    /// Upsert one project document for this owner.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` on a database failure,
    /// `PersistenceError::Serialize` if the document cannot be encoded.
    pub async fn save_one(&self, project: &Project) -> Result<(), PersistenceError> {
        let doc = serde_json::to_value(project).map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        sqlx::query(
            r"INSERT INTO projects (id, owner_id, doc, created_at_ms, updated_at_ms)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (id) DO UPDATE
                  SET doc = EXCLUDED.doc, updated_at_ms = EXCLUDED.updated_at_ms
                  WHERE projects.owner_id = EXCLUDED.owner_id",
        )
        .bind(project.id)
        .bind(self.owner_id)
        .bind(&doc)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List all project documents owned by `owner_id`, oldest first.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` on a database failure.
    pub async fn list_by_owner(&self) -> Result<Vec<Project>, PersistenceError> {
        let rows = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT doc FROM projects WHERE owner_id = $1 ORDER BY created_at_ms ASC, id ASC",
        )
        .bind(self.owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(doc,)| serde_json::from_value::<Project>(doc).ok())
            .collect())
    }

    /// Fetch one owned project by id.
    ///
    /// # Errors
    ///
    /// `PersistenceError::NotFound` when the id does not exist for this
    /// owner, `PersistenceError::Unavailable` on a database failure.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Project, PersistenceError> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT doc FROM projects WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(self.owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PersistenceError::NotFound(id))?;

        serde_json::from_value(row.0).map_err(|e| PersistenceError::Serialize(e.to_string()))
    }

    /// Delete one owned project by id.
    ///
    /// # Errors
    ///
    /// `PersistenceError::NotFound` when nothing was deleted,
    /// `PersistenceError::Unavailable` on a database failure.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(self.owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectPersistence for RemoteStore {
    async fn save_all(&self, projects: &[Project], current: Option<Uuid>) -> Result<(), PersistenceError> {
        let mut docs = Vec::with_capacity(projects.len());
        for project in projects {
            let doc = serde_json::to_value(project).map_err(|e| PersistenceError::Serialize(e.to_string()))?;
            docs.push((project, doc));
        }

        let ids = projects.iter().map(|p| p.id).collect::<Vec<_>>();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM projects WHERE owner_id = $1 AND NOT (id = ANY($2))")
            .bind(self.owner_id)
            .bind(&ids)
            .execute(tx.as_mut())
            .await?;

        for (project, doc) in docs {
            sqlx::query(
                r"INSERT INTO projects (id, owner_id, doc, created_at_ms, updated_at_ms)
                  VALUES ($1, $2, $3, $4, $5)
                  ON CONFLICT (id) DO UPDATE
                      SET doc = EXCLUDED.doc, updated_at_ms = EXCLUDED.updated_at_ms
                      WHERE projects.owner_id = EXCLUDED.owner_id",
            )
            .bind(project.id)
            .bind(self.owner_id)
            .bind(&doc)
            .bind(project.created_at)
            .bind(project.updated_at)
            .execute(tx.as_mut())
            .await?;
        }

        match current {
            Some(project_id) => {
                sqlx::query(
                    r"INSERT INTO current_project (owner_id, project_id) VALUES ($1, $2)
                      ON CONFLICT (owner_id) DO UPDATE SET project_id = EXCLUDED.project_id",
                )
                .bind(self.owner_id)
                .bind(project_id)
                .execute(tx.as_mut())
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM current_project WHERE owner_id = $1")
                    .bind(self.owner_id)
                    .execute(tx.as_mut())
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<(Vec<Project>, Option<Uuid>), PersistenceError> {
        let projects = self.list_by_owner().await?;
        let current = sqlx::query_as::<_, (Uuid,)>("SELECT project_id FROM current_project WHERE owner_id = $1")
            .bind(self.owner_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id,)| id);
        Ok((projects, current))
    }
}
