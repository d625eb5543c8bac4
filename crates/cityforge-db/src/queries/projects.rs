//! Query functions for the `projects` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{Project, ProjectStatus};

/// Insert a new project row in the `pending` state. Returns the inserted
/// project with server-generated defaults (id, status, timestamps).
///
/// `owner_id` 0 is the anonymous sentinel.
pub async fn insert_project(
    pool: &PgPool,
    owner_id: i64,
    name: &str,
    prompt: &str,
) -> Result<Project> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (owner_id, name, prompt) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(owner_id)
    .bind(name)
    .bind(prompt)
    .fetch_one(pool)
    .await
    .context("failed to insert project")?;

    Ok(project)
}

/// Fetch a single project by ID.
pub async fn get_project(pool: &PgPool, id: i64) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch project")?;

    Ok(project)
}

/// List all projects for an owner, newest first.
pub async fn list_projects_for_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE owner_id = $1 ORDER BY id DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("failed to list projects for owner")?;

    Ok(projects)
}

/// Update a project's status and (optionally) its current step label.
///
/// When `step` is `None` the existing label is left in place, so terminal
/// transitions keep the last role boundary visible to readers.
pub async fn update_project_status(
    pool: &PgPool,
    id: i64,
    status: ProjectStatus,
    step: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE projects \
         SET status = $1, current_step = COALESCE($2, current_step), updated_at = now() \
         WHERE id = $3",
    )
    .bind(status)
    .bind(step)
    .bind(id)
    .execute(pool)
    .await
    .context("failed to update project status")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("project {id} not found");
    }

    Ok(())
}
