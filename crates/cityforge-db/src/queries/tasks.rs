//! Query functions for the `agent_tasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{AgentRole, AgentTask, TaskStatus};

/// Insert a new task row. Tasks start `in_progress` with `started_at` set,
/// because a task record is only created at the moment the role begins work.
pub async fn insert_task(
    pool: &PgPool,
    project_id: i64,
    role: AgentRole,
    model: &str,
    description: &str,
) -> Result<AgentTask> {
    let task = sqlx::query_as::<_, AgentTask>(
        "INSERT INTO agent_tasks (project_id, role, model, description, status, input, started_at) \
         VALUES ($1, $2, $3, $4, 'in_progress', $4, now()) \
         RETURNING *",
    )
    .bind(project_id)
    .bind(role)
    .bind(model)
    .bind(description)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert {role} task"))?;

    Ok(task)
}

/// Fetch a single task by ID.
pub async fn get_task(pool: &PgPool, id: i64) -> Result<Option<AgentTask>> {
    let task = sqlx::query_as::<_, AgentTask>("SELECT * FROM agent_tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// List all tasks for a project in creation order.
pub async fn list_tasks_for_project(pool: &PgPool, project_id: i64) -> Result<Vec<AgentTask>> {
    let tasks = sqlx::query_as::<_, AgentTask>(
        "SELECT * FROM agent_tasks WHERE project_id = $1 ORDER BY id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for project")?;

    Ok(tasks)
}

/// Move a task to a terminal status, recording its output and artifact.
///
/// Sets `completed_at` when the target status is terminal. The caller is
/// responsible for only moving `in_progress` tasks; tasks never re-enter
/// `in_progress`.
pub async fn update_task_status(
    pool: &PgPool,
    id: i64,
    status: TaskStatus,
    output: Option<&str>,
    artifact: Option<&str>,
) -> Result<()> {
    let terminal = matches!(status, TaskStatus::Completed | TaskStatus::Failed);
    let result = sqlx::query(
        "UPDATE agent_tasks \
         SET status = $1, \
             output = COALESCE($2, output), \
             artifact = COALESCE($3, artifact), \
             completed_at = CASE WHEN $4 THEN now() ELSE completed_at END \
         WHERE id = $5",
    )
    .bind(status)
    .bind(output)
    .bind(artifact)
    .bind(terminal)
    .bind(id)
    .execute(pool)
    .await
    .context("failed to update task status")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("task {id} not found");
    }

    Ok(())
}
