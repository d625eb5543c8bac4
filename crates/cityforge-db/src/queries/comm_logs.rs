//! Query functions for the `communication_logs` table.
//!
//! The log is append-only. Insertion order is the total order; the read
//! query returns newest-first, and consumers that need chronological order
//! reverse the result themselves.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::CommunicationLog;

/// Append one narration entry.
pub async fn insert_log(
    pool: &PgPool,
    project_id: i64,
    from_agent: &str,
    to_agent: &str,
    message: &str,
) -> Result<CommunicationLog> {
    let log = sqlx::query_as::<_, CommunicationLog>(
        "INSERT INTO communication_logs (project_id, from_agent, to_agent, message) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(project_id)
    .bind(from_agent)
    .bind(to_agent)
    .bind(message)
    .fetch_one(pool)
    .await
    .context("failed to append communication log")?;

    Ok(log)
}

/// List all narration entries for a project, newest first.
pub async fn list_logs_for_project(
    pool: &PgPool,
    project_id: i64,
) -> Result<Vec<CommunicationLog>> {
    let logs = sqlx::query_as::<_, CommunicationLog>(
        "SELECT * FROM communication_logs WHERE project_id = $1 ORDER BY id DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list communication logs")?;

    Ok(logs)
}
