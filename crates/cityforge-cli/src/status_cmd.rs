//! Print a project's status, progress, and recent narration.

use anyhow::{Context, Result};
use sqlx::PgPool;

use cityforge_db::queries::{buildings, comm_logs, projects, tasks};

pub async fn run_status(pool: &PgPool, project_id: i64) -> Result<()> {
    let project = projects::get_project(pool, project_id)
        .await?
        .with_context(|| format!("project {project_id} not found"))?;

    println!("Project {} - {}", project.id, project.name);
    println!("  status:  {}", project.status);
    if let Some(step) = &project.current_step {
        println!("  step:    {step}");
    }
    println!("  prompt:  {}", project.prompt);
    println!("  created: {}", project.created_at);

    let building_count = buildings::count_buildings_for_project(pool, project_id).await?;
    println!("  buildings: {building_count}");

    let tasks = tasks::list_tasks_for_project(pool, project_id).await?;
    if !tasks.is_empty() {
        println!("\nTasks:");
        for task in &tasks {
            println!("  [{}] {} - {}", task.status, task.role, task.description);
        }
    }

    let logs = comm_logs::list_logs_for_project(pool, project_id).await?;
    if !logs.is_empty() {
        println!("\nRecent narration (newest first):");
        for log in logs.iter().take(5) {
            println!("  {} -> {}: {}", log.from_agent, log.to_agent, log.message);
        }
    }

    Ok(())
}
