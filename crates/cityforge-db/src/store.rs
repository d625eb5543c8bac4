//! The `ProjectStore` trait -- the persistence interface the execution
//! engine is written against.
//!
//! The orchestrator never touches a connection pool directly; it sees only
//! these create/read/update calls. [`PgStore`] is the production
//! implementation over PostgreSQL. Tests substitute an in-memory store with
//! fault-injection hooks.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{AgentRole, AgentTask, Building, CommunicationLog, Project, ProjectStatus, TaskStatus};
use crate::queries::buildings::NewBuilding;
use crate::queries::{buildings, comm_logs, projects, tasks};

/// Persistence interface for projects and everything they own.
///
/// # Object Safety
///
/// The trait is object-safe so callers can hold `Arc<dyn ProjectStore>`
/// across spawned execution sequences.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create a project in the `pending` state. `owner_id` 0 is anonymous.
    async fn create_project(&self, owner_id: i64, name: &str, prompt: &str) -> Result<Project>;

    /// Fetch a project, or `None` when absent.
    async fn get_project(&self, id: i64) -> Result<Option<Project>>;

    /// List an owner's projects, newest first.
    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>>;

    /// Update a project's status, optionally relabelling the current step.
    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
        step: Option<&str>,
    ) -> Result<()>;

    /// Materialize one building. Buildings are immutable once created.
    async fn create_building(&self, building: &NewBuilding) -> Result<Building>;

    /// List a project's buildings in creation order.
    async fn list_buildings(&self, project_id: i64) -> Result<Vec<Building>>;

    /// Create a task record in the `in_progress` state.
    async fn create_task(
        &self,
        project_id: i64,
        role: AgentRole,
        model: &str,
        description: &str,
    ) -> Result<AgentTask>;

    /// List a project's tasks in creation order.
    async fn list_tasks(&self, project_id: i64) -> Result<Vec<AgentTask>>;

    /// Move a task to a new status, recording output and artifact text.
    async fn set_task_status(
        &self,
        id: i64,
        status: TaskStatus,
        output: Option<&str>,
        artifact: Option<&str>,
    ) -> Result<()>;

    /// Append one narration entry to the project's communication log.
    async fn append_log(
        &self,
        project_id: i64,
        from_agent: &str,
        to_agent: &str,
        message: &str,
    ) -> Result<()>;

    /// List a project's narration entries, newest first.
    async fn list_logs(&self, project_id: i64) -> Result<Vec<CommunicationLog>>;
}

// Compile-time assertion: ProjectStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ProjectStore) {}
};

/// PostgreSQL-backed [`ProjectStore`] over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (read handlers use query functions
    /// directly).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, owner_id: i64, name: &str, prompt: &str) -> Result<Project> {
        projects::insert_project(&self.pool, owner_id, name, prompt).await
    }

    async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        projects::get_project(&self.pool, id).await
    }

    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>> {
        projects::list_projects_for_owner(&self.pool, owner_id).await
    }

    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
        step: Option<&str>,
    ) -> Result<()> {
        projects::update_project_status(&self.pool, id, status, step).await
    }

    async fn create_building(&self, building: &NewBuilding) -> Result<Building> {
        buildings::insert_building(&self.pool, building).await
    }

    async fn list_buildings(&self, project_id: i64) -> Result<Vec<Building>> {
        buildings::list_buildings_for_project(&self.pool, project_id).await
    }

    async fn create_task(
        &self,
        project_id: i64,
        role: AgentRole,
        model: &str,
        description: &str,
    ) -> Result<AgentTask> {
        tasks::insert_task(&self.pool, project_id, role, model, description).await
    }

    async fn list_tasks(&self, project_id: i64) -> Result<Vec<AgentTask>> {
        tasks::list_tasks_for_project(&self.pool, project_id).await
    }

    async fn set_task_status(
        &self,
        id: i64,
        status: TaskStatus,
        output: Option<&str>,
        artifact: Option<&str>,
    ) -> Result<()> {
        tasks::update_task_status(&self.pool, id, status, output, artifact).await
    }

    async fn append_log(
        &self,
        project_id: i64,
        from_agent: &str,
        to_agent: &str,
        message: &str,
    ) -> Result<()> {
        comm_logs::insert_log(&self.pool, project_id, from_agent, to_agent, message).await?;
        Ok(())
    }

    async fn list_logs(&self, project_id: i64) -> Result<Vec<CommunicationLog>> {
        comm_logs::list_logs_for_project(&self.pool, project_id).await
    }
}
