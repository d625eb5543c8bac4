//! Shared test utilities for cityforge integration tests.
//!
//! Two halves:
//! - A PostgreSQL instance shared across tests, each test getting its own
//!   database within it. With `CITYFORGE_TEST_PG_URL` set (CI setup script)
//!   the external server is used directly; otherwise a container is started
//!   via testcontainers and shared per binary through a `OnceCell`.
//! - [`MemoryStore`], an in-memory [`ProjectStore`] with fault-injection
//!   hooks, for execution-engine tests that need deterministic storage
//!   failures no real database can produce on cue.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use cityforge_db::models::{
    AgentRole, AgentTask, Building, CommunicationLog, Project, ProjectStatus, TaskStatus,
};
use cityforge_db::pool;
use cityforge_db::queries::buildings::NewBuilding;
use cityforge_db::store::ProjectStore;

// ---------------------------------------------------------------------------
// Shared PostgreSQL
// ---------------------------------------------------------------------------

/// Shared container state: base URL and optional container handle (kept alive).
struct SharedPg {
    base_url: String,
    /// Held to keep the container alive. `None` when using an external URL.
    _container: Option<ContainerAsync<Postgres>>,
}

/// Lazily-initialized shared PostgreSQL.
static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    // If a setup script already started a container, use that directly.
    if let Ok(url) = std::env::var("CITYFORGE_TEST_PG_URL") {
        return SharedPg {
            base_url: url,
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("18")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    let base_url = format!("postgresql://postgres:postgres@{host}:{port}");

    SharedPg {
        base_url,
        _container: Some(container),
    }
}

/// Base URL for the shared PostgreSQL.
///
/// Lazily starts a container on first call (unless `CITYFORGE_TEST_PG_URL`
/// is set). The URL points at the server root (no database name appended).
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

/// Create a temporary database with migrations applied.
///
/// Returns `(pool, db_name)`. The pool connects to a uniquely-named
/// database within the shared instance. Call [`drop_test_db`] with the
/// returned `db_name` when the test is done.
pub async fn create_test_db() -> (PgPool, String) {
    let base_url = pg_url().await;

    // Connect to the default "postgres" database to issue CREATE DATABASE.
    let maint_url = format!("{base_url}/postgres");
    let maint_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database in container");

    let db_name = format!("cityforge_test_{}", Uuid::new_v4().simple());
    let stmt = format!("CREATE DATABASE {db_name}");
    maint_pool
        .execute(stmt.as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create temp database {db_name}: {e}"));
    maint_pool.close().await;

    // Connect to the new database and run migrations.
    let temp_url = format!("{base_url}/{db_name}");
    let temp_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&temp_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to temp database {db_name}: {e}"));

    pool::run_migrations(&temp_pool)
        .await
        .expect("migrations should succeed");

    (temp_pool, db_name)
}

/// Drop a temporary database.
///
/// Terminates existing connections and drops the database. Safe to call
/// even if the database was already dropped.
pub async fn drop_test_db(db_name: &str) {
    let base_url = pg_url().await;
    let maint_url = format!("{base_url}/postgres");

    let maint_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database for cleanup");

    // Terminate existing connections first.
    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint_pool.execute(terminate.as_str()).await;

    let stmt = format!("DROP DATABASE IF EXISTS {db_name}");
    let _ = maint_pool.execute(stmt.as_str()).await;
    maint_pool.close().await;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    projects: Vec<Project>,
    buildings: Vec<Building>,
    tasks: Vec<AgentTask>,
    logs: Vec<CommunicationLog>,
    building_calls: usize,
}

impl MemoryInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`ProjectStore`] for execution-engine tests.
///
/// `fail_building_at(n)` makes the nth `create_building` call (1-based)
/// return an error, for sequence-failure tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_building_at: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the nth call to `create_building` (1-based).
    pub fn fail_building_at(n: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryInner::default()),
            fail_building_at: Some(n),
        }
    }

    /// Number of `create_building` calls made so far (including the failed
    /// one, if any).
    pub fn building_calls(&self) -> usize {
        self.inner.lock().unwrap().building_calls
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, owner_id: i64, name: &str, prompt: &str) -> Result<Project> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let project = Project {
            id: inner.next_id(),
            owner_id,
            name: name.to_owned(),
            prompt: prompt.to_owned(),
            status: ProjectStatus::Pending,
            current_step: None,
            created_at: now,
            updated_at: now,
        };
        inner.projects.push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>> {
        let inner = self.inner.lock().unwrap();
        let mut projects: Vec<Project> = inner
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.reverse();
        Ok(projects)
    }

    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
        step: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let Some(project) = inner.projects.iter_mut().find(|p| p.id == id) else {
            bail!("project {id} not found");
        };
        project.status = status;
        if let Some(step) = step {
            project.current_step = Some(step.to_owned());
        }
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn create_building(&self, building: &NewBuilding) -> Result<Building> {
        let mut inner = self.inner.lock().unwrap();
        inner.building_calls += 1;
        if self.fail_building_at == Some(inner.building_calls) {
            bail!("storage backend unavailable");
        }
        let row = Building {
            id: inner.next_id(),
            project_id: building.project_id,
            name: building.name.clone(),
            kind: building.kind,
            position_x: building.position_x,
            position_y: building.position_y,
            position_z: building.position_z,
            width: building.width,
            height: building.height,
            depth: building.depth,
            color: building.color.clone(),
            created_at: Utc::now(),
        };
        inner.buildings.push(row.clone());
        Ok(row)
    }

    async fn list_buildings(&self, project_id: i64) -> Result<Vec<Building>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .buildings
            .iter()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_task(
        &self,
        project_id: i64,
        role: AgentRole,
        model: &str,
        description: &str,
    ) -> Result<AgentTask> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let task = AgentTask {
            id: inner.next_id(),
            project_id,
            role,
            model: model.to_owned(),
            description: description.to_owned(),
            status: TaskStatus::InProgress,
            input: Some(description.to_owned()),
            output: None,
            artifact: None,
            started_at: Some(now),
            completed_at: None,
            created_at: now,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, project_id: i64) -> Result<Vec<AgentTask>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn set_task_status(
        &self,
        id: i64,
        status: TaskStatus,
        output: Option<&str>,
        artifact: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
            bail!("task {id} not found");
        };
        task.status = status;
        if let Some(output) = output {
            task.output = Some(output.to_owned());
        }
        if let Some(artifact) = artifact {
            task.artifact = Some(artifact.to_owned());
        }
        if matches!(status, TaskStatus::Completed | TaskStatus::Failed) {
            task.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn append_log(
        &self,
        project_id: i64,
        from_agent: &str,
        to_agent: &str,
        message: &str,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let log = CommunicationLog {
            id: inner.next_id(),
            project_id,
            from_agent: from_agent.to_owned(),
            to_agent: to_agent.to_owned(),
            message: message.to_owned(),
            created_at: Utc::now(),
        };
        inner.logs.push(log);
        Ok(())
    }

    async fn list_logs(&self, project_id: i64) -> Result<Vec<CommunicationLog>> {
        let inner = self.inner.lock().unwrap();
        let mut logs: Vec<CommunicationLog> = inner
            .logs
            .iter()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect();
        logs.reverse();
        Ok(logs)
    }
}
