//! The phase executor: walks a plan phase by phase, materializing each
//! structure in order while advancing project status and appending
//! narration.
//!
//! The whole sequence is designed to run detached from the request that
//! triggered it ([`spawn_project_build`]); every failure lands in the
//! project's terminal state rather than an unhandled background error.

pub mod narration;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cityforge_db::models::{AgentRole, ProjectStatus, TaskStatus};
use cityforge_db::queries::buildings::NewBuilding;
use cityforge_db::store::ProjectStore;

use crate::llm::{ChatMessage, CompletionClient};
use crate::plan::types::{CityPlan, PlannedBuilding};
use crate::plan::{fallback, parser, prompt, schema, spatial};
use crate::roles::model_label;

pub use narration::NarrationStyle;

/// Configuration for one build sequence.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How much inter-role dialogue to append.
    pub narration: NarrationStyle,
    /// Delay after each narration entry, for human-watchable pacing.
    /// Zero disables pacing entirely.
    pub pacing: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            narration: NarrationStyle::Full,
            pacing: Duration::from_millis(800),
        }
    }
}

impl OrchestratorConfig {
    /// No pacing, summary narration. Used by tests and one-shot CLI runs.
    pub fn quiet() -> Self {
        Self {
            narration: NarrationStyle::Summary,
            pacing: Duration::ZERO,
        }
    }
}

/// Result of a completed build sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Buildings materialized; equals the plan's total entity count.
    pub buildings_created: usize,
    /// Number of phases executed.
    pub phases: usize,
    /// Whether the deterministic fallback plan was substituted.
    pub used_fallback: bool,
}

/// Canned design artifacts attached to the informational role tasks.
const DATABASE_ARTIFACT: &str = "\
-- Buildings schema with spatial columns and phase-ordered reads
CREATE TABLE buildings (
  id BIGSERIAL PRIMARY KEY,
  project_id BIGINT NOT NULL REFERENCES projects (id),
  name TEXT NOT NULL,
  kind TEXT NOT NULL CHECK (kind IN ('office', 'park', 'residential', 'commercial')),
  position_x DOUBLE PRECISION NOT NULL,
  position_y DOUBLE PRECISION NOT NULL,
  position_z DOUBLE PRECISION NOT NULL,
  width  DOUBLE PRECISION NOT NULL,
  height DOUBLE PRECISION NOT NULL,
  depth  DOUBLE PRECISION NOT NULL,
  color TEXT NOT NULL,
  created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX idx_buildings_project ON buildings (project_id, id);";

const BACKEND_ARTIFACT: &str = "\
# Poll-based read surface
POST /api/projects                     create a project
POST /api/projects/{id}/build          schedule the build sequence
GET  /api/projects/{id}                project status and current step
GET  /api/projects/{id}/buildings      buildings in creation order
GET  /api/projects/{id}/tasks          role tasks
GET  /api/projects/{id}/logs           narration, newest first";

const FRONTEND_ARTIFACT: &str = "\
// Scene: dark grid ground plane, ambient + directional light, orbit controls.
// Buildings render as boxes at (x, height / 2, z) scaled to width x height x depth,
// tinted with the stored color and scaled up over ~2s when they first appear.
// Poll GET /buildings; anything new since the last poll gets the grow animation.";

/// Run a build sequence to its terminal state.
///
/// On any unrecovered error the project is marked `failed` and the error is
/// re-raised to the invoking context. Already-created buildings and tasks
/// are left in place: the consistent prefix is the documented failure
/// artifact.
pub async fn run_project_build(
    store: &dyn ProjectStore,
    llm: &dyn CompletionClient,
    config: &OrchestratorConfig,
    project_id: i64,
) -> Result<BuildOutcome> {
    match execute_sequence(store, llm, config, project_id).await {
        Ok(outcome) => {
            tracing::info!(
                project_id,
                buildings = outcome.buildings_created,
                phases = outcome.phases,
                used_fallback = outcome.used_fallback,
                "build sequence completed"
            );
            Ok(outcome)
        }
        Err(err) => {
            if let Err(status_err) = store
                .set_project_status(project_id, ProjectStatus::Failed, None)
                .await
            {
                tracing::error!(
                    project_id,
                    error = %status_err,
                    "could not record failed status after sequence error"
                );
            }
            Err(err)
        }
    }
}

/// Schedule a build sequence detached from the caller.
///
/// The returned handle is for tests and shutdown paths; the caller is not
/// expected to await it. Failures are already captured in the project's
/// terminal state, so here they are only logged.
pub fn spawn_project_build(
    store: Arc<dyn ProjectStore>,
    llm: Arc<dyn CompletionClient>,
    config: OrchestratorConfig,
    project_id: i64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = run_project_build(store.as_ref(), llm.as_ref(), &config, project_id).await
        {
            tracing::error!(project_id, error = %err, "detached build sequence failed");
        }
    })
}

async fn execute_sequence(
    store: &dyn ProjectStore,
    llm: &dyn CompletionClient,
    config: &OrchestratorConfig,
    project_id: i64,
) -> Result<BuildOutcome> {
    let project = store
        .get_project(project_id)
        .await?
        .with_context(|| format!("project {project_id} not found"))?;

    // 1. Architect step: planning discussion, then the real plan request.
    store
        .set_project_status(project_id, ProjectStatus::InProgress, Some("architect"))
        .await?;

    narrate(
        store,
        config,
        project_id,
        narration::planning_discussion(config.narration, &project.prompt),
    )
    .await?;

    let architect_task = store
        .create_task(
            project_id,
            AgentRole::Architect,
            model_label(AgentRole::Architect),
            "Create comprehensive 5-phase city development plan",
        )
        .await?;

    let architect_messages = [
        ChatMessage::system(prompt::ARCHITECT_SYSTEM),
        ChatMessage::user(prompt::build_architect_prompt(&project.prompt)),
    ];
    let architect_output = llm
        .complete(&architect_messages)
        .await
        .context("architect completion failed")?;

    store
        .set_task_status(
            architect_task.id,
            TaskStatus::Completed,
            Some(&architect_output),
            Some(&architect_output),
        )
        .await?;
    narrate(store, config, project_id, vec![narration::plan_created()]).await?;

    // 2. Accept the plan or degrade to the fallback. Parse and schema
    // failures are recovered here and never surface to the caller.
    let (plan, used_fallback) = accept_plan(&architect_output);
    let total_buildings = plan.total_buildings();
    let phase_count = plan.phases.len();

    let report = spatial::survey(&plan);
    for finding in report.violations() {
        tracing::warn!(project_id, %finding, "advisory spatial check");
    }

    // 3. Informational role steps. These tasks record the simulated design
    // contributions; they gate nothing.
    store
        .set_project_status(project_id, ProjectStatus::InProgress, Some("database"))
        .await?;
    narrate(
        store,
        config,
        project_id,
        narration::database_handoff(config.narration, total_buildings, phase_count),
    )
    .await?;
    complete_role_task(
        store,
        project_id,
        AgentRole::Database,
        "Create database schema for phased city development",
        "Database schema created with spatial indexing and phase tracking",
        DATABASE_ARTIFACT,
    )
    .await?;

    store
        .set_project_status(project_id, ProjectStatus::InProgress, Some("backend"))
        .await?;
    narrate(
        store,
        config,
        project_id,
        narration::backend_handoff(config.narration),
    )
    .await?;
    complete_role_task(
        store,
        project_id,
        AgentRole::Backend,
        "Create RESTful API for city management with phase support",
        "RESTful API created with phase-based endpoints and spatial queries",
        BACKEND_ARTIFACT,
    )
    .await?;

    store
        .set_project_status(project_id, ProjectStatus::InProgress, Some("frontend"))
        .await?;
    narrate(
        store,
        config,
        project_id,
        narration::frontend_handoff(config.narration, total_buildings, phase_count),
    )
    .await?;
    complete_role_task(
        store,
        project_id,
        AgentRole::Frontend,
        "Create 3D city visualization with construction animations",
        "3D visualization created with construction animations and optimized rendering",
        FRONTEND_ARTIFACT,
    )
    .await?;

    // 4. Phased construction. Strictly sequential: downstream progress and
    // phase ordering depend on completion order matching plan order.
    for phase in &plan.phases {
        narrate(
            store,
            config,
            project_id,
            narration::phase_start(config.narration, phase),
        )
        .await?;

        for building in &phase.buildings {
            narrate(
                store,
                config,
                project_id,
                narration::building_proposal(config.narration, building),
            )
            .await?;

            let row = materialize(project_id, building);
            store
                .create_building(&row)
                .await
                .with_context(|| format!("failed to materialize {:?}", building.name))?;
            tracing::info!(project_id, building = %building.name, phase = phase.phase, "building created");

            narrate(
                store,
                config,
                project_id,
                narration::building_confirmation(config.narration, building),
            )
            .await?;
        }

        narrate(store, config, project_id, vec![narration::phase_complete(phase)]).await?;
    }

    // 5. Final QA validation: one more completion, stored verbatim.
    store
        .set_project_status(project_id, ProjectStatus::InProgress, Some("qa"))
        .await?;
    narrate(
        store,
        config,
        project_id,
        narration::qa_kickoff(config.narration, total_buildings, phase_count),
    )
    .await?;

    let qa_task = store
        .create_task(
            project_id,
            AgentRole::Qa,
            model_label(AgentRole::Qa),
            "Perform final validation of complete city project",
        )
        .await?;
    let qa_messages = [
        ChatMessage::system(prompt::QA_SYSTEM),
        ChatMessage::user(prompt::build_qa_prompt(&plan)),
    ];
    let qa_output = llm
        .complete(&qa_messages)
        .await
        .context("qa completion failed")?;
    store
        .set_task_status(qa_task.id, TaskStatus::Completed, Some(&qa_output), None)
        .await?;

    narrate(
        store,
        config,
        project_id,
        narration::completion(total_buildings, phase_count),
    )
    .await?;

    store
        .set_project_status(project_id, ProjectStatus::Completed, None)
        .await?;

    Ok(BuildOutcome {
        buildings_created: total_buildings,
        phases: phase_count,
        used_fallback,
    })
}

/// Parse and validate the architect output, substituting the fallback plan
/// on any failure.
fn accept_plan(raw: &str) -> (CityPlan, bool) {
    match parser::parse_city_plan(raw) {
        Ok(plan) => match schema::validate_plan(&plan) {
            Ok(()) => (plan, false),
            Err(err) => {
                tracing::warn!(error = %err, "plan failed schema validation, using fallback plan");
                (fallback::fallback_plan(), true)
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "could not parse architect response, using fallback plan");
            (fallback::fallback_plan(), true)
        }
    }
}

/// Apply materialization defaults and produce the row to persist.
fn materialize(project_id: i64, building: &PlannedBuilding) -> NewBuilding {
    NewBuilding {
        project_id,
        name: building.name.clone(),
        kind: building.kind,
        position_x: building.position.x,
        position_y: building.position.y,
        position_z: building.position.z,
        width: building.size.width_or_default(),
        height: building.size.height_or_default(),
        depth: building.size.depth_or_default(),
        color: building.color_or_default().to_string(),
    }
}

/// Create and immediately complete an informational role task.
async fn complete_role_task(
    store: &dyn ProjectStore,
    project_id: i64,
    role: AgentRole,
    description: &str,
    output: &str,
    artifact: &str,
) -> Result<()> {
    let task = store
        .create_task(project_id, role, model_label(role), description)
        .await?;
    store
        .set_task_status(task.id, TaskStatus::Completed, Some(output), Some(artifact))
        .await?;
    Ok(())
}

/// Append narration entries in order, pacing between them when configured.
async fn narrate(
    store: &dyn ProjectStore,
    config: &OrchestratorConfig,
    project_id: i64,
    entries: Vec<narration::NarrationEntry>,
) -> Result<()> {
    for e in entries {
        store
            .append_log(project_id, &e.from, &e.to, &e.message)
            .await?;
        if !config.pacing.is_zero() {
            tokio::time::sleep(config.pacing).await;
        }
    }
    Ok(())
}
