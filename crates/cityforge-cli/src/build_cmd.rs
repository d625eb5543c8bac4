//! One-shot build: create a project and run the sequence inline.
//!
//! Unlike `serve`, this awaits the sequence so the command exits with the
//! project's terminal state.

use anyhow::Result;
use sqlx::PgPool;

use cityforge_core::llm::{LlmConfig, OpenAiClient};
use cityforge_core::orchestrator::{run_project_build, OrchestratorConfig};
use cityforge_db::store::{PgStore, ProjectStore};

pub async fn run_build(
    pool: PgPool,
    llm_config: &LlmConfig,
    name: &str,
    prompt: &str,
    owner: i64,
    narrate: bool,
) -> Result<()> {
    let store = PgStore::new(pool);
    let llm = OpenAiClient::from_config(llm_config)?;

    let project = store.create_project(owner, name, prompt).await?;
    println!("Created project {} ({:?})", project.id, project.name);

    let config = if narrate {
        OrchestratorConfig::default()
    } else {
        OrchestratorConfig::quiet()
    };

    let outcome = run_project_build(&store, &llm, &config, project.id).await?;

    println!(
        "Project {} completed: {} buildings across {} phases{}",
        project.id,
        outcome.buildings_created,
        outcome.phases,
        if outcome.used_fallback {
            " (fallback plan)"
        } else {
            ""
        }
    );

    Ok(())
}
