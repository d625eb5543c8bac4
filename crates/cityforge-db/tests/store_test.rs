//! Integration tests for the query layer and `PgStore` against a real
//! PostgreSQL instance.

use cityforge_db::models::{AgentRole, ProjectStatus, StructureKind, TaskStatus};
use cityforge_db::queries::buildings::{self, NewBuilding};
use cityforge_db::queries::{comm_logs, projects, tasks};
use cityforge_db::store::{PgStore, ProjectStore};
use cityforge_test_utils::{create_test_db, drop_test_db};

fn new_building(project_id: i64, name: &str, x: f64) -> NewBuilding {
    NewBuilding {
        project_id,
        name: name.to_string(),
        kind: StructureKind::Office,
        position_x: x,
        position_y: 0.0,
        position_z: -12.5,
        width: 6.0,
        height: 20.0,
        depth: 6.0,
        color: "#2563eb".to_string(),
    }
}

#[tokio::test]
async fn project_roundtrip() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "harbor", "build a harbor town")
        .await
        .expect("insert_project should succeed");
    assert_eq!(project.owner_id, 0);
    assert_eq!(project.status, ProjectStatus::Pending);
    assert!(project.current_step.is_none());

    let fetched = projects::get_project(&pool, project.id)
        .await
        .unwrap()
        .expect("project should exist");
    assert_eq!(fetched.name, "harbor");
    assert_eq!(fetched.prompt, "build a harbor town");

    let missing = projects::get_project(&pool, project.id + 999).await.unwrap();
    assert!(missing.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn status_update_keeps_step_on_none() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "p", "prompt").await.unwrap();

    projects::update_project_status(&pool, project.id, ProjectStatus::InProgress, Some("architect"))
        .await
        .unwrap();
    projects::update_project_status(&pool, project.id, ProjectStatus::InProgress, Some("qa"))
        .await
        .unwrap();
    // Terminal transition without a step keeps the last label.
    projects::update_project_status(&pool, project.id, ProjectStatus::Completed, None)
        .await
        .unwrap();

    let fetched = projects::get_project(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, ProjectStatus::Completed);
    assert_eq!(fetched.current_step.as_deref(), Some("qa"));
    assert!(fetched.updated_at >= fetched.created_at);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn status_update_on_missing_project_errors() {
    let (pool, db_name) = create_test_db().await;

    let result = projects::update_project_status(&pool, 404, ProjectStatus::Failed, None).await;
    assert!(result.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_projects_filters_by_owner_newest_first() {
    let (pool, db_name) = create_test_db().await;

    let first = projects::insert_project(&pool, 7, "one", "p").await.unwrap();
    let second = projects::insert_project(&pool, 7, "two", "p").await.unwrap();
    projects::insert_project(&pool, 8, "other", "p").await.unwrap();

    let mine = projects::list_projects_for_owner(&pool, 7).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.id);
    assert_eq!(mine[1].id, first.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn buildings_list_in_creation_order() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "p", "prompt").await.unwrap();
    for (i, name) in ["Alpha", "Beta", "Gamma"].iter().enumerate() {
        buildings::insert_building(&pool, &new_building(project.id, name, i as f64 * 10.0))
            .await
            .unwrap();
    }

    let listed = buildings::list_buildings_for_project(&pool, project.id).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));

    let count = buildings::count_buildings_for_project(&pool, project.id).await.unwrap();
    assert_eq!(count, 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn building_fields_roundtrip() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "p", "prompt").await.unwrap();
    let row = buildings::insert_building(&pool, &new_building(project.id, "Spire", 22.5))
        .await
        .unwrap();

    assert_eq!(row.kind, StructureKind::Office);
    assert_eq!(row.position_x, 22.5);
    assert_eq!(row.position_z, -12.5);
    assert_eq!(row.height, 20.0);
    assert_eq!(row.color, "#2563eb");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn task_lifecycle() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "p", "prompt").await.unwrap();
    let task = tasks::insert_task(
        &pool,
        project.id,
        AgentRole::Architect,
        "GPT-4 (Architect)",
        "Create the master plan",
    )
    .await
    .unwrap();

    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.started_at.is_some());
    assert!(task.completed_at.is_none());
    assert_eq!(task.input.as_deref(), Some("Create the master plan"));

    tasks::update_task_status(
        &pool,
        task.id,
        TaskStatus::Completed,
        Some("raw model output"),
        Some("artifact text"),
    )
    .await
    .unwrap();

    let fetched = tasks::get_task(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TaskStatus::Completed);
    assert_eq!(fetched.output.as_deref(), Some("raw model output"));
    assert_eq!(fetched.artifact.as_deref(), Some("artifact text"));
    assert!(fetched.completed_at.is_some());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn logs_read_newest_first() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, 0, "p", "prompt").await.unwrap();
    for i in 0..4 {
        comm_logs::insert_log(&pool, project.id, "System", "All", &format!("entry {i}"))
            .await
            .unwrap();
    }

    let logs = comm_logs::list_logs_for_project(&pool, project.id).await.unwrap();
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[0].message, "entry 3");
    assert_eq!(logs[3].message, "entry 0");
    assert!(logs.windows(2).all(|w| w[0].id > w[1].id));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn pg_store_implements_the_interface() {
    let (pool, db_name) = create_test_db().await;
    let store = PgStore::new(pool.clone());
    let store: &dyn ProjectStore = &store;

    let project = store.create_project(3, "via store", "prompt").await.unwrap();
    store
        .set_project_status(project.id, ProjectStatus::InProgress, Some("architect"))
        .await
        .unwrap();

    store
        .create_building(&new_building(project.id, "Store Tower", 1.0))
        .await
        .unwrap();
    let task = store
        .create_task(project.id, AgentRole::Qa, "Mistral (QA)", "validate")
        .await
        .unwrap();
    store
        .set_task_status(task.id, TaskStatus::Completed, Some("ok"), None)
        .await
        .unwrap();
    store
        .append_log(project.id, "System", "All", "hello")
        .await
        .unwrap();

    assert_eq!(store.list_buildings(project.id).await.unwrap().len(), 1);
    assert_eq!(store.list_tasks(project.id).await.unwrap().len(), 1);
    assert_eq!(store.list_logs(project.id).await.unwrap().len(), 1);
    assert_eq!(store.list_projects(3).await.unwrap().len(), 1);

    let fetched = store.get_project(project.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, ProjectStatus::InProgress);
    assert_eq!(fetched.current_step.as_deref(), Some("architect"));

    pool.close().await;
    drop_test_db(&db_name).await;
}
