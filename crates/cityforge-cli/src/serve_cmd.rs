//! HTTP surface: project creation, build scheduling, and the polled read
//! endpoints consumers use to observe progress.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use cityforge_core::llm::{CompletionClient, LlmConfig, OpenAiClient};
use cityforge_core::orchestrator::{spawn_project_build, OrchestratorConfig};
use cityforge_core::summary::summarize_debate;
use cityforge_core::{access, analytics};
use cityforge_db::models::{Project, ProjectStatus};
use cityforge_db::queries::{buildings, comm_logs, projects, tasks};
use cityforge_db::store::PgStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and payloads
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PgStore>,
    pub llm: Arc<dyn CompletionClient>,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub success: bool,
    pub project_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StartBuildResponse {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/projects", post(create_project).get(list_projects))
        .route("/api/projects/{id}", get(get_project))
        .route("/api/projects/{id}/build", post(start_build))
        .route("/api/projects/{id}/buildings", get(get_buildings))
        .route("/api/projects/{id}/tasks", get(get_tasks))
        .route("/api/projects/{id}/logs", get(get_logs))
        .route("/api/projects/{id}/analytics", get(get_analytics))
        .route("/api/projects/{id}/debate-summary", post(debate_summary))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, llm_config: &LlmConfig, bind: &str, port: u16) -> Result<()> {
    let llm = OpenAiClient::from_config(llm_config)?;
    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        llm: Arc::new(llm),
        orchestrator: OrchestratorConfig::default(),
    };

    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("cityforge serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("cityforge serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Caller identity from the `x-user-id` header; absent or unparsable means
/// anonymous.
fn caller_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Fetch a project and check the caller may act on it.
async fn load_project(state: &AppState, id: i64, headers: &HeaderMap) -> Result<Project, AppError> {
    let project = projects::get_project(state.store.pool(), id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("project {id} not found")))?;

    access::authorize(&project, caller_id(headers))
        .map_err(|err| AppError::forbidden(err.to_string()))?;

    Ok(project)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateProjectRequest>,
) -> Result<axum::response::Response, AppError> {
    let owner_id = caller_id(&headers).unwrap_or(access::ANONYMOUS_OWNER);

    let project = projects::insert_project(state.store.pool(), owner_id, &request.name, &request.prompt)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(CreateProjectResponse {
        success: true,
        project_id: project.id,
    })
    .into_response())
}

/// Schedule the detached build sequence for a pending project.
///
/// Refusing non-pending projects is what makes "exactly once" concrete:
/// the status machine is monotonic, so a second start can never observe
/// `pending` again after the first one ran.
async fn start_build(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let project = load_project(&state, id, &headers).await?;

    if project.status != ProjectStatus::Pending {
        return Err(AppError::conflict(format!(
            "project {id} is {}; a build sequence can only start once",
            project.status
        )));
    }

    tracing::info!(project_id = id, "scheduling build sequence");
    spawn_project_build(
        state.store.clone(),
        state.llm.clone(),
        state.orchestrator.clone(),
        id,
    );

    Ok(Json(StartBuildResponse {
        success: true,
        message: "Building process started".to_string(),
    })
    .into_response())
}

async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let owner_id = caller_id(&headers).unwrap_or(access::ANONYMOUS_OWNER);

    let projects = projects::list_projects_for_owner(state.store.pool(), owner_id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "project list read failed, serving empty");
            Vec::new()
        });

    Ok(Json(projects).into_response())
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let project = load_project(&state, id, &headers).await?;
    Ok(Json(project).into_response())
}

async fn get_buildings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    load_project(&state, id, &headers).await?;

    let buildings = buildings::list_buildings_for_project(state.store.pool(), id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(project_id = id, error = %err, "building read failed, serving empty");
            Vec::new()
        });

    Ok(Json(buildings).into_response())
}

async fn get_tasks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    load_project(&state, id, &headers).await?;

    let tasks = tasks::list_tasks_for_project(state.store.pool(), id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(project_id = id, error = %err, "task read failed, serving empty");
            Vec::new()
        });

    Ok(Json(tasks).into_response())
}

async fn get_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    load_project(&state, id, &headers).await?;

    let logs = comm_logs::list_logs_for_project(state.store.pool(), id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(project_id = id, error = %err, "log read failed, serving empty");
            Vec::new()
        });

    Ok(Json(logs).into_response())
}

async fn get_analytics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    load_project(&state, id, &headers).await?;

    let buildings = buildings::list_buildings_for_project(state.store.pool(), id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(project_id = id, error = %err, "building read failed, serving empty");
            Vec::new()
        });

    Ok(Json(analytics::analyze(&buildings)).into_response())
}

/// One generative round trip per invocation; not cheap to poll.
async fn debate_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    load_project(&state, id, &headers).await?;

    let summary = summarize_debate(state.store.as_ref(), state.llm.as_ref(), id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(summary).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use cityforge_core::llm::{ChatMessage, CompletionClient, LlmError};
    use cityforge_core::orchestrator::OrchestratorConfig;
    use cityforge_db::store::PgStore;
    use cityforge_test_utils::{create_test_db, drop_test_db};

    use super::AppState;

    // -----------------------------------------------------------------------
    // Scripted completion client
    // -----------------------------------------------------------------------

    struct ScriptedClient {
        responses: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
        }
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn test_state(pool: PgPool, client: Arc<ScriptedClient>) -> AppState {
        AppState {
            store: Arc::new(PgStore::new(pool)),
            llm: client,
            orchestrator: OrchestratorConfig::quiet(),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> axum::response::Response {
        super::build_router(state).oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_as(uri: &str, user_id: i64) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_project(state: &AppState, name: &str) -> i64 {
        let resp = send(
            state.clone(),
            post_json(
                "/api/projects",
                serde_json::json!({ "name": name, "prompt": "a small town" }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["project_id"].as_i64().unwrap()
    }

    /// Poll the project endpoint until it reaches a terminal status.
    async fn wait_for_terminal(state: &AppState, id: i64) -> String {
        for _ in 0..200 {
            let resp = send(state.clone(), get(&format!("/api/projects/{id}"))).await;
            let json = body_json(resp).await;
            let status = json["status"].as_str().unwrap().to_string();
            if status == "completed" || status == "failed" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("project {id} never reached a terminal status");
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_project_returns_id() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(pool.clone(), Arc::new(ScriptedClient::new(Vec::<String>::new())));

        let resp = send(
            state.clone(),
            post_json(
                "/api/projects",
                serde_json::json!({ "name": "t", "prompt": "p" }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert!(json["project_id"].as_i64().unwrap() > 0);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_get_project_not_found() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(pool.clone(), Arc::new(ScriptedClient::new(Vec::<String>::new())));

        let resp = send(state, get("/api/projects/424242")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_owner_mismatch_is_forbidden() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(pool.clone(), Arc::new(ScriptedClient::new(Vec::<String>::new())));

        // Created by user 5...
        let resp = send(
            state.clone(),
            {
                let mut req = post_json(
                    "/api/projects",
                    serde_json::json!({ "name": "mine", "prompt": "p" }),
                );
                req.headers_mut()
                    .insert("x-user-id", "5".parse().unwrap());
                req
            },
        )
        .await;
        let id = body_json(resp).await["project_id"].as_i64().unwrap();

        // ...read by user 6.
        let resp = send(state.clone(), get_as(&format!("/api/projects/{id}"), 6)).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // Anonymous readers are allowed.
        let resp = send(state, get(&format!("/api/projects/{id}"))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_build_missing_project() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(pool.clone(), Arc::new(ScriptedClient::new(Vec::<String>::new())));

        let resp = send(state, post_empty("/api/projects/999/build")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_full_build_flow_with_fallback_plan() {
        let (pool, db_name) = create_test_db().await;
        // Prose response: the executor degrades to the 24-building fallback.
        let client = Arc::new(ScriptedClient::new([
            "I can only describe it in words.".to_string(),
            "QA verdict: PASS".to_string(),
        ]));
        let state = test_state(pool.clone(), client.clone());

        let id = create_project(&state, "fallback-town").await;

        let resp = send(state.clone(), post_empty(&format!("/api/projects/{id}/build"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);

        let status = wait_for_terminal(&state, id).await;
        assert_eq!(status, "completed");

        // A second start is refused: the sequence runs exactly once.
        let resp = send(state.clone(), post_empty(&format!("/api/projects/{id}/build"))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = send(state.clone(), get(&format!("/api/projects/{id}/buildings"))).await;
        let buildings = body_json(resp).await;
        assert_eq!(buildings.as_array().unwrap().len(), 24);
        assert_eq!(buildings[0]["name"], "Main Avenue");

        let resp = send(state.clone(), get(&format!("/api/projects/{id}/tasks"))).await;
        let tasks = body_json(resp).await;
        let roles: Vec<&str> = tasks
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["role"].as_str().unwrap())
            .collect();
        assert!(roles.contains(&"architect"));
        assert!(roles.contains(&"database"));
        assert!(roles.contains(&"qa"));

        let resp = send(state.clone(), get(&format!("/api/projects/{id}/logs"))).await;
        let logs = body_json(resp).await;
        assert!(!logs.as_array().unwrap().is_empty());

        let resp = send(state, get(&format!("/api/projects/{id}/analytics"))).await;
        let metrics = body_json(resp).await;
        assert_eq!(metrics["total_buildings"], 24);
        assert!(metrics["population_estimate"].as_i64().unwrap() > 0);

        // Architect + QA completions, nothing else.
        assert_eq!(client.calls(), 2);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_debate_summary_on_empty_log_skips_backend() {
        let (pool, db_name) = create_test_db().await;
        let client = Arc::new(ScriptedClient::new(Vec::<String>::new()));
        let state = test_state(pool.clone(), client.clone());

        let id = create_project(&state, "quiet-town").await;

        let resp = send(
            state,
            post_empty(&format!("/api/projects/{id}/debate-summary")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["conclusion"], "No debate data available yet.");
        assert_eq!(client.calls(), 0);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_list_projects_scoped_to_caller() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(pool.clone(), Arc::new(ScriptedClient::new(Vec::<String>::new())));

        let mut req = post_json(
            "/api/projects",
            serde_json::json!({ "name": "mine", "prompt": "p" }),
        );
        req.headers_mut().insert("x-user-id", "9".parse().unwrap());
        send(state.clone(), req).await;

        let resp = send(state.clone(), get_as("/api/projects", 9)).await;
        let mine = body_json(resp).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let resp = send(state, get_as("/api/projects", 10)).await;
        let theirs = body_json(resp).await;
        assert!(theirs.as_array().unwrap().is_empty());

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
