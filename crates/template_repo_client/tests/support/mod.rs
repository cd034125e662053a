//! In-memory template API server used by the end-to-end tests.
//!
//! Implements just enough of the template endpoints to observe what the
//! client does: repositories live in a shared vector, each repository serves
//! one template, and every route requires the admin cookie.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use serde_json::json;
use template_repo_client::models::DeleteRepositoryRequest;
use template_repo_client::{
    BatchOperation, ClientConfig, RepositoryDescriptor, TemplateApiClient, TemplateDescriptor,
};

pub const ADMIN_COOKIE: &str = "connect.sid=test-admin";

#[derive(Clone, Default)]
pub struct ServerState {
    repos: Arc<Mutex<Vec<RepositoryDescriptor>>>,
}

impl ServerState {
    pub fn repos(&self) -> Vec<RepositoryDescriptor> {
        self.repos.lock().unwrap().clone()
    }

    pub fn urls(&self) -> BTreeSet<String> {
        self.repos().into_iter().map(|r| r.url).collect()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: ServerState,
}

impl TestServer {
    /// Start a server on an ephemeral port holding `initial` repositories.
    pub async fn start(initial: Vec<RepositoryDescriptor>) -> Self {
        let state = ServerState {
            repos: Arc::new(Mutex::new(initial)),
        };

        let app = Router::new()
            .route(
                "/api/v1/templates/repositories",
                get(list_repos).post(add_repo).delete(delete_repo),
            )
            .route("/api/v1/batch/templates/repositories", patch(batch_patch))
            .route("/api/v1/templates", get(list_templates))
            .route("/api/v1/templates/", get(list_templates))
            .route("/api/v1/templates/styles", get(list_styles))
            .layer(middleware::from_fn(require_admin_cookie))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> TemplateApiClient {
        self.client_with_cookie(ADMIN_COOKIE)
    }

    pub fn client_with_cookie(&self, cookie: &str) -> TemplateApiClient {
        let config = ClientConfig::new(&self.base_url)
            .unwrap()
            .with_admin_cookie(cookie);
        TemplateApiClient::new(config).unwrap()
    }
}

pub fn repo(url: &str, style: &str, enabled: bool) -> RepositoryDescriptor {
    RepositoryDescriptor {
        url: url.to_string(),
        name: format!("Templates from {url}"),
        description: "Repository served by the test server".to_string(),
        enabled,
        protected: false,
        project_styles: vec![style.to_string()],
        ..Default::default()
    }
}

async fn require_admin_cookie(request: Request, next: Next) -> Response {
    let authorised = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == ADMIN_COOKIE);

    if authorised {
        next.run(request).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn list_repos(State(state): State<ServerState>) -> Json<Vec<RepositoryDescriptor>> {
    Json(state.repos())
}

async fn add_repo(
    State(state): State<ServerState>,
    Json(repo): Json<RepositoryDescriptor>,
) -> Response {
    let mut repos = state.repos.lock().unwrap();
    if repos.iter().any(|r| r.url == repo.url) {
        return (StatusCode::BAD_REQUEST, "repository already exists").into_response();
    }
    repos.push(repo);
    Json(repos.clone()).into_response()
}

async fn delete_repo(
    State(state): State<ServerState>,
    Json(request): Json<DeleteRepositoryRequest>,
) -> Response {
    let mut repos = state.repos.lock().unwrap();
    let before = repos.len();
    repos.retain(|r| r.url != request.url);
    if repos.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(repos.clone()).into_response()
}

async fn batch_patch(
    State(state): State<ServerState>,
    Json(operations): Json<Vec<BatchOperation>>,
) -> Response {
    let mut repos = state.repos.lock().unwrap();
    let results: Vec<_> = operations
        .iter()
        .map(|op| {
            let status = match repos.iter_mut().find(|r| r.url == op.url) {
                Some(repo) => {
                    repo.enabled = op.value == "true";
                    200
                }
                None => 404,
            };
            json!({ "status": status, "requestedOperation": op })
        })
        .collect();
    (StatusCode::MULTI_STATUS, Json(results)).into_response()
}

async fn list_templates(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let enabled_only = params.get("showEnabledOnly").is_some_and(|v| v == "true");
    let style = params.get("projectStyle");

    let templates: Vec<TemplateDescriptor> = state
        .repos()
        .into_iter()
        .filter(|r| !enabled_only || r.enabled)
        .filter(|r| style.is_none_or(|s| r.project_styles.contains(s)))
        .map(|r| TemplateDescriptor {
            label: r.name.clone(),
            description: r.description.clone(),
            language: "go".to_string(),
            url: format!("{}#template", r.url),
            project_type: "docker".to_string(),
            source: Some(r.name.clone()),
            source_url: Some(r.url.clone()),
            project_style: r.project_styles.first().cloned(),
        })
        .collect();

    if templates.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(templates).into_response()
    }
}

async fn list_styles(State(state): State<ServerState>) -> Json<Vec<String>> {
    let styles: BTreeSet<String> = state
        .repos()
        .into_iter()
        .filter(|r| r.enabled)
        .flat_map(|r| r.project_styles)
        .collect();
    Json(styles.into_iter().collect())
}
