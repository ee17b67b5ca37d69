use std::sync::{Arc, Mutex};

use axum::{
    http::Method,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use taskboard_shared::constants::{
    HEALTH_PATH, ITEMS_PATH, OWNERS_PATH, TASKS_PATH, USERS_PATH,
};
use taskboard_store::Database;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::{tasks, users};

#[derive(Clone)]
pub struct AppState {
    /// One connection, locked for the duration of a single store call.
    db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }

    /// Run one store operation. The lock is released before returning, so no
    /// guard is ever held across an `.await`.
    pub fn with_db<T>(
        &self,
        op: impl FnOnce(&Database) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let guard = self
            .db
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {e}")))?;
        op(&*guard)
    }
}

/// The user/task routes, mounted under the given collection names.
fn resource_routes(owners: &str, items: &str) -> Router<AppState> {
    Router::new()
        .route(owners, get(users::list_users).post(users::create_user))
        .route(
            &format!("{owners}/:user_id"),
            put(users::rename_user).delete(users::delete_user),
        )
        .route(
            &format!("{owners}/:user_id{items}"),
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            &format!("{items}/:task_id"),
            put(tasks::update_task).delete(tasks::delete_task),
        )
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(HEALTH_PATH, get(health_check))
        .merge(resource_routes(OWNERS_PATH, ITEMS_PATH))
        .merge(resource_routes(USERS_PATH, TASKS_PATH));

    if state.config.cors_permissive {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(state, listener).await
}

/// Serve on an already-bound listener (lets callers pick port 0).
pub async fn serve_listener(state: AppState, listener: TcpListener) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    pub fn app() -> Router {
        let db = Database::open_in_memory().unwrap();
        build_router(AppState::new(db, ServerConfig::default()))
    }

    pub async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(text) => {
                builder = builder.header("content-type", "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send_raw(app, method, uri, body.map(|b| b.to_string())).await
    }

    /// Create a user and return its id as a string.
    pub async fn create_user(app: &Router, name: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/owners",
            Some(serde_json::json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::test_support::*;

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_legacy_paths_share_state() {
        let app = app();
        let id = create_user(&app, "Ricky").await;

        let (status, body) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], id.as_str());

        let (status, _) = send(&app, Method::GET, &format!("/users/{id}/tasks"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
