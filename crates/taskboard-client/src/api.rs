//! Typed access to the HTTP API.
//!
//! [`TaskboardApi`] is the seam the cache and coordinator are written
//! against; [`HttpApi`] is the `reqwest` implementation.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use taskboard_shared::constants::{item_path, owner_items_path, owner_path, OWNERS_PATH};
use taskboard_shared::{ErrorBody, NewTask, NewUser, RenameUser, Task, TaskPatch, User};

use crate::error::{ClientError, Result};

#[async_trait]
pub trait TaskboardApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn create_user(&self, body: &NewUser) -> Result<User>;
    async fn rename_user(&self, user_id: Uuid, body: &RenameUser) -> Result<User>;
    async fn delete_user(&self, user_id: Uuid) -> Result<()>;

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>>;
    async fn create_task(&self, user_id: Uuid, body: &NewTask) -> Result<Task>;
    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task>;
    async fn delete_task(&self, task_id: Uuid) -> Result<()>;
}

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("taskboard-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into [`ClientError::Api`], preferring the
    /// server's `{"error": ...}` message over the bare status reason.
    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) if !text.trim().is_empty() => text,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        debug!(status = status.as_u16(), message = %message, "API call rejected");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let resp = Self::check(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn expect_no_content(resp: Response) -> Result<()> {
        let resp = Self::check(resp).await?;
        if resp.status() != StatusCode::NO_CONTENT {
            debug!(status = resp.status().as_u16(), "Expected 204 from delete");
        }
        Ok(())
    }
}

#[async_trait]
impl TaskboardApi for HttpApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        let resp = self.http.get(self.url(OWNERS_PATH)).send().await?;
        Self::decode(resp).await
    }

    async fn create_user(&self, body: &NewUser) -> Result<User> {
        let resp = self.http.post(self.url(OWNERS_PATH)).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn rename_user(&self, user_id: Uuid, body: &RenameUser) -> Result<User> {
        let resp = self
            .http
            .put(self.url(&owner_path(user_id)))
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let resp = self.http.delete(self.url(&owner_path(user_id))).send().await?;
        Self::expect_no_content(resp).await
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>> {
        let resp = self
            .http
            .get(self.url(&owner_items_path(user_id)))
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn create_task(&self, user_id: Uuid, body: &NewTask) -> Result<Task> {
        let resp = self
            .http
            .post(self.url(&owner_items_path(user_id)))
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task> {
        let resp = self
            .http
            .put(self.url(&item_path(task_id)))
            .json(patch)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<()> {
        let resp = self.http.delete(self.url(&item_path(task_id))).send().await?;
        Self::expect_no_content(resp).await
    }
}
