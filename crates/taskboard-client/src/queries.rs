//! Cached reads.

use std::sync::Arc;

use uuid::Uuid;

use taskboard_shared::{Task, User};

use crate::api::TaskboardApi;
use crate::cache::{QueryCache, QueryData, QueryKey};
use crate::error::Result;

pub struct Queries<A: ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
}

impl<A: TaskboardApi + ?Sized> Queries<A> {
    pub fn new(api: Arc<A>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// All owners, served from cache while fresh.
    pub async fn users(&self) -> Result<Vec<User>> {
        let key = QueryKey::Users;
        let data = self
            .cache
            .fetch(key, || async {
                Ok(QueryData::Users(self.api.list_users().await?))
            })
            .await?;
        data.into_users(key)
    }

    /// Items of one owner. With no owner selected there is nothing to show,
    /// and nothing is fetched.
    pub async fn tasks(&self, user_id: Option<Uuid>) -> Result<Vec<Task>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };
        let key = QueryKey::Tasks { user_id };
        let data = self
            .cache
            .fetch(key, || async {
                Ok(QueryData::Tasks(self.api.list_tasks(user_id).await?))
            })
            .await?;
        data.into_tasks(key)
    }

    /// Last-known owners without touching the network.
    pub fn cached_users(&self) -> Option<Vec<User>> {
        let key = QueryKey::Users;
        self.cache.peek(&key).and_then(|data| data.into_users(key).ok())
    }

    pub fn cached_tasks(&self, user_id: Uuid) -> Option<Vec<Task>> {
        let key = QueryKey::Tasks { user_id };
        self.cache.peek(&key).and_then(|data| data.into_tasks(key).ok())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.cache.is_fetching(key)
    }
}
