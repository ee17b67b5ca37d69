use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{HttpApi, TaskboardApi};
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::coordinator::{MergePolicy, MutationCoordinator};
use crate::error::Result;
use crate::queries::Queries;

/// One client's view of the API: a cache, the reads served from it, and the
/// writes that keep it honest. Dropping or [`shutdown`](Self::shutdown)-ing
/// the session discards everything it cached.
pub struct ClientSession<A: ?Sized = HttpApi> {
    cache: QueryCache,
    queries: Queries<A>,
    mutations: MutationCoordinator<A>,
}

impl ClientSession<HttpApi> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config.base_url)?);
        info!(
            base_url = %config.base_url,
            merge_policy = ?config.merge_policy,
            "Client session opened"
        );
        Ok(Self::with_api(api, config.merge_policy))
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }
}

impl<A: TaskboardApi + ?Sized> ClientSession<A> {
    pub fn with_api(api: Arc<A>, merge_policy: MergePolicy) -> Self {
        let cache = QueryCache::new();
        Self {
            queries: Queries::new(Arc::clone(&api), cache.clone()),
            mutations: MutationCoordinator::new(api, cache.clone(), merge_policy),
            cache,
        }
    }

    pub fn queries(&self) -> &Queries<A> {
        &self.queries
    }

    pub fn mutations(&self) -> &MutationCoordinator<A> {
        &self.mutations
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn shutdown(self) {
        let entries = self.cache.len();
        self.cache.clear();
        debug!(entries, "Client session closed");
    }
}
