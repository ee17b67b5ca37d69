//! Writes, and what they do to the cache once they settle.
//!
//! | Mutation    | Keys invalidated                                 |
//! |-------------|--------------------------------------------------|
//! | create user | `Users`                                          |
//! | rename user | `Users`                                          |
//! | delete user | `Users`; `Tasks { user_id }` is released         |
//! | create task | `Tasks { user_id }`                              |
//! | update task | `Tasks { author_id }` taken from the response    |
//! | delete task | `Tasks { user_id }` supplied by the caller       |
//!
//! A failed mutation touches nothing.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use taskboard_shared::{NewTask, NewUser, RenameUser, Task, TaskPatch, User};

use crate::api::TaskboardApi;
use crate::cache::{QueryCache, QueryData, QueryKey};
use crate::error::Result;
use crate::mutation::{MutationKind, MutationTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Only mark affected keys stale; the next read re-fetches.
    #[default]
    InvalidateOnly,
    /// Also write the returned entity into the affected key (replace by id,
    /// or append for creates) so it shows before the refetch lands.
    ApplyResponse,
}

pub struct MutationCoordinator<A: ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
    tracker: MutationTracker,
    policy: MergePolicy,
}

impl<A: TaskboardApi + ?Sized> MutationCoordinator<A> {
    pub fn new(api: Arc<A>, cache: QueryCache, policy: MergePolicy) -> Self {
        Self {
            api,
            cache,
            tracker: MutationTracker::new(),
            policy,
        }
    }

    pub fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Track one call. `on_success` runs before the slot is marked settled,
    /// so anyone who sees `Success` also sees the invalidated cache.
    async fn run<T, Fut>(
        &self,
        kind: MutationKind,
        target: Option<Uuid>,
        call: Fut,
        on_success: impl FnOnce(&T),
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.tracker.begin(kind, target);
        let result = call.await;
        match &result {
            Ok(value) => {
                on_success(value);
                self.tracker.settle(kind, target, Ok(()));
            }
            Err(e) => {
                warn!(?kind, target = ?target, error = %e, "Mutation failed");
                self.tracker.settle(kind, target, Err(e.to_string()));
            }
        }
        result
    }

    fn merge(&self, key: QueryKey, edit: impl FnOnce(&mut QueryData)) {
        if self.policy == MergePolicy::ApplyResponse {
            self.cache.update(&key, edit);
        }
    }

    pub async fn create_user(&self, name: &str) -> Result<User> {
        let call = async {
            let body = NewUser::new(name)?;
            self.api.create_user(&body).await
        };
        self.run(MutationKind::CreateUser, None, call, |user: &User| {
            self.merge(QueryKey::Users, |data| upsert_user(data, user));
            self.cache.invalidate(&QueryKey::Users);
            info!(user_id = %user.id, "User created");
        })
        .await
    }

    pub async fn rename_user(&self, user_id: Uuid, name: &str) -> Result<User> {
        let call = async {
            let body = RenameUser::new(name)?;
            self.api.rename_user(user_id, &body).await
        };
        self.run(MutationKind::RenameUser, Some(user_id), call, |user: &User| {
            self.merge(QueryKey::Users, |data| upsert_user(data, user));
            self.cache.invalidate(&QueryKey::Users);
        })
        .await
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let call = self.api.delete_user(user_id);
        self.run(MutationKind::DeleteUser, Some(user_id), call, |_| {
            self.cache.invalidate(&QueryKey::Users);
            let tasks = QueryKey::Tasks { user_id };
            self.cache.invalidate(&tasks);
            self.cache.release(&tasks);
            info!(user_id = %user_id, "User deleted");
        })
        .await
    }

    pub async fn create_task(&self, user_id: Uuid, title: &str) -> Result<Task> {
        let call = async {
            let body = NewTask::new(title)?;
            self.api.create_task(user_id, &body).await
        };
        self.run(MutationKind::CreateTask, Some(user_id), call, |task: &Task| {
            let key = QueryKey::Tasks { user_id };
            self.merge(key, |data| upsert_task(data, task));
            self.cache.invalidate(&key);
        })
        .await
    }

    pub async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> Result<Task> {
        let call = async {
            let patch = patch.validated()?;
            self.api.update_task(task_id, &patch).await
        };
        self.run(MutationKind::UpdateTask, Some(task_id), call, |task: &Task| {
            let key = QueryKey::Tasks {
                user_id: task.author_id,
            };
            self.merge(key, |data| upsert_task(data, task));
            self.cache.invalidate(&key);
        })
        .await
    }

    /// The delete response has no body, so the owning scope comes from the
    /// caller.
    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<()> {
        let call = self.api.delete_task(task_id);
        self.run(MutationKind::DeleteTask, Some(task_id), call, |_| {
            self.cache.invalidate(&QueryKey::Tasks { user_id });
        })
        .await
    }
}

/// Replace by id, otherwise insert keeping the server's name order.
fn upsert_user(data: &mut QueryData, user: &User) {
    let QueryData::Users(users) = data else {
        return;
    };
    users.retain(|u| u.id != user.id);
    let at = users.partition_point(|u| u.name.to_lowercase() <= user.name.to_lowercase());
    users.insert(at, user.clone());
}

/// Replace by id, otherwise append (new tasks are the newest).
fn upsert_task(data: &mut QueryData, task: &Task) {
    let QueryData::Tasks(tasks) = data else {
        return;
    };
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(existing) => *existing = task.clone(),
        None => tasks.push(task.clone()),
    }
}
