//! In-memory [`TaskboardApi`] for unit tests: counts calls per operation and
//! can hold calls at a gate until the test releases them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use taskboard_shared::{NewTask, NewUser, RenameUser, Task, TaskPatch, User};

use crate::api::TaskboardApi;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListUsers,
    CreateUser,
    RenameUser,
    DeleteUser,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    tasks: Vec<Task>,
    calls: HashMap<Op, usize>,
    waiting: HashMap<Op, usize>,
    gates: HashMap<Op, Arc<Semaphore>>,
    failures: HashMap<Op, (u16, String)>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

fn not_found(what: &str) -> ClientError {
    ClientError::Api {
        status: 404,
        message: format!("{what} not found"),
    }
}

impl FakeApi {
    pub fn seed_user(&self, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn seed_task(&self, author_id: Uuid, title: &str) -> Task {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author_id,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().tasks.push(task.clone());
        task
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    /// Make every later `op` call wait for [`release`](Self::release).
    pub fn hold(&self, op: Op) {
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(op, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, op: Op, calls: usize) {
        if let Some(gate) = self.state.lock().unwrap().gates.get(&op) {
            gate.add_permits(calls);
        }
    }

    /// Calls currently parked at the gate for `op`.
    pub fn waiting(&self, op: Op) -> usize {
        self.state.lock().unwrap().waiting.get(&op).copied().unwrap_or(0)
    }

    /// Fail the next `op` call with the given status.
    pub fn fail_next(&self, op: Op, status: u16, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, (status, message.to_string()));
    }

    async fn enter(&self, op: Op) -> Result<()> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            *state.calls.entry(op).or_default() += 1;
            let gate = state.gates.get(&op).cloned();
            if gate.is_some() {
                *state.waiting.entry(op).or_default() += 1;
            }
            gate
        };

        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
            *self.state.lock().unwrap().waiting.entry(op).or_default() -= 1;
        }

        match self.state.lock().unwrap().failures.remove(&op) {
            Some((status, message)) => Err(ClientError::Api { status, message }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskboardApi for FakeApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.enter(Op::ListUsers).await?;
        let mut users = self.state.lock().unwrap().users.clone();
        users.sort_by_key(|u| u.name.to_lowercase());
        Ok(users)
    }

    async fn create_user(&self, body: &NewUser) -> Result<User> {
        self.enter(Op::CreateUser).await?;
        Ok(self.seed_user(&body.name))
    }

    async fn rename_user(&self, user_id: Uuid, body: &RenameUser) -> Result<User> {
        self.enter(Op::RenameUser).await?;
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("User"))?;
        user.name = body.name.clone();
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.enter(Op::DeleteUser).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != user_id);
        if state.users.len() == before {
            return Err(not_found("User"));
        }
        state.tasks.retain(|t| t.author_id != user_id);
        Ok(())
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>> {
        self.enter(Op::ListTasks).await?;
        let state = self.state.lock().unwrap();
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(not_found("User"));
        }
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.author_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, user_id: Uuid, body: &NewTask) -> Result<Task> {
        self.enter(Op::CreateTask).await?;
        if !self.state.lock().unwrap().users.iter().any(|u| u.id == user_id) {
            return Err(not_found("User"));
        }
        Ok(self.seed_task(user_id, &body.title))
    }

    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task> {
        self.enter(Op::UpdateTask).await?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| not_found("Task"))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = task.updated_at.max(Utc::now());
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<()> {
        self.enter(Op::DeleteTask).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);
        if state.tasks.len() == before {
            return Err(not_found("Task"));
        }
        Ok(())
    }
}
