//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identity::UserId;
use crate::task::{
    domain::{NewTask, PersistedTaskData, Task, TaskChanges, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Identifiers are assigned sequentially from 1. All guard checks and writes
/// happen under a single write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Looks up the stored task and rejects writes to completed tasks.
fn mutable_entry(
    state: &mut InMemoryTaskState,
    id: TaskId,
) -> TaskRepositoryResult<&mut Task> {
    let stored = state
        .tasks
        .get_mut(&id)
        .ok_or(TaskRepositoryError::NotFound(id))?;
    if stored.is_completed() {
        return Err(TaskRepositoryError::AlreadyCompleted(id));
    }
    Ok(stored)
}

/// Rejects writes when the stored assignee differs from the snapshot's.
fn ensure_assignee_compatible(stored: &Task, task: &Task) -> TaskRepositoryResult<()> {
    match (stored.assigned_to(), task.assigned_to()) {
        (Some(current), Some(requested)) if current != requested => {
            Err(TaskRepositoryError::AlreadyAssigned {
                task_id: stored.id(),
                assignee: current,
            })
        }
        _ => Ok(()),
    }
}

fn collect_matching(state: &InMemoryTaskState, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
    state
        .tasks
        .values()
        .filter(|task| predicate(task))
        .cloned()
        .collect()
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        state.last_id += 1;
        let stored = task.into_task(TaskId::new(state.last_id));
        state.tasks.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let stored = mutable_entry(&mut state, id)?;
        stored.apply_changes(changes, updated_at);
        Ok(stored.clone())
    }

    async fn claim(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = mutable_entry(&mut state, task.id())?;
        ensure_assignee_compatible(stored, task)?;

        let mut data = PersistedTaskData::from(stored.clone());
        data.assigned_to = task.assigned_to();
        data.status = task.status();
        data.updated_at = task.updated_at();
        *stored = Task::from_persisted(data);
        Ok(())
    }

    async fn complete(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = mutable_entry(&mut state, task.id())?;
        ensure_assignee_compatible(stored, task)?;

        let mut data = PersistedTaskData::from(stored.clone());
        data.report = task.report().map(str::to_owned);
        data.status = task.status();
        data.updated_at = task.updated_at();
        *stored = Task::from_persisted(data);
        Ok(())
    }

    async fn find_by_customer(&self, customer: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_matching(&state, |task| task.customer() == customer))
    }

    async fn find_claimable(&self, employee: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_matching(&state, |task| {
            task.assigned_to().is_none_or(|assignee| assignee == employee)
        }))
    }
}
