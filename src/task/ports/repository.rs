//! Repository port for task persistence and lookup.

use crate::identity::UserId;
use crate::task::domain::{NewTask, Task, TaskChanges, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every write re-validates its guard against the stored record while holding
/// the store's per-record lock. Each write only persists the columns its
/// transition owns, and an edit only persists the fields its payload
/// supplies, so racing writes to different columns all survive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and returns it with its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the store fails.
    async fn create(&self, task: NewTask) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Persists a generic edit and returns the stored task afterwards.
    ///
    /// Only the fields present in `changes` are written, together with
    /// `updated_at`. Stored values of absent fields are left as they are,
    /// even when they changed after the caller loaded its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::AlreadyCompleted`] when the stored task has
    /// been completed.
    async fn update(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Persists a claim: assignee, status, and the update timestamp.
    ///
    /// The write succeeds only when the stored task is unassigned or already
    /// assigned to the same employee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`],
    /// [`TaskRepositoryError::AlreadyCompleted`], or
    /// [`TaskRepositoryError::AlreadyAssigned`] when the guard fails.
    async fn claim(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists a completion: report, status, and the update timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`],
    /// [`TaskRepositoryError::AlreadyCompleted`], or
    /// [`TaskRepositoryError::AlreadyAssigned`] when the stored assignee no
    /// longer matches.
    async fn complete(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Returns every task owned by the customer, ordered by identifier.
    async fn find_by_customer(&self, customer: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks assigned to the employee plus all unassigned tasks,
    /// ordered by identifier.
    async fn find_claimable(&self, employee: UserId) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored task is already completed.
    #[error("task already completed: {0}")]
    AlreadyCompleted(TaskId),

    /// The stored task is held by a different employee.
    #[error("task {task_id} is already assigned to user {assignee}")]
    AlreadyAssigned {
        /// Task that was being written.
        task_id: TaskId,
        /// Employee holding the stored task.
        assignee: UserId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
