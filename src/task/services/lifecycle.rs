//! Service layer for the task lifecycle: creation, editing, claiming, and
//! completion under per-operation access rules.

use crate::identity::{Principal, Role};
use crate::task::{
    domain::{
        AccessError, CreateTaskRequest, NewTask, Task, TaskAction, TaskChanges, TaskDomainError,
        TaskId, UpdateMode, access,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Client-visible failure category of a lifecycle error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The principal lacks the role or ownership for the operation.
    Forbidden,
    /// The referenced task does not exist.
    NotFound,
    /// The operation is not legal for the task's current status.
    InvalidState,
    /// The task changed incompatibly, e.g. another employee claimed it.
    Conflict,
    /// The payload is missing required data.
    Validation,
    /// The store failed.
    Internal,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Access control refused the operation.
    #[error(transparent)]
    Forbidden(#[from] AccessError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Classifies the error for callers mapping it to a transport response.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Domain(
                TaskDomainError::Completed(_) | TaskDomainError::InvalidTransition { .. },
            )
            | Self::Repository(TaskRepositoryError::AlreadyCompleted(_)) => {
                ErrorKind::InvalidState
            }
            Self::Domain(TaskDomainError::AlreadyAssigned { .. })
            | Self::Repository(TaskRepositoryError::AlreadyAssigned { .. }) => ErrorKind::Conflict,
            Self::Domain(
                TaskDomainError::EmptyReport(_)
                | TaskDomainError::MissingField(_)
                | TaskDomainError::TitleTooLong { .. },
            ) => ErrorKind::Validation,
            Self::Repository(TaskRepositoryError::Persistence(_)) => ErrorKind::Internal,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Each operation loads a snapshot, validates the principal and the
/// transition, and persists the result. Failures leave the stored task
/// untouched and are never retried.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a pending task owned by the calling customer.
    ///
    /// Any owner named in the payload is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] for non-customers,
    /// [`TaskLifecycleError::Domain`] when a required field is missing, and
    /// [`TaskLifecycleError::Repository`] when the store fails.
    #[instrument(skip_all, fields(user = %principal.id(), role = %principal.role()))]
    pub async fn create_task(
        &self,
        principal: Principal,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        access::require_role(&principal, TaskAction::Create).inspect_err(log_refusal)?;
        if let Some(claimed) = request.requested_customer()
            && claimed != principal.id()
        {
            warn!(%claimed, "ignoring caller-supplied task owner");
        }

        let details = request.into_details()?;
        let task = self
            .repository
            .create(NewTask::new(details, principal.id(), &*self.clock))
            .await?;
        info!(task = %task.id(), "task created");
        Ok(task)
    }

    /// Edits a task's descriptive fields or pre-fills its report.
    ///
    /// Only the supplied fields are written, so the returned task also
    /// reflects edits to other fields that landed after this call loaded it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskLifecycleError::Domain`] for completed tasks or incomplete full
    /// updates, [`TaskLifecycleError::Forbidden`] unless the principal owns
    /// or holds the task, and [`TaskLifecycleError::Repository`] when the
    /// store rejects the write.
    #[instrument(skip_all, fields(user = %principal.id(), role = %principal.role(), task = %task_id, mode = ?mode))]
    pub async fn update_task(
        &self,
        principal: Principal,
        task_id: TaskId,
        changes: TaskChanges,
        mode: UpdateMode,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        if task.is_completed() {
            return Err(TaskDomainError::Completed(task_id).into());
        }
        access::authorize_edit(&principal, &task).inspect_err(log_refusal)?;

        task.revise(&changes, mode, &*self.clock)?;
        let stored = self
            .repository
            .update(task_id, &changes, task.updated_at())
            .await?;
        info!("task updated");
        Ok(stored)
    }

    /// Claims a task for the calling employee and moves it to in-progress.
    ///
    /// Repeating the claim as the same employee succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] for non-employees,
    /// [`TaskLifecycleError::NotFound`] for unknown tasks, and a conflict or
    /// invalid-state error when the task is held by another employee or is
    /// completed, whether detected on the snapshot or by the store.
    #[instrument(skip_all, fields(user = %principal.id(), role = %principal.role(), task = %task_id))]
    pub async fn assign_task(
        &self,
        principal: Principal,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        access::require_role(&principal, TaskAction::Assign).inspect_err(log_refusal)?;
        let mut task = self.load(task_id).await?;

        task.claim(principal.id(), &*self.clock)?;
        self.repository.claim(&task).await.inspect_err(|err| {
            warn!(error = %err, "store rejected task claim");
        })?;
        info!("task assigned");
        Ok(task)
    }

    /// Completes a task held by the calling employee.
    ///
    /// A non-blank `report` replaces any pre-filled report.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] unless the principal is the
    /// assigned employee, [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// and [`TaskLifecycleError::Domain`] when the task is already completed
    /// or no report text is available.
    #[instrument(skip_all, fields(user = %principal.id(), role = %principal.role(), task = %task_id))]
    pub async fn complete_task(
        &self,
        principal: Principal,
        task_id: TaskId,
        report: Option<String>,
    ) -> TaskLifecycleResult<Task> {
        access::require_role(&principal, TaskAction::Complete).inspect_err(log_refusal)?;
        let mut task = self.load(task_id).await?;
        access::authorize_completion(&principal, &task).inspect_err(log_refusal)?;

        task.complete(report, &*self.clock)?;
        self.repository.complete(&task).await?;
        info!("task completed");
        Ok(task)
    }

    /// Returns a single task visible to the principal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// [`TaskLifecycleError::Forbidden`] when the task is not visible.
    #[instrument(skip_all, fields(user = %principal.id(), task = %task_id))]
    pub async fn find_task(
        &self,
        principal: Principal,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        access::authorize_view(&principal, &task).inspect_err(log_refusal)?;
        Ok(task)
    }

    /// Lists the tasks visible to the principal.
    ///
    /// Customers see the tasks they own. Employees see the tasks assigned to
    /// them plus every unassigned task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    #[instrument(skip_all, fields(user = %principal.id(), role = %principal.role()))]
    pub async fn list_tasks(&self, principal: Principal) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = match principal.role() {
            Role::Customer => self.repository.find_by_customer(principal.id()).await?,
            Role::Employee => self.repository.find_claimable(principal.id()).await?,
        };
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }
}

fn log_refusal(err: &AccessError) {
    debug!(reason = %err, "access refused");
}
