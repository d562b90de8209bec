//! Task aggregate root and related task lifecycle types.

use super::{ParseTaskStatusError, TaskChanges, TaskDomainError, TaskId, UpdateMode};
use crate::identity::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum number of characters in a task title.
pub const MAX_TITLE_CHARS: usize = 100;

/// Task lifecycle status.
///
/// Variants are declared in lifecycle order, so the derived ordering reflects
/// progress: `Pending < InProgress < Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting for an employee to claim it.
    Pending,
    /// Task has been claimed and is being worked on.
    InProgress,
    /// Task has been completed with a report.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns `true` when the state machine permits moving to `target`.
    ///
    /// Self-transitions are allowed for the non-terminal states because
    /// edits and repeated claims leave the status unchanged.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Pending | Self::InProgress)
                | (Self::InProgress, Self::InProgress | Self::Completed)
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Descriptive task fields supplied by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    title: String,
    description: String,
    due_date: NaiveDate,
}

impl TaskDetails {
    /// Creates task details.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date,
        }
    }

    /// Checks that `title` fits within [`MAX_TITLE_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TitleTooLong`] for longer titles.
    pub fn validate_title(title: &str) -> Result<(), TaskDomainError> {
        let length = title.chars().count();
        if length > MAX_TITLE_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                length,
                max: MAX_TITLE_CHARS,
            });
        }
        Ok(())
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

/// A task that has been validated but not yet stored.
///
/// The store assigns the identifier when it persists the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    details: TaskDetails,
    customer: UserId,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates a pending task owned by `customer`.
    #[must_use]
    pub fn new(details: TaskDetails, customer: UserId, clock: &impl Clock) -> Self {
        Self {
            details,
            customer,
            created_at: clock.utc(),
        }
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the owning customer.
    #[must_use]
    pub const fn customer(&self) -> UserId {
        self.customer
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Materializes the stored task under the store-assigned identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            details: self.details,
            status: TaskStatus::Pending,
            customer: self.customer,
            assigned_to: None,
            report: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    #[serde(flatten)]
    details: TaskDetails,
    status: TaskStatus,
    customer: UserId,
    assigned_to: Option<UserId>,
    report: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted descriptive fields.
    pub details: TaskDetails,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Owning customer.
    pub customer: UserId,
    /// Assigned employee, if any.
    pub assigned_to: Option<UserId>,
    /// Completion report, if any.
    pub report: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for PersistedTaskData {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            details: task.details,
            status: task.status,
            customer: task.customer,
            assigned_to: task.assigned_to,
            report: task.report,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            status: data.status,
            customer: data.customer,
            assigned_to: data.assigned_to,
            report: data.report,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owning customer.
    #[must_use]
    pub const fn customer(&self) -> UserId {
        self.customer
    }

    /// Returns the assigned employee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the report text, if any.
    #[must_use]
    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once the task has reached its terminal status.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a generic edit to the descriptive fields and report.
    ///
    /// Status, owner, and assignee are never touched. In
    /// [`UpdateMode::Replace`] the title, description, and due date must all
    /// be supplied.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Completed`] for completed tasks and
    /// [`TaskDomainError::MissingField`] when a full update is incomplete,
    /// and [`TaskDomainError::TitleTooLong`] for oversized titles. The task
    /// is left unchanged on error.
    pub fn revise(
        &mut self,
        changes: &TaskChanges,
        mode: UpdateMode,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_mutable()?;
        if mode == UpdateMode::Replace {
            changes.ensure_complete()?;
        }
        if let Some(title) = changes.title() {
            TaskDetails::validate_title(title)?;
        }

        self.apply_changes(changes, clock.utc());
        Ok(())
    }

    /// Writes the supplied fields of `changes` and stamps `updated_at`.
    ///
    /// Fields absent from `changes` keep their current values.
    pub(crate) fn apply_changes(&mut self, changes: &TaskChanges, updated_at: DateTime<Utc>) {
        if let Some(title) = changes.title() {
            title.clone_into(&mut self.details.title);
        }
        if let Some(description) = changes.description() {
            description.clone_into(&mut self.details.description);
        }
        if let Some(due_date) = changes.due_date() {
            self.details.due_date = due_date;
        }
        if let Some(report) = changes.report() {
            self.report = Some(report.to_owned());
        }
        self.updated_at = updated_at;
    }

    /// Claims the task for `employee` and moves it to
    /// [`TaskStatus::InProgress`].
    ///
    /// Claiming a task already held by the same employee succeeds again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Completed`] for completed tasks and
    /// [`TaskDomainError::AlreadyAssigned`] when another employee holds it.
    pub fn claim(&mut self, employee: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_mutable()?;
        if let Some(assignee) = self.assigned_to
            && assignee != employee
        {
            return Err(TaskDomainError::AlreadyAssigned {
                task_id: self.id,
                assignee,
            });
        }
        self.ensure_transition(TaskStatus::InProgress)?;

        self.assigned_to = Some(employee);
        self.status = TaskStatus::InProgress;
        self.touch(clock);
        Ok(())
    }

    /// Completes the task, finalizing the report.
    ///
    /// A non-blank `report` replaces any pre-filled one; otherwise the
    /// existing report is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Completed`] when already completed,
    /// [`TaskDomainError::EmptyReport`] when neither report has text, and
    /// [`TaskDomainError::InvalidTransition`] when the task was never
    /// claimed.
    pub fn complete(
        &mut self,
        report: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_mutable()?;
        let supplied = report.filter(|text| has_text(Some(text.as_str())));
        if supplied.is_none() && !has_text(self.report.as_deref()) {
            return Err(TaskDomainError::EmptyReport(self.id));
        }
        self.ensure_transition(TaskStatus::Completed)?;

        if supplied.is_some() {
            self.report = supplied;
        }
        self.status = TaskStatus::Completed;
        self.touch(clock);
        Ok(())
    }

    const fn ensure_mutable(&self) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::Completed(self.id));
        }
        Ok(())
    }

    const fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}
