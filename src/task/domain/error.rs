//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use crate::identity::UserId;
use thiserror::Error;

/// Errors returned when a task transition or payload violates domain rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task is completed and accepts no further changes.
    #[error("task {0} is completed and cannot be modified")]
    Completed(TaskId),

    /// The task is already claimed by a different employee.
    #[error("task {task_id} is already assigned to another user ({assignee})")]
    AlreadyAssigned {
        /// Task that was being claimed.
        task_id: TaskId,
        /// Employee currently holding the task.
        assignee: UserId,
    },

    /// The requested status change is not permitted by the state machine.
    #[error("invalid task status transition for {task_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Task whose status change was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Completion was requested without any report text.
    #[error("report for task {0} cannot be empty")]
    EmptyReport(TaskId),

    /// A required payload field was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The title exceeds the storage limit.
    #[error("title is {length} characters long; at most {max} are allowed")]
    TitleTooLong {
        /// Supplied title length in characters.
        length: usize,
        /// Maximum permitted length.
        max: usize,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
