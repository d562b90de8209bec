//! Access-control predicates for task operations.
//!
//! Each operation names the role it requires in a small capability table;
//! ownership checks are plain predicates over `(principal, task)`.

use super::{Task, TaskId};
use crate::identity::{Principal, Role, UserId};
use std::fmt;
use thiserror::Error;

/// Operation a principal attempts on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    /// Create a new task.
    Create,
    /// Read a task or list tasks.
    View,
    /// Edit descriptive fields or pre-fill the report.
    Edit,
    /// Claim a task.
    Assign,
    /// Complete a claimed task.
    Complete,
}

impl TaskAction {
    /// Returns the role an action demands before any task is consulted.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Create => Some(Role::Customer),
            Self::Assign | Self::Complete => Some(Role::Employee),
            Self::View | Self::Edit => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Assign => "assign",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a principal is refused access to a task operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The principal's role cannot perform the action at all.
    #[error("only a {role} may {action} tasks")]
    RoleRequired {
        /// Attempted action.
        action: TaskAction,
        /// Role the action requires.
        role: Role,
    },

    /// The principal is neither the task's customer nor its assignee.
    #[error("user {user} does not have permission to update task {task_id}")]
    NotParticipant {
        /// Task being edited.
        task_id: TaskId,
        /// Refused user.
        user: UserId,
    },

    /// The principal is not the employee the task is assigned to.
    #[error("user {user} does not have permission to complete task {task_id}")]
    NotAssignee {
        /// Task being completed.
        task_id: TaskId,
        /// Refused user.
        user: UserId,
    },

    /// The task is not visible to the principal.
    #[error("user {user} cannot view task {task_id}")]
    NotVisible {
        /// Task being read.
        task_id: TaskId,
        /// Refused user.
        user: UserId,
    },
}

/// Checks the role requirement of `action`.
///
/// # Errors
///
/// Returns [`AccessError::RoleRequired`] when the principal lacks the role.
pub fn require_role(principal: &Principal, action: TaskAction) -> Result<(), AccessError> {
    match action.required_role() {
        Some(role) if !principal.has_role(role) => Err(AccessError::RoleRequired { action, role }),
        _ => Ok(()),
    }
}

/// Returns `true` when the principal is the customer who owns the task.
#[must_use]
pub fn is_owner(principal: &Principal, task: &Task) -> bool {
    principal.has_role(Role::Customer) && task.customer() == principal.id()
}

/// Returns `true` when the principal is the employee assigned to the task.
#[must_use]
pub fn is_assignee(principal: &Principal, task: &Task) -> bool {
    principal.has_role(Role::Employee) && task.assigned_to() == Some(principal.id())
}

/// Returns `true` when an employee may see the task because it is unclaimed.
#[must_use]
pub fn is_claimable_by(principal: &Principal, task: &Task) -> bool {
    principal.has_role(Role::Employee) && task.assigned_to().is_none()
}

/// Authorizes a generic edit: the owning customer or the assigned employee.
///
/// # Errors
///
/// Returns [`AccessError::NotParticipant`] for anyone else.
pub fn authorize_edit(principal: &Principal, task: &Task) -> Result<(), AccessError> {
    if is_owner(principal, task) || is_assignee(principal, task) {
        return Ok(());
    }
    Err(AccessError::NotParticipant {
        task_id: task.id(),
        user: principal.id(),
    })
}

/// Authorizes completion: only the assigned employee.
///
/// # Errors
///
/// Returns [`AccessError::RoleRequired`] for customers and
/// [`AccessError::NotAssignee`] for any other employee.
pub fn authorize_completion(principal: &Principal, task: &Task) -> Result<(), AccessError> {
    require_role(principal, TaskAction::Complete)?;
    if is_assignee(principal, task) {
        return Ok(());
    }
    Err(AccessError::NotAssignee {
        task_id: task.id(),
        user: principal.id(),
    })
}

/// Authorizes reading a single task.
///
/// # Errors
///
/// Returns [`AccessError::NotVisible`] when the principal neither owns, holds,
/// nor could claim the task.
pub fn authorize_view(principal: &Principal, task: &Task) -> Result<(), AccessError> {
    if is_owner(principal, task) || is_assignee(principal, task) || is_claimable_by(principal, task)
    {
        return Ok(());
    }
    Err(AccessError::NotVisible {
        task_id: task.id(),
        user: principal.id(),
    })
}
