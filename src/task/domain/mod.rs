//! Domain model for the task lifecycle.
//!
//! The task domain models creation by customers, claiming and completion by
//! employees, and the access rules around them, while keeping all
//! infrastructure concerns outside of the domain boundary.

pub mod access;
mod error;
mod ids;
mod request;
mod task;

pub use access::{AccessError, TaskAction};
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use request::{CreateTaskRequest, TaskChanges, UpdateMode};
pub use task::{MAX_TITLE_CHARS, NewTask, PersistedTaskData, Task, TaskDetails, TaskStatus};
