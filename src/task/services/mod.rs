//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{ErrorKind, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
