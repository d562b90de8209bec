//! Taskdesk: task-assignment backend core.
//!
//! Customers create tasks, employees claim and complete them, and every
//! operation is guarded by role and ownership checks.
//!
//! # Architecture
//!
//! Taskdesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`identity`]: Principals supplied by the external identity provider
//! - [`task`]: Task lifecycle state machine and access rules
//! - [`config`]: Database configuration and pool construction

pub mod config;
pub mod identity;
pub mod task;
