//! Task lifecycle management for taskdesk.
//!
//! Customers create tasks; employees claim them and complete them with a
//! report. Every operation checks the caller's role and relationship to the
//! task before applying a state transition, and the store re-checks the
//! transition guard atomically when persisting it. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
