//! Identity types supplied by the external identity provider.
//!
//! The identity provider authenticates requests and hands the task core a
//! verified [`Principal`]. The core trusts that claim completely; the types
//! here only parse the claim values at the boundary.

mod principal;

pub use principal::{ParseRoleError, Principal, Role, UserId};
