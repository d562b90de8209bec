//! Principal, role, and user identifier value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a user known to the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw user identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role carried in the identity provider's token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates tasks and owns them.
    Customer,
    /// Claims and completes tasks.
    Employee,
}

impl Role {
    /// Returns the canonical claim representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "customer" => Ok(Self::Customer),
            "employee" => Ok(Self::Employee),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Error returned when a role claim names an unknown role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Authenticated caller of a task operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    role: Role,
}

impl Principal {
    /// Creates a principal from verified identity claims.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Shorthand for a customer principal.
    #[must_use]
    pub const fn customer(id: i64) -> Self {
        Self::new(UserId::new(id), Role::Customer)
    }

    /// Shorthand for an employee principal.
    #[must_use]
    pub const fn employee(id: i64) -> Self {
        Self::new(UserId::new(id), Role::Employee)
    }

    /// Parses a principal from raw claim values.
    ///
    /// # Errors
    ///
    /// Returns [`ParseRoleError`] when the role claim is not recognised.
    pub fn from_claims(id: i64, role: &str) -> Result<Self, ParseRoleError> {
        Ok(Self::new(UserId::new(id), Role::try_from(role)?))
    }

    /// Returns the principal's user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the principal's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` when the principal holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
