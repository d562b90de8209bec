//! Caller-supplied payloads for task creation and editing.
//!
//! Payloads carry no `assigned_to` or `status` fields, and the `customer`
//! field of a creation request is never trusted. Deserializing a JSON body
//! that carries protected keys drops them.

use super::{TaskDetails, TaskDomainError};
use crate::identity::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    customer: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with all required fields present.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            due_date: Some(due_date),
            customer: None,
        }
    }

    /// Sets the task title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Records a caller-claimed owner. Creation always ignores it in favour
    /// of the authenticated principal.
    #[must_use]
    pub const fn with_customer(mut self, customer: UserId) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Returns the owner claimed in the payload, if any.
    #[must_use]
    pub const fn requested_customer(&self) -> Option<UserId> {
        self.customer
    }

    /// Validates presence of the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] naming the first absent
    /// field and [`TaskDomainError::TitleTooLong`] for oversized titles.
    pub fn into_details(self) -> Result<TaskDetails, TaskDomainError> {
        let title = self.title.ok_or(TaskDomainError::MissingField("title"))?;
        let description = self
            .description
            .ok_or(TaskDomainError::MissingField("description"))?;
        let due_date = self
            .due_date
            .ok_or(TaskDomainError::MissingField("due_date"))?;
        TaskDetails::validate_title(&title)?;
        Ok(TaskDetails::new(title, description, due_date))
    }
}

/// How a generic update applies its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Full update: every descriptive field must be supplied.
    Replace,
    /// Partial update: only supplied fields are applied.
    Merge,
}

/// Editable task fields for a generic update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChanges {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    report: Option<String>,
}

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Pre-fills the completion report.
    #[must_use]
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// Returns the requested title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the requested description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the requested due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the requested report text.
    #[must_use]
    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Checks that a full update supplies every descriptive field.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] naming the first absent
    /// field.
    pub const fn ensure_complete(&self) -> Result<(), TaskDomainError> {
        if self.title.is_none() {
            return Err(TaskDomainError::MissingField("title"));
        }
        if self.description.is_none() {
            return Err(TaskDomainError::MissingField("description"));
        }
        if self.due_date.is_none() {
            return Err(TaskDomainError::MissingField("due_date"));
        }
        Ok(())
    }
}
