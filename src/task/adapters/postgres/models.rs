//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Store-assigned task identifier.
    pub id: i64,
    /// Short task title.
    pub title: String,
    /// Free-form task description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Lifecycle status.
    pub status: String,
    /// Owning customer.
    pub customer_id: i64,
    /// Assigned employee, if any.
    pub assigned_to: Option<i64>,
    /// Completion report, if any.
    pub report: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records. The identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Short task title.
    pub title: String,
    /// Free-form task description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Lifecycle status.
    pub status: String,
    /// Owning customer.
    pub customer_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for generic edits.
///
/// `None` fields are left out of the `UPDATE`, so an edit never overwrites
/// columns its payload did not supply.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskEditRow {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement due date.
    pub due_date: Option<NaiveDate>,
    /// Pre-filled report.
    pub report: Option<String>,
    /// Edit timestamp.
    pub updated_at: DateTime<Utc>,
}
