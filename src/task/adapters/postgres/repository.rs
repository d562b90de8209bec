//! `PostgreSQL` repository implementation for task lifecycle storage.
//!
//! Writes run inside a transaction that locks the stored row with
//! `SELECT ... FOR UPDATE`, re-checks the guard, and then updates only the
//! columns owned by the transition.

use super::{
    models::{NewTaskRow, TaskEditRow, TaskRow},
    schema::tasks,
};
use crate::identity::UserId;
use crate::task::{
    domain::{NewTask, PersistedTaskData, Task, TaskChanges, TaskDetails, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        let new_row = to_new_row(&task);
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)?;
            row_to_task(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let edit = to_edit_row(changes, updated_at);
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| {
                lock_mutable_row(conn, id)?;
                let row = diesel::update(tasks::table.find(id.value()))
                    .set(&edit)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(conn)?;
                row_to_task(row)
            })
        })
        .await
    }

    async fn claim(&self, task: &Task) -> TaskRepositoryResult<()> {
        let snapshot = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| {
                let stored = lock_mutable_row(conn, snapshot.id())?;
                ensure_assignee_compatible(&stored, &snapshot)?;
                diesel::update(tasks::table.find(snapshot.id().value()))
                    .set((
                        tasks::assigned_to.eq(snapshot.assigned_to().map(UserId::value)),
                        tasks::status.eq(snapshot.status().as_str()),
                        tasks::updated_at.eq(snapshot.updated_at()),
                    ))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn complete(&self, task: &Task) -> TaskRepositoryResult<()> {
        let snapshot = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| {
                let stored = lock_mutable_row(conn, snapshot.id())?;
                ensure_assignee_compatible(&stored, &snapshot)?;
                diesel::update(tasks::table.find(snapshot.id().value()))
                    .set((
                        tasks::report.eq(snapshot.report()),
                        tasks::status.eq(snapshot.status().as_str()),
                        tasks::updated_at.eq(snapshot.updated_at()),
                    ))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_customer(&self, customer: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::customer_id.eq(customer.value()))
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_claimable(&self, employee: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(
                    tasks::assigned_to
                        .is_null()
                        .or(tasks::assigned_to.eq(employee.value()).assume_not_null()),
                )
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

/// Locks the stored row for the rest of the transaction and rejects writes to
/// missing or completed tasks.
fn lock_mutable_row(connection: &mut PgConnection, id: TaskId) -> TaskRepositoryResult<Task> {
    let row = tasks::table
        .find(id.value())
        .select(TaskRow::as_select())
        .for_update()
        .first::<TaskRow>(connection)
        .optional()?
        .ok_or(TaskRepositoryError::NotFound(id))?;
    let stored = row_to_task(row)?;
    if stored.is_completed() {
        return Err(TaskRepositoryError::AlreadyCompleted(id));
    }
    Ok(stored)
}

/// Rejects writes when the stored assignee differs from the snapshot's.
fn ensure_assignee_compatible(stored: &Task, snapshot: &Task) -> TaskRepositoryResult<()> {
    match (stored.assigned_to(), snapshot.assigned_to()) {
        (Some(current), Some(requested)) if current != requested => {
            Err(TaskRepositoryError::AlreadyAssigned {
                task_id: stored.id(),
                assignee: current,
            })
        }
        _ => Ok(()),
    }
}

fn to_new_row(task: &NewTask) -> NewTaskRow {
    let details = task.details();
    NewTaskRow {
        title: details.title().to_owned(),
        description: details.description().to_owned(),
        due_date: details.due_date(),
        status: TaskStatus::Pending.as_str().to_owned(),
        customer_id: task.customer().value(),
        created_at: task.created_at(),
        updated_at: task.created_at(),
    }
}

/// Builds a changeset that skips every field the edit does not supply.
fn to_edit_row(changes: &TaskChanges, updated_at: DateTime<Utc>) -> TaskEditRow {
    TaskEditRow {
        title: changes.title().map(str::to_owned),
        description: changes.description().map(str::to_owned),
        due_date: changes.due_date(),
        report: changes.report().map(str::to_owned),
        updated_at,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        due_date,
        status: persisted_status,
        customer_id,
        assigned_to,
        report,
        created_at,
        updated_at,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id),
        details: TaskDetails::new(title, description, due_date),
        status,
        customer: UserId::new(customer_id),
        assigned_to: assigned_to.map(UserId::new),
        report,
        created_at,
        updated_at,
    }))
}
