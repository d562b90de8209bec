//! Task repository tests against embedded `PostgreSQL`.

use crate::postgres::helpers::{BoxError, TestDatabase, test_runtime};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use std::sync::Arc;
use taskdesk::identity::{Principal, UserId};
use taskdesk::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{CreateTaskRequest, NewTask, Task, TaskChanges, TaskDetails, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
    services::{ErrorKind, TaskLifecycleService},
};

type PgService = TaskLifecycleService<PostgresTaskRepository, DefaultClock>;

fn service(repository: &Arc<PostgresTaskRepository>) -> Arc<PgService> {
    Arc::new(TaskLifecycleService::new(
        Arc::clone(repository),
        Arc::new(DefaultClock),
    ))
}

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 1).unwrap_or_default()
}

fn new_task(title: &str, customer: i64) -> NewTask {
    NewTask::new(
        TaskDetails::new(title, "Stored through Diesel", due_date()),
        UserId::new(customer),
        &DefaultClock,
    )
}

fn ensure(condition: bool, message: &str) -> Result<(), BoxError> {
    if condition {
        Ok(())
    } else {
        Err(message.into())
    }
}

#[rstest]
fn create_then_find_round_trips(shared_test_cluster: &'static TestCluster) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_round_trip")?;
    let repository = database.repository()?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let first = repository.create(new_task("Service the boiler", 3)).await?;
        let second = repository.create(new_task("Bleed radiators", 3)).await?;
        let found = repository.find_by_id(first.id()).await?;
        let missing = repository.find_by_id(TaskId::new(9_999)).await?;

        ensure(found.as_ref() == Some(&first), "stored task differs from created task")?;
        ensure(second.id().value() > first.id().value(), "ids must increase")?;
        ensure(first.status() == TaskStatus::Pending, "new task must be pending")?;
        ensure(first.assigned_to().is_none(), "new task must be unassigned")?;
        ensure(first.created_at() == first.updated_at(), "timestamps must match")?;
        ensure(missing.is_none(), "unknown id must not be found")?;
        Ok(())
    })
}

#[rstest]
fn stale_claim_by_second_employee_is_rejected_by_the_store(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_claim_conflict")?;
    let repository = database.repository()?;
    let service = service(&repository);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repository.create(new_task("Fit a new lock", 3)).await?;
        let mut stale = repository
            .find_by_id(task.id())
            .await?
            .ok_or("task disappeared")?;

        service.assign_task(Principal::employee(10), task.id()).await?;
        stale.claim(UserId::new(11), &DefaultClock)?;
        let result = repository.claim(&stale).await;
        let via_service = service.assign_task(Principal::employee(11), task.id()).await;
        let stored = repository
            .find_by_id(task.id())
            .await?
            .ok_or("task disappeared")?;

        ensure(
            matches!(
                result,
                Err(TaskRepositoryError::AlreadyAssigned { assignee, .. })
                    if assignee == UserId::new(10)
            ),
            "store must refuse a claim over another employee",
        )?;
        ensure(
            via_service.err().map(|err| err.kind()) == Some(ErrorKind::Conflict),
            "service must report a conflict",
        )?;
        ensure(
            stored.assigned_to() == Some(UserId::new(10)),
            "first claim must be kept",
        )?;
        Ok(())
    })
}

#[rstest]
fn racing_claims_have_exactly_one_winner(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_claim_race")?;
    let repository = database.repository()?;
    let service = service(&repository);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repository.create(new_task("Replace the fuse box", 3)).await?;
        let handles: Vec<_> = (100..108)
            .map(|employee| {
                let racer = Arc::clone(&service);
                let task_id = task.id();
                tokio::spawn(async move {
                    racer
                        .assign_task(Principal::employee(employee), task_id)
                        .await
                        .map(|claimed| claimed.assigned_to())
                        .map_err(|err| err.kind())
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await? {
                Ok(assignee) => winners.push(assignee),
                Err(kind) => ensure(kind == ErrorKind::Conflict, "losers must see a conflict")?,
            }
        }
        let stored = repository
            .find_by_id(task.id())
            .await?
            .ok_or("task disappeared")?;

        ensure(winners.len() == 1, "exactly one claim must win")?;
        ensure(
            winners.first().copied().flatten() == stored.assigned_to(),
            "stored assignee must be the winner",
        )?;
        ensure(
            stored.status() == TaskStatus::InProgress,
            "claimed task must be in progress",
        )?;
        Ok(())
    })
}

#[rstest]
fn writes_to_a_completed_task_are_rejected(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_completed")?;
    let repository = database.repository()?;
    let service = service(&repository);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repository.create(new_task("Sweep the chimney", 3)).await?;
        let claimed = service.assign_task(Principal::employee(10), task.id()).await?;
        let mut stale = claimed.clone();

        let completed = service
            .complete_task(Principal::employee(10), task.id(), Some("Swept".to_owned()))
            .await?;
        stale.complete(Some("Swept twice".to_owned()), &DefaultClock)?;
        let second_completion = repository.complete(&stale).await;
        let late_edit = repository
            .update(task.id(), &TaskChanges::new().with_title("Too late"), Utc::now())
            .await;
        let stored = repository
            .find_by_id(task.id())
            .await?
            .ok_or("task disappeared")?;

        ensure(
            matches!(second_completion, Err(TaskRepositoryError::AlreadyCompleted(id)) if id == task.id()),
            "second completion must see the completed row",
        )?;
        ensure(
            matches!(late_edit, Err(TaskRepositoryError::AlreadyCompleted(_))),
            "edits after completion must be refused",
        )?;
        ensure(
            stored.status() == completed.status() && stored.details() == completed.details(),
            "completed task must be unchanged",
        )?;
        ensure(stored.report() == Some("Swept"), "first report must be kept")?;
        Ok(())
    })
}

#[rstest]
fn stale_edits_of_different_fields_both_persist(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_stale_edits")?;
    let repository = database.repository()?;
    let service = service(&repository);
    let rt = test_runtime()?;

    rt.block_on(async {
        let customer = Principal::customer(3);
        let employee = Principal::employee(10);
        let task = service
            .create_task(
                customer,
                CreateTaskRequest::new("Tile the bathroom", "White tiles", due_date()),
            )
            .await?;
        service.assign_task(employee, task.id()).await?;

        let employee_view = service.find_task(employee, task.id()).await?;
        let customer_view = service.find_task(customer, task.id()).await?;
        repository
            .update(
                employee_view.id(),
                &TaskChanges::new().with_report("Grout ordered"),
                Utc::now(),
            )
            .await?;
        let stored = repository
            .update(
                customer_view.id(),
                &TaskChanges::new().with_title("Tile the kitchen"),
                Utc::now(),
            )
            .await?;

        ensure(stored.details().title() == "Tile the kitchen", "title must be updated")?;
        ensure(stored.report() == Some("Grout ordered"), "report must survive")?;
        ensure(
            stored.details().description() == "White tiles",
            "untouched fields must be kept",
        )?;
        ensure(
            stored.status() == TaskStatus::InProgress,
            "edits must not change the status",
        )?;
        Ok(())
    })
}

#[rstest]
fn listings_follow_ownership_and_assignment(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_listing")?;
    let repository = database.repository()?;
    let service = service(&repository);
    let rt = test_runtime()?;

    rt.block_on(async {
        let claimed = repository.create(new_task("Prune the roses", 3)).await?;
        let open = repository.create(new_task("Rake the leaves", 3)).await?;
        let foreign = repository.create(new_task("Wash the windows", 4)).await?;
        let held_by_other = repository.create(new_task("Clear the drains", 4)).await?;
        service.assign_task(Principal::employee(10), claimed.id()).await?;
        service
            .assign_task(Principal::employee(11), held_by_other.id())
            .await?;

        let ids = |tasks: Vec<Task>| {
            tasks.iter().map(|task| task.id()).collect::<Vec<_>>()
        };
        let owned = ids(repository.find_by_customer(UserId::new(3)).await?);
        let visible_to_ten = ids(repository.find_claimable(UserId::new(10)).await?);
        let visible_to_twelve = ids(repository.find_claimable(UserId::new(12)).await?);

        ensure(owned == vec![claimed.id(), open.id()], "customer sees own tasks")?;
        ensure(
            visible_to_ten == vec![claimed.id(), open.id(), foreign.id()],
            "employee sees held and unassigned tasks",
        )?;
        ensure(
            visible_to_twelve == vec![open.id(), foreign.id()],
            "idle employee sees only unassigned tasks",
        )?;
        Ok(())
    })
}

#[rstest]
fn schema_rejects_completion_without_report(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster, "task_constraints")?;
    let repository = database.repository()?;
    let rt = test_runtime()?;

    let task = rt.block_on(repository.create(new_task("Fix the gate", 3)))?;
    let mut conn = database.connect()?;
    let completed_without_report = diesel::sql_query(
        "UPDATE tasks SET status = 'completed', assigned_to = 10 WHERE id = $1",
    )
    .bind::<diesel::sql_types::BigInt, _>(task.id().value())
    .execute(&mut conn);
    let in_progress_without_assignee =
        diesel::sql_query("UPDATE tasks SET status = 'in_progress' WHERE id = $1")
            .bind::<diesel::sql_types::BigInt, _>(task.id().value())
            .execute(&mut conn);
    let unknown_status = diesel::sql_query("UPDATE tasks SET status = 'archived' WHERE id = $1")
        .bind::<diesel::sql_types::BigInt, _>(task.id().value())
        .execute(&mut conn);

    ensure(
        completed_without_report.is_err(),
        "completed rows need a report",
    )?;
    ensure(
        in_progress_without_assignee.is_err(),
        "claimed rows need an assignee",
    )?;
    ensure(unknown_status.is_err(), "status must be a known value")?;
    Ok(())
}
