//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskWorld, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskdesk::identity::{Principal, UserId};
use taskdesk::task::domain::CreateTaskRequest;

fn request(title: String) -> CreateTaskRequest {
    let due = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap_or_default();
    CreateTaskRequest::new(title, "Created by a behaviour scenario", due)
}

#[given(r#"customer {customer:i64} has created a task titled "{title}""#)]
fn customer_created_task(
    world: &mut TaskWorld,
    customer: i64,
    title: String,
) -> Result<(), eyre::Report> {
    let task = run_async(
        world
            .service
            .create_task(Principal::customer(customer), request(title)),
    )
    .wrap_err("create task for scenario")?;
    world.current_task = Some(task.id());
    Ok(())
}

#[given(r#"customer {customer:i64} submits a task titled "{title}" on behalf of customer {claimed:i64}"#)]
fn customer_submits_spoofed_task(
    world: &mut TaskWorld,
    customer: i64,
    title: String,
    claimed: i64,
) {
    let spoofed = request(title).with_customer(UserId::new(claimed));
    let result = run_async(
        world
            .service
            .create_task(Principal::customer(customer), spoofed),
    );
    if let Ok(task) = &result {
        world.current_task = Some(task.id());
    }
    world.last_result = Some(result);
}

#[given("employee {employee:i64} has claimed the task")]
fn employee_claimed_task(world: &mut TaskWorld, employee: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    run_async(
        world
            .service
            .assign_task(Principal::employee(employee), task_id),
    )
    .wrap_err("claim task for scenario")?;
    Ok(())
}
