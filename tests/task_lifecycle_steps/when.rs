//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskWorld, run_async};
use rstest_bdd_macros::when;
use taskdesk::identity::Principal;

#[when("employee {employee:i64} assigns the task")]
fn employee_assigns(world: &mut TaskWorld, employee: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    world.last_result = Some(run_async(
        world
            .service
            .assign_task(Principal::employee(employee), task_id),
    ));
    Ok(())
}

#[when("customer {customer:i64} assigns the task")]
fn customer_assigns(world: &mut TaskWorld, customer: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    world.last_result = Some(run_async(
        world
            .service
            .assign_task(Principal::customer(customer), task_id),
    ));
    Ok(())
}

#[when(r#"employee {employee:i64} completes the task with report "{report}""#)]
fn employee_completes_with_report(
    world: &mut TaskWorld,
    employee: i64,
    report: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    world.last_result = Some(run_async(world.service.complete_task(
        Principal::employee(employee),
        task_id,
        Some(report),
    )));
    Ok(())
}

#[when("employee {employee:i64} completes the task without a report")]
fn employee_completes_without_report(
    world: &mut TaskWorld,
    employee: i64,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    world.last_result = Some(run_async(world.service.complete_task(
        Principal::employee(employee),
        task_id,
        None,
    )));
    Ok(())
}
