//! End-to-end scheduling scenarios where the objective admits a unique
//! solution, so exact allocations and calendar dates can be asserted.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use taskplan_core::{Scheduler, Task, Team};
use taskplan_solver::{CpScheduler, SchedulerConfig};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn task(name: &str, effort: u32, parallelization_factor: u32) -> Task {
    Task::new(name, effort, parallelization_factor).unwrap()
}

#[test]
fn single_task_splits_across_two_days() {
    let tasks = vec![task("prototype", 3, 2)];
    let team = Team::new("eng", 3).unwrap();

    let plan = CpScheduler::new()
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    // Two engineers on day 0, one on day 1; front-loading beats {0:1, 1:2}
    // on the procrastination term.
    let scheduled = &plan.scheduled_tasks[0];
    assert_eq!(
        scheduled.daily_engineer_allocation,
        BTreeMap::from([(0, 2), (1, 1)])
    );
    assert_eq!(scheduled.start_date, date(2025, 1, 1));
    assert_eq!(scheduled.end_date, date(2025, 1, 2));

    // 100 * makespan 1 + context 0 + chunk days 0+0+1
    assert_eq!(plan.objective, 101);
}

#[test]
fn dependent_task_starts_after_prerequisite_finishes() {
    let tasks = vec![
        task("design", 3, 2),
        task("build", 2, 1).depends_on("design"),
    ];
    let team = Team::new("eng", 3).unwrap();

    // 2025-01-01 is a Wednesday
    let plan = CpScheduler::new()
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    let design = &plan.scheduled_tasks[0];
    assert_eq!(
        design.daily_engineer_allocation,
        BTreeMap::from([(0, 2), (1, 1)])
    );
    assert_eq!(design.start_date, date(2025, 1, 1));
    assert_eq!(design.end_date, date(2025, 1, 2));

    // build may only start the day after design's last engineer-day and
    // crosses the weekend on the calendar
    let build = &plan.scheduled_tasks[1];
    assert_eq!(
        build.daily_engineer_allocation,
        BTreeMap::from([(2, 1), (3, 1)])
    );
    assert_eq!(build.start_date, date(2025, 1, 3)); // Friday
    assert_eq!(build.end_date, date(2025, 1, 6)); // Monday

    // 100 * makespan 3 + context (0 + -1) + chunk days (1 + 5)
    assert_eq!(plan.objective, 305);
}

#[test]
fn diamond_dependencies_schedule_in_three_waves() {
    let tasks = vec![
        task("a", 1, 1),
        task("b", 1, 1).depends_on("a"),
        task("c", 1, 1).depends_on("a"),
        task("d", 1, 1).depends_on("b").depends_on("c"),
    ];
    let team = Team::new("pair", 2).unwrap();

    let plan = CpScheduler::new()
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    assert_eq!(
        plan.scheduled_tasks[0].daily_engineer_allocation,
        BTreeMap::from([(0, 1)])
    );
    assert_eq!(
        plan.scheduled_tasks[1].daily_engineer_allocation,
        BTreeMap::from([(1, 1)])
    );
    assert_eq!(
        plan.scheduled_tasks[2].daily_engineer_allocation,
        BTreeMap::from([(1, 1)])
    );
    assert_eq!(
        plan.scheduled_tasks[3].daily_engineer_allocation,
        BTreeMap::from([(2, 1)])
    );

    assert_eq!(plan.makespan(), Some(2));
    assert_eq!(plan.end_date(), Some(date(2025, 1, 3)));

    // 100 * makespan 2 + context 4 * -1 + chunk days 0+1+1+2
    assert_eq!(plan.objective, 200);
}

#[test]
fn one_engineer_day_lands_on_day_zero() {
    let tasks = vec![task("tiny", 1, 1)];
    let team = Team::new("solo", 1).unwrap();

    let plan = CpScheduler::new()
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    let scheduled = &plan.scheduled_tasks[0];
    assert_eq!(scheduled.daily_engineer_allocation, BTreeMap::from([(0, 1)]));
    assert_eq!(scheduled.start_date, date(2025, 1, 1));
    assert_eq!(scheduled.end_date, date(2025, 1, 1));

    // A one-day task spans zero days but its optimistic duration is one,
    // so the context term goes negative: 0 + -1 + 0.
    assert_eq!(plan.objective, -1);
}

#[test]
fn custom_workday_filter_changes_the_calendar() {
    let tasks = vec![
        task("design", 3, 2),
        task("build", 2, 1).depends_on("design"),
    ];
    let team = Team::new("eng", 3).unwrap();

    // Seven-day week: nothing is skipped, so build ends on Saturday
    let config = SchedulerConfig::default().workday_filter(|_| true);
    let plan = CpScheduler::with_config(config)
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    let build = &plan.scheduled_tasks[1];
    assert_eq!(build.start_date, date(2025, 1, 3));
    assert_eq!(build.end_date, date(2025, 1, 4));
}

#[test]
fn objective_weights_are_configurable() {
    let tasks = vec![task("steady", 2, 1)];
    let team = Team::new("solo", 1).unwrap();

    let config = SchedulerConfig::default()
        .cost_of_time(7)
        .cost_of_context(0)
        .cost_of_procrastination(1);
    let plan = CpScheduler::with_config(config)
        .schedule(&tasks, &team, date(2025, 1, 1))
        .unwrap();

    // 7 * makespan 1 + 0 + chunk days 0+1
    assert_eq!(plan.objective, 8);
    assert_eq!(
        plan.scheduled_tasks[0].daily_engineer_allocation,
        BTreeMap::from([(0, 1), (1, 1)])
    );
}
