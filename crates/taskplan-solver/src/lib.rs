//! # taskplan-solver
//!
//! Constraint-based scheduler for taskplan.
//!
//! Every engineer-day of every task becomes an integer decision variable
//! ("chunk") holding the working-day index it runs on. Precedence, per-task
//! concurrency, and team capacity are enforced simultaneously by a CP
//! solver, which minimizes a composite of makespan, context switching, and
//! procrastination. The solved day indices are then joined back onto
//! calendar dates through the workday calendar.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use taskplan_core::{Scheduler, Task, Team};
//! use taskplan_solver::CpScheduler;
//!
//! let design = Task::new("design", 3, 2).unwrap();
//! let build = Task::new("build", 2, 1).unwrap().depends_on("design");
//! let team = Team::new("platform", 3).unwrap();
//!
//! let scheduler = CpScheduler::new();
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let plan = scheduler.schedule(&[design, build], &team, start).unwrap();
//! assert_eq!(plan.scheduled_tasks.len(), 2);
//! ```

use chrono::NaiveDate;
use std::collections::BTreeMap;

use taskplan_core::{Calendar, Plan, ScheduleError, ScheduledTask, Scheduler, Task, Team};

pub mod dag;
mod model;

pub use dag::TaskGraph;

use model::SolveOutcome;

// ============================================================================
// Configuration
// ============================================================================

/// Scheduler configuration.
///
/// The defaults weigh makespan a hundred times heavier than context
/// switching and procrastination, so the solver first compresses the
/// project, then keeps individual tasks contiguous, then pulls work as
/// early as possible to break remaining ties.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Horizon: chunk days range over `[0, max_days]`. Too small a value
    /// makes the model infeasible.
    pub max_days: u32,
    /// Weight of the makespan term
    pub cost_of_time: i32,
    /// Weight of the per-task stretch beyond its optimistic duration
    pub cost_of_context: i32,
    /// Weight of the total-lateness term that pulls work earlier
    pub cost_of_procrastination: i32,
    /// Time budget for the CP search. When it expires the best incumbent
    /// is used; expiring without any solution is a solver error.
    pub solve_timeout_ms: u64,
    /// Workday calendar used to map day indices to dates
    pub calendar: Calendar,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_days: 100,
            cost_of_time: 100,
            cost_of_context: 1,
            cost_of_procrastination: 1,
            solve_timeout_ms: 30_000,
            calendar: Calendar::default(),
        }
    }
}

impl SchedulerConfig {
    /// Set the scheduling horizon
    pub fn max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    /// Set the makespan weight
    pub fn cost_of_time(mut self, cost: i32) -> Self {
        self.cost_of_time = cost;
        self
    }

    /// Set the context-switch weight
    pub fn cost_of_context(mut self, cost: i32) -> Self {
        self.cost_of_context = cost;
        self
    }

    /// Set the earliness-pressure weight
    pub fn cost_of_procrastination(mut self, cost: i32) -> Self {
        self.cost_of_procrastination = cost;
        self
    }

    /// Set the solver time budget in milliseconds
    pub fn solve_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.solve_timeout_ms = timeout_ms;
        self
    }

    /// Replace the workday predicate (default: Monday through Friday)
    pub fn workday_filter(
        mut self,
        filter: impl Fn(NaiveDate) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.calendar = Calendar::new(filter);
        self
    }

    /// Replace the whole calendar
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Constraint-programming scheduler.
///
/// A single synchronous call per plan; the model is rebuilt on every call
/// and no state is shared between calls. Solutions need not be unique:
/// two solves of the same input may place chunks differently but always
/// reach the same objective value.
pub struct CpScheduler {
    config: SchedulerConfig,
}

impl CpScheduler {
    /// Create a scheduler with the default configuration
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create a scheduler with a custom configuration
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Default for CpScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for CpScheduler {
    fn schedule(
        &self,
        tasks: &[Task],
        team: &Team,
        start_date: NaiveDate,
    ) -> Result<Plan, ScheduleError> {
        if tasks.is_empty() {
            return Ok(Plan {
                scheduled_tasks: Vec::new(),
                start_date,
                days_to_date: self.config.calendar.days_to_date(start_date, 0),
                objective: 0,
            });
        }

        let graph = TaskGraph::build(tasks)?;
        let outcome = model::solve(tasks, &graph, team, &self.config)?;
        Ok(materialize(tasks, start_date, &self.config.calendar, outcome))
    }
}

// ============================================================================
// Plan materialization
// ============================================================================

/// Join solved chunk days back onto tasks and calendar dates.
///
/// Input task order is preserved in the resulting plan.
fn materialize(
    tasks: &[Task],
    start_date: NaiveDate,
    calendar: &Calendar,
    outcome: SolveOutcome,
) -> Plan {
    // Count chunks per task per working day
    let mut allocations: Vec<BTreeMap<u32, u32>> = vec![BTreeMap::new(); tasks.len()];
    for (task_idx, days) in outcome.chunk_days.iter().enumerate() {
        for &day in days {
            *allocations[task_idx].entry(day).or_insert(0) += 1;
        }
    }

    let max_end_day = allocations
        .iter()
        .filter_map(|daily| daily.keys().next_back().copied())
        .max()
        .unwrap_or(0);
    let days_to_date = calendar.days_to_date(start_date, max_end_day);

    let scheduled_tasks = tasks
        .iter()
        .zip(allocations)
        .map(|(task, daily)| {
            let start_day = daily.keys().next().copied().unwrap_or(0);
            let end_day = daily.keys().next_back().copied().unwrap_or(0);
            let date_allocation: BTreeMap<NaiveDate, u32> = daily
                .iter()
                .map(|(&day, &count)| (days_to_date[&day], count))
                .collect();

            ScheduledTask {
                task: task.clone(),
                daily_engineer_allocation: daily,
                date_engineer_allocation: date_allocation,
                start_day,
                end_day,
                start_date: days_to_date[&start_day],
                end_date: days_to_date[&end_day],
            }
        })
        .collect();

    Plan {
        scheduled_tasks,
        start_date,
        days_to_date,
        objective: outcome.objective,
    }
}
