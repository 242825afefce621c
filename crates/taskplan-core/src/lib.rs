//! # taskplan-core
//!
//! Core domain model for the taskplan scheduling engine.
//!
//! This crate provides:
//! - Domain types: `Task`, `Team`, `Plan`, `ScheduledTask`
//! - The `Calendar` workday mapping
//! - The `Scheduler` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use taskplan_core::{Task, Team};
//!
//! let design = Task::new("design", 5, 2).unwrap()
//!     .description("Design the prototype")
//!     .point_of_contact("Engineer A");
//! let implement = Task::new("implement", 10, 3).unwrap()
//!     .depends_on("design");
//! let team = Team::new("platform", 3).unwrap();
//! assert_eq!(implement.optimistic_duration(team.size), 3);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod calendar;

pub use calendar::Calendar;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a task (its name)
pub type TaskId = String;

// ============================================================================
// Task
// ============================================================================

/// A schedulable unit of work.
///
/// Effort is measured in whole engineer-days; the parallelization factor
/// caps how many engineers may work on the task on any single day.
/// Identity, equality, and hashing are by `name` only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within a scheduling run
    pub name: TaskId,
    /// Human-readable description (carried through, not scheduled on)
    pub description: String,
    /// Reference links (design docs, tickets)
    pub references: Vec<String>,
    /// Who to ask about this task
    pub point_of_contact: String,
    /// Total effort in engineer-days
    pub effort: u32,
    /// Maximum engineers that may work on this task per day
    pub parallelization_factor: u32,
    /// Names of tasks that must finish before this one starts
    pub depends: Vec<TaskId>,
}

impl Task {
    /// Create a new task.
    ///
    /// Rejects an empty name, zero effort, or a zero parallelization factor
    /// with [`ScheduleError::InvalidTask`].
    pub fn new(
        name: impl Into<String>,
        effort: u32,
        parallelization_factor: u32,
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ScheduleError::InvalidTask(
                "task name must not be empty".into(),
            ));
        }
        if effort == 0 {
            return Err(ScheduleError::InvalidTask(format!(
                "task '{}' must have an effort of at least 1 engineer-day",
                name
            )));
        }
        if parallelization_factor == 0 {
            return Err(ScheduleError::InvalidTask(format!(
                "task '{}' must have a parallelization factor of at least 1",
                name
            )));
        }
        Ok(Self {
            name,
            description: String::new(),
            references: Vec::new(),
            point_of_contact: String::new(),
            effort,
            parallelization_factor,
            depends: Vec::new(),
        })
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a reference link
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    /// Set the point of contact
    pub fn point_of_contact(mut self, contact: impl Into<String>) -> Self {
        self.point_of_contact = contact.into();
        self
    }

    /// Add a prerequisite task by name.
    ///
    /// The dependency is strict: every engineer-day of this task is
    /// scheduled after the prerequisite's last engineer-day.
    pub fn depends_on(mut self, predecessor: impl Into<String>) -> Self {
        self.depends.push(predecessor.into());
        self
    }

    /// Shortest span in working days this task could occupy when given
    /// maximum concurrency: `effort / min(team_size, parallelization_factor)`
    /// with integer floor division.
    pub fn optimistic_duration(&self, team_size: u32) -> u32 {
        self.effort / self.parallelization_factor.min(team_size).max(1)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Task {}

impl std::hash::Hash for Task {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// ============================================================================
// Team
// ============================================================================

/// A fixed-size pool of interchangeable engineers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Human-readable name
    pub name: String,
    /// Engineers available on every working day
    pub size: u32,
}

impl Team {
    /// Create a new team. Rejects a zero size with
    /// [`ScheduleError::InvalidTeam`].
    pub fn new(name: impl Into<String>, size: u32) -> Result<Self, ScheduleError> {
        let name = name.into();
        if size == 0 {
            return Err(ScheduleError::InvalidTeam(format!(
                "team '{}' must have at least 1 engineer",
                name
            )));
        }
        Ok(Self { name, size })
    }
}

// ============================================================================
// Plan (Result)
// ============================================================================

/// A task with its engineer-days placed on concrete working days.
///
/// Built once by the scheduler after a successful solve; not mutated
/// afterwards. Absent keys in the allocation maps mean zero engineers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// The task being scheduled
    pub task: Task,
    /// Working-day index -> engineers assigned that day (all values >= 1)
    pub daily_engineer_allocation: BTreeMap<u32, u32>,
    /// Calendar date -> engineers assigned that day
    pub date_engineer_allocation: BTreeMap<NaiveDate, u32>,
    /// First working-day index with an allocation
    pub start_day: u32,
    /// Last working-day index with an allocation
    pub end_day: u32,
    /// Calendar date of `start_day`
    pub start_date: NaiveDate,
    /// Calendar date of `end_day`
    pub end_date: NaiveDate,
}

/// The result of scheduling a set of tasks.
///
/// Scheduled tasks preserve the input order. `days_to_date` is the full
/// working-day-index to calendar-date mapping used by downstream renderers
/// to align per-day totals with dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Scheduled tasks, in input order
    pub scheduled_tasks: Vec<ScheduledTask>,
    /// Project start date
    pub start_date: NaiveDate,
    /// Working-day index -> calendar date, covering day 0 through the last
    /// day any task ends
    pub days_to_date: BTreeMap<u32, NaiveDate>,
    /// Value of the minimized objective. Two solves of identical inputs
    /// produce equal objectives even when tie-breaking differs.
    pub objective: i64,
}

impl Plan {
    /// Index of the last working day on which any engineer-day is scheduled.
    /// `None` for an empty plan.
    pub fn makespan(&self) -> Option<u32> {
        self.scheduled_tasks.iter().map(|t| t.end_day).max()
    }

    /// Calendar date of the makespan day. `None` for an empty plan.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.makespan()
            .and_then(|d| self.days_to_date.get(&d).copied())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Core scheduling abstraction.
///
/// Scheduling is a single synchronous call: from the caller's perspective
/// the scheduler is a pure function from `(tasks, team, start_date)` to a
/// plan or an error. No state is shared between calls.
pub trait Scheduler: Send + Sync {
    /// Compute a plan for the given tasks.
    fn schedule(
        &self,
        tasks: &[Task],
        team: &Team,
        start_date: NaiveDate,
    ) -> Result<Plan, ScheduleError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Scheduling error
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid team: {0}")]
    InvalidTeam(String),

    #[error("Circular dependency detected involving tasks: {tasks:?}")]
    CycleDetected { tasks: Vec<TaskId> },

    #[error("Task '{task}' depends on '{missing}' which does not exist")]
    UnknownDependency { task: TaskId, missing: TaskId },

    #[error("No feasible schedule within {max_days} working days")]
    Infeasible { max_days: u32 },

    #[error("Solver error: {0}")]
    Solver(String),
}

// ============================================================================
// Tests
// ============================================================================
