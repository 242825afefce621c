//! Chunk-level constraint model
//!
//! Every engineer-day of every task ("chunk") gets one integer variable
//! holding the working-day index it executes on. The model emits:
//!
//! - intra-task monotonicity between adjacent chunks (symmetry breaking)
//! - strict precedence between every chunk pair across a dependency edge
//! - per-task and team-wide daily capacity as `cumulative` constraints
//!   with unit durations and demands
//!
//! and minimizes the weighted sum of makespan, per-task stretch beyond the
//! optimistic duration, and total chunk lateness.

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::TransformableVariable;
use pumpkin_solver::Solver;
use std::time::{Duration, Instant};
use taskplan_core::{ScheduleError, Task, Team};

use crate::dag::TaskGraph;
use crate::SchedulerConfig;

/// Chunk-to-day assignments extracted from the solver
pub(crate) struct SolveOutcome {
    /// Per task (input order), per chunk (ascending), the assigned
    /// working-day index
    pub chunk_days: Vec<Vec<u32>>,
    /// Value of the minimized composite objective
    pub objective: i64,
}

/// Build the chunk model and minimize the composite objective.
///
/// Returns `Infeasible` when no assignment fits within `max_days`, and
/// `Solver` when the time budget expires before any solution is found.
pub(crate) fn solve(
    tasks: &[Task],
    graph: &TaskGraph,
    team: &Team,
    config: &SchedulerConfig,
) -> Result<SolveOutcome, ScheduleError> {
    let started = Instant::now();
    let max_day = config.max_days as i32;
    let team_size = team.size as i32;

    let mut solver = Solver::default();
    let tag = solver.new_constraint_tag();

    // One variable per engineer-day, domain [0, max_days]
    let chunk_vars: Vec<Vec<_>> = tasks
        .iter()
        .map(|task| {
            (0..task.effort)
                .map(|_| solver.new_bounded_integer(0, max_day))
                .collect::<Vec<_>>()
        })
        .collect();
    let total_chunks: usize = chunk_vars.iter().map(Vec::len).sum();

    // Chunks of the same task are interchangeable; ordering them by day
    // prunes permutations without restricting the solution space.
    for chunks in &chunk_vars {
        for pair in chunks.windows(2) {
            let _ = solver
                .add_constraint(cp::greater_than_or_equals(
                    vec![pair[1].scaled(1), pair[0].scaled(-1)],
                    0,
                    tag,
                ))
                .post();
        }
    }

    // Precedence: a dependent's chunks all land strictly after every chunk
    // of the prerequisite. The second inequality is implied by the first
    // and kept as a redundant constraint for propagation.
    for dependent in 0..tasks.len() {
        for &prereq in graph.dependencies(dependent) {
            for &pred_chunk in &chunk_vars[prereq] {
                for &succ_chunk in &chunk_vars[dependent] {
                    let _ = solver
                        .add_constraint(cp::greater_than_or_equals(
                            vec![succ_chunk.scaled(1), pred_chunk.scaled(-1)],
                            1,
                            tag,
                        ))
                        .post();
                    let _ = solver
                        .add_constraint(cp::greater_than_or_equals(
                            vec![succ_chunk.scaled(1), pred_chunk.scaled(-1)],
                            -1,
                            tag,
                        ))
                        .post();
                }
            }
        }
    }

    // Per-task daily capacity: with unit durations and demands, cumulative
    // usage on a day is exactly the number of chunks placed there.
    for (task, chunks) in tasks.iter().zip(&chunk_vars) {
        let capacity = task.parallelization_factor.min(team.size) as i32;
        let _ = solver
            .add_constraint(cp::cumulative(
                chunks.clone(),
                vec![1; chunks.len()],
                vec![1; chunks.len()],
                capacity,
                tag,
            ))
            .post();
    }

    // Team daily capacity across all tasks
    let all_chunks: Vec<_> = chunk_vars.iter().flatten().copied().collect();
    let _ = solver
        .add_constraint(cp::cumulative(
            all_chunks.clone(),
            vec![1; total_chunks],
            vec![1; total_chunks],
            team_size,
            tag,
        ))
        .post();

    // Makespan: bounded below by every chunk; minimization pushes it down
    // to the latest day actually used.
    let makespan = solver.new_bounded_integer(0, max_day);
    for &chunk in &all_chunks {
        let _ = solver
            .add_constraint(cp::greater_than_or_equals(
                vec![makespan.scaled(1), chunk.scaled(-1)],
                0,
                tag,
            ))
            .post();
    }

    // Composite objective:
    //
    //   cost_of_time            * makespan
    // + cost_of_context         * sum_T (max_day(T) - min_day(T) - optimistic(T))
    // + cost_of_procrastination * sum of all chunk days
    //
    // Monotonicity makes a task's last chunk its max day and its first
    // chunk its min day, so the context term needs no extra variables.
    // The objective variable is bounded below by the weighted sum and
    // pushed down by minimization; the constant -cost_of_context *
    // sum(optimistic) moves to the right-hand side. The context term can
    // be negative, so the variable's lower bound must admit it.
    let cost_of_time = config.cost_of_time;
    let cost_of_context = config.cost_of_context;
    let cost_of_procrastination = config.cost_of_procrastination;

    let optimistic_total: i64 = tasks
        .iter()
        .map(|t| i64::from(t.optimistic_duration(team.size)))
        .sum();
    let constant = (-i64::from(cost_of_context) * optimistic_total).max(i64::from(i32::MIN)) as i32;

    let objective_ub = i64::from(cost_of_time) * i64::from(max_day)
        + i64::from(cost_of_context) * (tasks.len() as i64) * i64::from(max_day)
        + i64::from(cost_of_procrastination) * (total_chunks as i64) * i64::from(max_day);
    let objective =
        solver.new_bounded_integer(constant, objective_ub.min(i64::from(i32::MAX)) as i32);

    let mut terms = Vec::with_capacity(total_chunks + 2);
    terms.push(objective.scaled(1));
    terms.push(makespan.scaled(-cost_of_time));
    for chunks in &chunk_vars {
        let last = chunks.len() - 1;
        for (i, &chunk) in chunks.iter().enumerate() {
            // Base lateness coefficient, plus the context span for the
            // first and last chunk. For a single-chunk task the span
            // contributions cancel.
            let mut coefficient = -cost_of_procrastination;
            if i == 0 {
                coefficient += cost_of_context;
            }
            if i == last {
                coefficient -= cost_of_context;
            }
            if coefficient != 0 {
                terms.push(chunk.scaled(coefficient));
            }
        }
    }
    let _ = solver
        .add_constraint(cp::greater_than_or_equals(terms, constant, tag))
        .post();

    tracing::debug!(
        tasks = tasks.len(),
        chunks = total_chunks,
        max_days = config.max_days,
        "built chunk model"
    );

    // Minimize using linear SAT-UNSAT search within the time budget
    let mut brancher = solver.default_brancher();
    let mut termination =
        TimeBudget::starting_now(Duration::from_millis(config.solve_timeout_ms));

    fn noop_callback<B>(_: &Solver, _: pumpkin_solver::results::SolutionReference, _: &B) {}
    let result = solver.optimise(
        &mut brancher,
        &mut termination,
        LinearSatUnsat::new(OptimisationDirection::Minimise, objective, noop_callback),
    );

    let (chunk_days, objective_value) = match result {
        OptimisationResult::Optimal(solution) => (
            chunk_vars
                .iter()
                .map(|chunks| {
                    chunks
                        .iter()
                        .map(|&c| solution.get_integer_value(c) as u32)
                        .collect()
                })
                .collect(),
            i64::from(solution.get_integer_value(objective)),
        ),
        OptimisationResult::Satisfiable(solution) => {
            // Budget expired while still improving; keep the best incumbent
            tracing::debug!("time budget expired before proving optimality");
            (
                chunk_vars
                    .iter()
                    .map(|chunks| {
                        chunks
                            .iter()
                            .map(|&c| solution.get_integer_value(c) as u32)
                            .collect()
                    })
                    .collect(),
                i64::from(solution.get_integer_value(objective)),
            )
        }
        OptimisationResult::Unsatisfiable => {
            return Err(ScheduleError::Infeasible {
                max_days: config.max_days,
            });
        }
        OptimisationResult::Unknown => {
            return Err(ScheduleError::Solver(format!(
                "no solution found within {} ms",
                config.solve_timeout_ms
            )));
        }
    };

    tracing::debug!(
        objective = objective_value,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solve finished"
    );

    Ok(SolveOutcome {
        chunk_days,
        objective: objective_value,
    })
}
