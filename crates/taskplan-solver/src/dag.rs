//! Dependency graph construction and validation
//!
//! Tasks reference their prerequisites by name. Before any constraint model
//! is built, names are resolved to stable indices into the input task slice
//! and the resulting graph is checked for cycles. Dependency sets are kept
//! as sorted index arrays so traversal order is deterministic.

use std::collections::HashMap;
use taskplan_core::{ScheduleError, Task};

/// A validated, index-based view of the task dependency graph.
#[derive(Debug)]
pub struct TaskGraph {
    /// `deps[i]` holds the indices of task `i`'s prerequisites,
    /// sorted and deduplicated
    deps: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    /// On the current DFS path
    Visiting,
    /// Fully explored
    Visited,
}

impl TaskGraph {
    /// Resolve dependency names and validate the graph.
    ///
    /// Fails with `InvalidTask` on a duplicate task name, with
    /// `UnknownDependency` when a prerequisite names a task not in the run,
    /// and with `CycleDetected` when the dependency relation is cyclic.
    pub fn build(tasks: &[Task]) -> Result<Self, ScheduleError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.name.as_str(), i).is_some() {
                return Err(ScheduleError::InvalidTask(format!(
                    "duplicate task name '{}'",
                    task.name
                )));
            }
        }

        let mut deps = Vec::with_capacity(tasks.len());
        for task in tasks {
            let mut resolved = Vec::with_capacity(task.depends.len());
            for dep in &task.depends {
                match index.get(dep.as_str()) {
                    Some(&prereq) => resolved.push(prereq),
                    None => {
                        return Err(ScheduleError::UnknownDependency {
                            task: task.name.clone(),
                            missing: dep.clone(),
                        })
                    }
                }
            }
            resolved.sort_unstable();
            resolved.dedup();
            deps.push(resolved);
        }

        let graph = Self { deps };
        graph.check_acyclic(tasks)?;
        Ok(graph)
    }

    /// Indices of `task`'s prerequisites
    pub fn dependencies(&self, task: usize) -> &[usize] {
        &self.deps[task]
    }

    /// Depth-first cycle check: an edge into a task on the current DFS path
    /// is a cycle. Runs in O(V + E).
    fn check_acyclic(&self, tasks: &[Task]) -> Result<(), ScheduleError> {
        let mut marks = vec![Mark::Unvisited; self.deps.len()];
        let mut path = Vec::new();
        for start in 0..self.deps.len() {
            if marks[start] == Mark::Unvisited {
                self.visit(start, &mut marks, &mut path, tasks)?;
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        tasks: &[Task],
    ) -> Result<(), ScheduleError> {
        marks[node] = Mark::Visiting;
        path.push(node);

        for &prereq in &self.deps[node] {
            match marks[prereq] {
                Mark::Visiting => {
                    // Report the tasks along the closed walk, starting at
                    // the repeated one
                    let from = path.iter().position(|&n| n == prereq).unwrap_or(0);
                    let cycle = path[from..]
                        .iter()
                        .map(|&i| tasks[i].name.clone())
                        .collect();
                    return Err(ScheduleError::CycleDetected { tasks: cycle });
                }
                Mark::Unvisited => self.visit(prereq, marks, path, tasks)?,
                Mark::Visited => {}
            }
        }

        path.pop();
        marks[node] = Mark::Visited;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(name: &str, deps: &[&str]) -> Task {
        let mut t = Task::new(name, 1, 1).unwrap();
        for dep in deps {
            t = t.depends_on(*dep);
        }
        t
    }

    #[test]
    fn resolves_dependencies_to_sorted_indices() {
        let tasks = vec![
            task("a", &[]),
            task("b", &[]),
            task("c", &["b", "a", "b"]),
        ];

        let graph = TaskGraph::build(&tasks).unwrap();
        assert_eq!(graph.dependencies(0), &[] as &[usize]);
        assert_eq!(graph.dependencies(2), &[0, 1]);
    }

    #[test]
    fn diamond_is_acyclic() {
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["b", "c"]),
        ];

        assert!(TaskGraph::build(&tasks).is_ok());
    }

    #[test]
    fn two_task_cycle_is_detected() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];

        let err = TaskGraph::build(&tasks).unwrap_err();
        match err {
            ScheduleError::CycleDetected { tasks } => {
                assert!(tasks.contains(&"a".to_string()));
                assert!(tasks.contains(&"b".to_string()));
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let tasks = vec![task("a", &["a"])];

        let err = TaskGraph::build(&tasks).unwrap_err();
        assert!(matches!(err, ScheduleError::CycleDetected { .. }));
    }

    #[test]
    fn longer_cycle_is_detected() {
        let tasks = vec![
            task("a", &["c"]),
            task("b", &["a"]),
            task("c", &["b"]),
            task("d", &[]),
        ];

        let err = TaskGraph::build(&tasks).unwrap_err();
        match err {
            ScheduleError::CycleDetected { tasks } => assert_eq!(tasks.len(), 3),
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let tasks = vec![task("a", &["ghost"])];

        let err = TaskGraph::build(&tasks).unwrap_err();
        match err {
            ScheduleError::UnknownDependency { task, missing } => {
                assert_eq!(task, "a");
                assert_eq!(missing, "ghost");
            }
            other => panic!("expected UnknownDependency, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_task_names_are_rejected() {
        let tasks = vec![task("a", &[]), task("a", &[])];

        let err = TaskGraph::build(&tasks).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTask(_)));
    }
}
