//! Solving a [Model]: the branch-and-bound search, and the simplex it uses for relaxations.
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::BuildHasher;
use std::time::Duration;

use log::debug;

use crate::model::Model;
use crate::{Expression, SolveConfig, Variable};

pub(crate) mod basis;
pub mod branch_and_bound;
pub(crate) mod node;
pub mod simplex;

/// Whether to search for the variable values that give the highest
/// or the lowest value of the objective function.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum ObjectiveDirection {
    /// Find the highest value
    Maximisation,
    /// Find the lowest value
    Minimisation,
}

impl Display for ObjectiveDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ObjectiveDirection::Maximisation => "maximise",
            ObjectiveDirection::Minimisation => "minimise",
        })
    }
}

/// How a solve ended. Solve-time conditions are reported here, never as errors.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum SolveStatus {
    /// The solution is optimal, up to the configured MIP gap
    Optimal,
    /// A solution was found, but it could not be proven optimal
    /// (time or node limit, or some relaxations failed numerically)
    Suboptimal,
    /// There exists no solution that satisfies all of the constraints
    Infeasible,
    /// The problem is [unbounded](https://www.matem.unam.mx/~omar/math340/unbounded.html).
    /// The objective can be made infinitely large without violating any constraints.
    Unbounded,
    /// The search stopped before finding any solution
    TimeLimit,
    /// The relaxation solver could not keep its basis stable, and no solution was found
    NumericalFailure,
}

impl SolveStatus {
    /// True when the result carries an assignment of the variables
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Suboptimal)
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Suboptimal => "suboptimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::TimeLimit => "time limit",
            SolveStatus::NumericalFailure => "numerical failure",
        })
    }
}

/// A problem solution
pub trait Solution {
    /// Get the value of a variable of the problem
    fn value(&self, variable: Variable) -> f64;

    /// ## Example
    ///
    /// ```rust
    /// use mip_lp::{variable, Model, SolveConfig, Solution};
    /// let mut model = Model::new();
    /// let a = model.add_variable(variable().max(1))?;
    /// let b = model.add_variable(variable().max(4))?;
    /// let objective = a + b;
    /// model.set_objective(objective.clone());
    /// let solution = model.maximise(&SolveConfig::default());
    /// assert_eq!(solution.eval(&objective), 5.);
    /// # Ok::<_, mip_lp::ModelError>(())
    /// ```
    fn eval(&self, expr: &Expression) -> f64
    where
        Self: Sized,
    {
        expr.eval_with(self)
    }
}

impl<N: Into<f64> + Clone, S: BuildHasher> Solution for HashMap<Variable, N, S> {
    fn value(&self, variable: Variable) -> f64 {
        self[&variable].clone().into()
    }
}

/// Counters collected during a solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveStatistics {
    /// Nodes added to the search tree, including the root
    pub nodes_created: u64,
    /// Nodes whose relaxation was solved
    pub nodes_explored: u64,
    /// Nodes discarded because their bound could not beat the incumbent
    pub pruned_by_bound: u64,
    /// Nodes whose relaxation was infeasible
    pub pruned_infeasible: u64,
    /// Nodes split on a fractional variable
    pub branched: u64,
    /// Nodes whose relaxation solution was integral
    pub integral: u64,
    /// Relaxations abandoned because of numerical trouble
    pub numerical_failures: u64,
    /// Total simplex iterations
    pub simplex_iterations: u64,
    /// Depth of the deepest node created
    pub max_depth: u32,
    /// Wall-clock duration of the solve
    pub elapsed: Duration,
    /// Objective of the root relaxation
    pub root_bound: Option<f64>,
    /// Best objective any unexplored node could still reach
    pub best_bound: Option<f64>,
    /// Objective of every improving incumbent, in the order they were found
    pub incumbent_history: Vec<f64>,
}

/// The result of a solve: a status, and the best assignment found, if any.
///
/// The result does not borrow the model; it keeps a copy of the variable names
/// so that it can be read as a mapping from name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub(crate) status: SolveStatus,
    pub(crate) objective: f64,
    pub(crate) values: Vec<f64>,
    pub(crate) names: Vec<String>,
    pub(crate) statistics: SolveStatistics,
}

impl SolveResult {
    /// How the solve ended
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// The objective value of the solution, or `NaN` when there is none
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// The value of every variable, by index. Empty when there is no solution.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over the variable names with their values
    pub fn named_values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// The value of the variable with the given name
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.named_values()
            .find(|&(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Diagnostics of the search
    pub fn statistics(&self) -> &SolveStatistics {
        &self.statistics
    }
}

/// `NaN` for every variable when the result carries no solution
impl Solution for SolveResult {
    fn value(&self, variable: Variable) -> f64 {
        self.values
            .get(variable.index())
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Run the solving pipeline on a model, without modifying it
pub(crate) fn solve(model: &Model, direction: ObjectiveDirection, config: &SolveConfig) -> SolveResult {
    debug!(
        "{} over {} variables and {} constraints (relaxed: {})",
        direction,
        model.len(),
        model.num_constraints(),
        config.relax()
    );
    branch_and_bound::solve(model, direction, config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{Solution, SolveStatus};
    use crate::{variable, Model, SolveConfig};

    #[test]
    fn hashmap_solution() {
        let mut model = Model::new();
        let a = model.add_variable(variable()).unwrap();
        let b = model.add_variable(variable()).unwrap();
        let values: HashMap<_, _> = vec![(a, 1), (b, 4)].into_iter().collect();
        assert_eq!(values.eval(&(a + 2 * b + 1)), 10.);
    }

    #[test]
    fn status_has_solution() {
        assert!(SolveStatus::Suboptimal.has_solution());
        assert!(!SolveStatus::TimeLimit.has_solution());
        assert_eq!(SolveStatus::NumericalFailure.to_string(), "numerical failure");
    }

    #[test]
    fn result_without_solution() {
        let mut model = Model::new();
        let x = model.add_variable(variable().clamp(0, 1)).unwrap();
        model.add_constraint(crate::constraint!(x >= 2)).unwrap();
        let result = model.solve(super::ObjectiveDirection::Minimisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Infeasible);
        assert!(result.objective().is_nan());
        assert!(result.value(x).is_nan());
        assert_eq!(result.value_of("x0"), None);
    }
}
