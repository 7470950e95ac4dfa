//! Bounded-variable revised primal simplex, used to solve the continuous relaxation of a model.
//!
//! Every constraint row `L <= a.x <= U` is turned into the equality `a.x - s = 0`
//! where the logical variable `s` carries the bounds `[L, U]`, so range rows cost
//! a single column. Rows violated by the starting point receive an artificial
//! variable; phase 1 drives the artificials to zero, phase 2 optimises the objective.
use log::{debug, trace, warn};

use crate::model::Model;
use crate::solvers::basis::{BasisInverse, SparseColumn};
use crate::solvers::ObjectiveDirection;
use crate::tolerance::ToleranceContext;

/// Refactorise the basis inverse after this many eta updates
const REFACTOR_INTERVAL: usize = 64;
/// Switch to Bland's rule after this many consecutive degenerate pivots
const DEGENERATE_LIMIT: usize = 50;
/// Pivots smaller than this fraction of the largest entry of the pivot column are rejected
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-9;
/// Pivots smaller than this are always rejected
const ABSOLUTE_PIVOT_TOLERANCE: f64 = 1e-11;
/// Steps shorter than this do not count as progress
const DEGENERATE_STEP: f64 = 1e-12;

/// The outcome of a relaxation solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LpStatus {
    /// An optimal vertex was found
    Optimal,
    /// No point satisfies the constraints and the bounds
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The basis could not be kept stable, or the iteration limit was reached
    NumericalFailure,
}

/// The result of solving a relaxation
#[derive(Debug, Clone, PartialEq)]
pub struct LpOutcome {
    /// Termination state
    pub status: LpStatus,
    /// The objective value, in the direction of the model. `NaN` unless optimal.
    pub objective: f64,
    /// Values of the structural variables. Empty unless optimal.
    pub values: Vec<f64>,
    /// Number of pivots and bound flips performed
    pub iterations: usize,
}

impl LpOutcome {
    fn without_solution(status: LpStatus, iterations: usize) -> Self {
        LpOutcome {
            status,
            objective: f64::NAN,
            values: vec![],
            iterations,
        }
    }
}

/// Options of a relaxation solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpOptions {
    /// Tolerance on primal feasibility and reduced costs
    pub feasibility: ToleranceContext,
    /// Maximum number of iterations over both phases
    pub iteration_limit: usize,
}

impl Default for LpOptions {
    fn default() -> Self {
        LpOptions {
            feasibility: ToleranceContext::new(12, 9),
            iteration_limit: 50_000,
        }
    }
}

/// The matrix form of a model: structural columns, row limits, variable bounds and
/// a cost vector always expressed for minimisation.
#[derive(Debug, Clone)]
pub struct LpProblem {
    columns: Vec<SparseColumn>,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
    cost: Vec<f64>,
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    integer: Vec<bool>,
    sense: f64,
    constant: f64,
}

impl LpProblem {
    /// Build the matrix form of a model. Maximisation is turned into the minimisation
    /// of the opposite objective.
    pub fn from_model(model: &Model, direction: ObjectiveDirection) -> Self {
        let n = model.len();
        let mut columns = vec![SparseColumn::new(); n];
        let mut row_lower = Vec::with_capacity(model.num_constraints());
        let mut row_upper = Vec::with_capacity(model.num_constraints());
        for (reference, constraint) in model.constraints() {
            let mut terms: Vec<_> = constraint.expression().terms().collect();
            terms.sort_unstable_by_key(|&(var, _)| var);
            for (var, coefficient) in terms {
                if coefficient != 0. {
                    columns[var.index()].push((reference.index(), coefficient));
                }
            }
            row_lower.push(constraint.lower);
            row_upper.push(constraint.upper);
        }
        let sense = match direction {
            ObjectiveDirection::Minimisation => 1.,
            ObjectiveDirection::Maximisation => -1.,
        };
        let objective = model.objective();
        let cost = model
            .variables()
            .map(|(var, _)| sense * objective.coefficient(var))
            .collect();
        let (col_lower, col_upper) = model.variables().map(|(_, d)| (d.min, d.max)).unzip();
        let integer = model
            .variables()
            .map(|(_, d)| d.domain.is_integer())
            .collect();
        LpProblem {
            columns,
            row_lower,
            row_upper,
            cost,
            col_lower,
            col_upper,
            integer,
            sense,
            constant: objective.constant(),
        }
    }

    /// Number of structural variables
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of constraint rows
    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }

    /// Declared lower bounds of the structural variables
    pub fn lower(&self) -> &[f64] {
        &self.col_lower
    }

    /// Declared upper bounds of the structural variables
    pub fn upper(&self) -> &[f64] {
        &self.col_upper
    }

    /// Whether a structural variable is declared integer or binary
    pub fn is_integer(&self, column: usize) -> bool {
        self.integer[column]
    }

    /// The objective in the direction of the model, for the given values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.to_objective(self.cost_of(values))
    }

    /// `c.x` for the minimisation costs
    pub fn cost_of(&self, values: &[f64]) -> f64 {
        self.cost.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Convert a minimisation cost into the objective of the model
    pub fn to_objective(&self, cost: f64) -> f64 {
        self.sense * cost + self.constant
    }

    /// Convert an objective of the model into a minimisation cost
    pub fn to_cost(&self, objective: f64) -> f64 {
        (objective - self.constant) * self.sense
    }

    /// Solve the relaxation with the declared variable bounds
    pub fn solve(&self, options: &LpOptions) -> LpOutcome {
        self.solve_with_bounds(&self.col_lower, &self.col_upper, options)
    }

    /// Solve the relaxation with overridden variable bounds.
    /// Integrality is always ignored.
    pub fn solve_with_bounds(&self, lower: &[f64], upper: &[f64], options: &LpOptions) -> LpOutcome {
        if lower.iter().zip(upper).any(|(l, u)| l > u) {
            trace!("crossed variable bounds, relaxation infeasible");
            return LpOutcome::without_solution(LpStatus::Infeasible, 0);
        }
        let mut simplex = Simplex::new(self, lower, upper, options);
        let status = simplex.run();
        let iterations = simplex.iterations;
        if status != LpStatus::Optimal {
            return LpOutcome::without_solution(status, iterations);
        }
        let values: Vec<f64> = (0..self.num_columns())
            .map(|j| simplex.x[j].max(lower[j]).min(upper[j]))
            .collect();
        LpOutcome {
            status,
            objective: self.objective_value(&values),
            values,
            iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Basic,
    AtLower,
    AtUpper,
    /// Nonbasic without any finite bound, held at zero
    Free,
}

enum Step {
    /// The entering variable reaches its opposite bound first
    Flip,
    /// The basic variable at this position leaves the basis at its lower or upper bound
    Leave { position: usize, to_upper: bool },
    Unbounded,
}

enum PhaseEnd {
    Optimal,
    Unbounded,
    Failure,
}

/// Working state of one solve. Columns are ordered structural, logical, artificial.
struct Simplex<'a> {
    problem: &'a LpProblem,
    tolerance: ToleranceContext,
    iteration_limit: usize,
    n: usize,
    m: usize,
    /// `(row, sign)` of each artificial column
    artificials: Vec<(usize, f64)>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    x: Vec<f64>,
    cost: Vec<f64>,
    status: Vec<Status>,
    basic: Vec<usize>,
    inverse: BasisInverse,
    iterations: usize,
    degenerate: usize,
}

impl<'a> Simplex<'a> {
    fn new(problem: &'a LpProblem, lower: &[f64], upper: &[f64], options: &LpOptions) -> Self {
        let n = problem.num_columns();
        let m = problem.num_rows();
        let tolerance = options.feasibility;
        let mut x = Vec::with_capacity(n + 2 * m);
        let mut status = Vec::with_capacity(n + 2 * m);
        for j in 0..n {
            let (value, state) = if lower[j].is_finite() {
                (lower[j], Status::AtLower)
            } else if upper[j].is_finite() {
                (upper[j], Status::AtUpper)
            } else {
                (0., Status::Free)
            };
            x.push(value);
            status.push(state);
        }
        let mut activity = vec![0.; m];
        for (j, column) in problem.columns.iter().enumerate() {
            if x[j] != 0. {
                for &(i, a) in column {
                    activity[i] += a * x[j];
                }
            }
        }
        let mut all_lower = lower.to_vec();
        let mut all_upper = upper.to_vec();
        all_lower.extend_from_slice(&problem.row_lower);
        all_upper.extend_from_slice(&problem.row_upper);

        let mut basic = Vec::with_capacity(m);
        let mut diagonal = Vec::with_capacity(m);
        let mut artificials = vec![];
        let mut artificial_values = vec![];
        for (i, &v) in activity.iter().enumerate() {
            let (l, u) = (problem.row_lower[i], problem.row_upper[i]);
            if tolerance.is_between(l, v, u) {
                x.push(v);
                status.push(Status::Basic);
                basic.push(n + i);
                diagonal.push(-1.);
            } else {
                let target = v.max(l).min(u);
                x.push(target);
                status.push(if target == l {
                    Status::AtLower
                } else {
                    Status::AtUpper
                });
                // a.x - s + sign * t = 0
                let sign = (target - v).signum();
                basic.push(n + m + artificials.len());
                diagonal.push(sign);
                artificials.push((i, sign));
                artificial_values.push((target - v).abs());
            }
        }
        for value in artificial_values {
            x.push(value);
            status.push(Status::Basic);
            all_lower.push(0.);
            all_upper.push(f64::INFINITY);
        }
        let total = x.len();
        Simplex {
            problem,
            tolerance,
            iteration_limit: options.iteration_limit,
            n,
            m,
            artificials,
            lower: all_lower,
            upper: all_upper,
            x,
            cost: vec![0.; total],
            status,
            basic,
            inverse: BasisInverse::diagonal(&diagonal),
            iterations: 0,
            degenerate: 0,
        }
    }

    fn run(&mut self) -> LpStatus {
        if !self.artificials.is_empty() {
            debug!(
                "phase 1 with {} artificial variables over {} rows",
                self.artificials.len(),
                self.m
            );
            let first = self.n + self.m;
            for j in first..self.x.len() {
                self.cost[j] = 1.;
            }
            match self.run_phase() {
                PhaseEnd::Optimal => {}
                PhaseEnd::Unbounded | PhaseEnd::Failure => return LpStatus::NumericalFailure,
            }
            let infeasibility: f64 = self.x[first..].iter().sum();
            let reference = self
                .problem
                .row_lower
                .iter()
                .chain(&self.problem.row_upper)
                .filter(|v| v.is_finite())
                .fold(1f64, |acc, v| acc.max(v.abs()));
            let threshold = self.tolerance.epsilon(reference) * self.artificials.len() as f64;
            if infeasibility > threshold {
                debug!("phase 1 ended with infeasibility {:e}", infeasibility);
                return LpStatus::Infeasible;
            }
            for j in first..self.x.len() {
                self.cost[j] = 0.;
                self.upper[j] = 0.;
                if self.status[j] != Status::Basic {
                    self.x[j] = 0.;
                    self.status[j] = Status::AtLower;
                }
            }
        }
        self.cost[..self.n].copy_from_slice(&self.problem.cost);
        self.degenerate = 0;
        match self.run_phase() {
            PhaseEnd::Optimal => {}
            PhaseEnd::Unbounded => return LpStatus::Unbounded,
            PhaseEnd::Failure => return LpStatus::NumericalFailure,
        }
        if self.inverse.updates() > 0 && self.refactorize().is_err() {
            return LpStatus::NumericalFailure;
        }
        trace!("relaxation solved in {} iterations", self.iterations);
        LpStatus::Optimal
    }

    fn run_phase(&mut self) -> PhaseEnd {
        loop {
            if self.iterations >= self.iteration_limit {
                warn!(
                    "simplex iteration limit ({}) reached",
                    self.iteration_limit
                );
                return PhaseEnd::Failure;
            }
            if self.inverse.updates() >= REFACTOR_INTERVAL && self.refactorize().is_err() {
                return PhaseEnd::Failure;
            }
            let basic_costs: Vec<f64> = self.basic.iter().map(|&j| self.cost[j]).collect();
            let multipliers = self.inverse.btran(&basic_costs);
            let bland = self.degenerate >= DEGENERATE_LIMIT;
            let (entering, direction) = match self.price(&multipliers, bland) {
                Some(choice) => choice,
                None => return PhaseEnd::Optimal,
            };
            let alpha = self.inverse.ftran(&self.column(entering));
            let (step, theta) = self.ratio_test(entering, direction, &alpha, bland);
            if let Step::Unbounded = step {
                return PhaseEnd::Unbounded;
            }
            self.apply(entering, direction, &alpha, step, theta);
            self.iterations += 1;
            if theta <= DEGENERATE_STEP {
                self.degenerate += 1;
                if self.degenerate == DEGENERATE_LIMIT {
                    debug!("degenerate pivots, switching to Bland's rule");
                }
            } else {
                self.degenerate = 0;
            }
        }
    }

    fn column(&self, j: usize) -> SparseColumn {
        if j < self.n {
            self.problem.columns[j].clone()
        } else if j < self.n + self.m {
            vec![(j - self.n, -1.)]
        } else {
            vec![self.artificials[j - self.n - self.m]]
        }
    }

    fn reduced_cost(&self, j: usize, multipliers: &[f64]) -> f64 {
        let dot: f64 = if j < self.n {
            self.problem.columns[j]
                .iter()
                .map(|&(i, a)| multipliers[i] * a)
                .sum()
        } else if j < self.n + self.m {
            -multipliers[j - self.n]
        } else {
            let (i, sign) = self.artificials[j - self.n - self.m];
            multipliers[i] * sign
        };
        self.cost[j] - dot
    }

    /// Choose the entering column and the direction it moves in (+1 or -1)
    fn price(&self, multipliers: &[f64], bland: bool) -> Option<(usize, f64)> {
        let tolerance = self.tolerance.absolute();
        let mut best: Option<(usize, f64, f64)> = None;
        for j in 0..self.x.len() {
            let state = self.status[j];
            if state == Status::Basic || self.lower[j] == self.upper[j] {
                continue;
            }
            let d = self.reduced_cost(j, multipliers);
            let direction = if d < -tolerance && matches!(state, Status::AtLower | Status::Free) {
                1.
            } else if d > tolerance && matches!(state, Status::AtUpper | Status::Free) {
                -1.
            } else {
                continue;
            };
            if bland {
                return Some((j, direction));
            }
            if best.map_or(true, |(_, _, score)| d.abs() > score) {
                best = Some((j, direction, d.abs()));
            }
        }
        best.map(|(j, direction, _)| (j, direction))
    }

    fn ratio_test(&self, entering: usize, direction: f64, alpha: &[f64], bland: bool) -> (Step, f64) {
        let largest = alpha.iter().fold(0f64, |acc, a| acc.max(a.abs()));
        let pivot_tolerance = (RELATIVE_PIVOT_TOLERANCE * largest).max(ABSOLUTE_PIVOT_TOLERANCE);
        let mut best: Option<(usize, bool, f64)> = None;
        for (position, &a) in alpha.iter().enumerate() {
            if a.abs() <= pivot_tolerance {
                continue;
            }
            let j = self.basic[position];
            let rate = -direction * a;
            let (limit, to_upper) = if rate < 0. && self.lower[j].is_finite() {
                ((self.x[j] - self.lower[j]) / -rate, false)
            } else if rate > 0. && self.upper[j].is_finite() {
                ((self.upper[j] - self.x[j]) / rate, true)
            } else {
                continue;
            };
            let limit = limit.max(0.);
            let replace = match best {
                None => true,
                Some((p, _, theta)) => {
                    if limit < theta - DEGENERATE_STEP * (1. + theta) {
                        true
                    } else if limit <= theta + DEGENERATE_STEP * (1. + theta) {
                        if bland {
                            j < self.basic[p]
                        } else {
                            a.abs() > alpha[p].abs()
                        }
                    } else {
                        false
                    }
                }
            };
            if replace {
                best = Some((position, to_upper, limit));
            }
        }
        let flip = self.upper[entering] - self.lower[entering];
        match best {
            Some((_, _, theta)) if flip <= theta => (Step::Flip, flip),
            Some((position, to_upper, theta)) => (Step::Leave { position, to_upper }, theta),
            None if flip.is_finite() => (Step::Flip, flip),
            None => (Step::Unbounded, f64::INFINITY),
        }
    }

    fn apply(&mut self, entering: usize, direction: f64, alpha: &[f64], step: Step, theta: f64) {
        if theta > 0. {
            self.x[entering] += direction * theta;
            for (position, &a) in alpha.iter().enumerate() {
                let j = self.basic[position];
                self.x[j] -= direction * a * theta;
            }
        }
        match step {
            Step::Flip => {
                let to_upper = direction > 0.;
                self.x[entering] = if to_upper {
                    self.upper[entering]
                } else {
                    self.lower[entering]
                };
                self.status[entering] = if to_upper {
                    Status::AtUpper
                } else {
                    Status::AtLower
                };
                trace!("bound flip of column {}", entering);
            }
            Step::Leave { position, to_upper } => {
                let leaving = self.basic[position];
                if to_upper {
                    self.x[leaving] = self.upper[leaving];
                    self.status[leaving] = Status::AtUpper;
                } else {
                    self.x[leaving] = self.lower[leaving];
                    self.status[leaving] = Status::AtLower;
                }
                self.status[entering] = Status::Basic;
                self.basic[position] = entering;
                self.inverse.pivot(position, alpha);
                trace!(
                    "pivot: column {} enters, column {} leaves, step {:e}",
                    entering,
                    leaving,
                    theta
                );
            }
            Step::Unbounded => {}
        }
    }

    /// Recompute the basis inverse from scratch, then the basic values from the nonbasic ones
    fn refactorize(&mut self) -> Result<(), crate::solvers::basis::SingularBasis> {
        let columns: Vec<SparseColumn> = self.basic.iter().map(|&j| self.column(j)).collect();
        self.inverse = BasisInverse::factorize(&columns).map_err(|e| {
            warn!("basis refactorisation failed: {}", e);
            e
        })?;
        let mut rhs = vec![0.; self.m];
        for j in 0..self.x.len() {
            if self.status[j] == Status::Basic || self.x[j] == 0. {
                continue;
            }
            for (i, a) in self.column(j) {
                rhs[i] -= a * self.x[j];
            }
        }
        let values = self.inverse.ftran_dense(&rhs);
        for (position, value) in values.into_iter().enumerate() {
            self.x[self.basic[position]] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::{LpOptions, LpProblem, LpStatus};
    use crate::solvers::ObjectiveDirection::{Maximisation, Minimisation};
    use crate::{constraint, variable, Constraint, Expression, Model};

    #[test]
    fn maximise_two_variables() {
        let mut model = Model::new();
        let x = model.add_variable(variable().min(0)).unwrap();
        let y = model.add_variable(variable().min(0)).unwrap();
        model.add_constraint(constraint!(x + y <= 5)).unwrap();
        model.set_objective(x + 2 * y);
        let outcome = LpProblem::from_model(&model, Maximisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert_float_eq!(outcome.objective, 10., abs <= 1e-9);
        assert_float_eq!(outcome.values, vec![0., 5.], abs_all <= 1e-9);
    }

    #[test]
    fn phase_one_for_greater_than_rows() {
        let mut model = Model::new();
        let x = model.add_variable(variable().min(0)).unwrap();
        let y = model.add_variable(variable().min(0)).unwrap();
        model.add_constraint(constraint!(x + y >= 2)).unwrap();
        model.add_constraint(constraint!(x - y == 1)).unwrap();
        model.set_objective(3 * x + y);
        let outcome = LpProblem::from_model(&model, Minimisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert_float_eq!(outcome.values, vec![1.5, 0.5], abs_all <= 1e-9);
        assert_float_eq!(outcome.objective, 5., abs <= 1e-9);
    }

    #[test]
    fn range_row() {
        let mut model = Model::new();
        let x = model.add_variable(variable().clamp(0, 10)).unwrap();
        let y = model.add_variable(variable().clamp(0, 10)).unwrap();
        model.add_constraint(Constraint::range(x + y, 3, 4)).unwrap();
        model.set_objective(x + y);
        let problem = LpProblem::from_model(&model, Minimisation);
        let min = problem.solve(&LpOptions::default());
        assert_float_eq!(min.objective, 3., abs <= 1e-9);
        let max = LpProblem::from_model(&model, Maximisation).solve(&LpOptions::default());
        assert_float_eq!(max.objective, 4., abs <= 1e-9);
    }

    #[test]
    fn infeasible() {
        let mut model = Model::new();
        let x = model.add_variable(variable()).unwrap();
        model.add_constraint(constraint!(x >= 5)).unwrap();
        model.add_constraint(constraint!(x <= 3)).unwrap();
        model.set_objective(x);
        let outcome = LpProblem::from_model(&model, Minimisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Infeasible);
        assert!(outcome.objective.is_nan());
        assert!(outcome.values.is_empty());
    }

    #[test]
    fn unbounded() {
        let mut model = Model::new();
        let x = model.add_variable(variable().min(0)).unwrap();
        let y = model.add_variable(variable().min(0)).unwrap();
        model.add_constraint(constraint!(x - y <= 1)).unwrap();
        model.set_objective(x + y);
        let outcome = LpProblem::from_model(&model, Maximisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Unbounded);
    }

    #[test]
    fn free_variable() {
        let mut model = Model::new();
        let x = model.add_variable(variable()).unwrap();
        model.add_constraint(constraint!(x >= -7)).unwrap();
        model.set_objective(x);
        let outcome = LpProblem::from_model(&model, Minimisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert_float_eq!(outcome.values[0], -7., abs <= 1e-9);
    }

    #[test]
    fn bounds_only() {
        let mut model = Model::new();
        let x = model.add_variable(variable().clamp(-2, 3)).unwrap();
        let y = model.add_variable(variable().clamp(1, 4)).unwrap();
        model.set_objective(x - y + 10);
        let outcome = LpProblem::from_model(&model, Maximisation).solve(&LpOptions::default());
        assert_eq!(outcome.values, vec![3., 1.]);
        assert_float_eq!(outcome.objective, 12., abs <= 1e-12);
    }

    #[test]
    fn crossed_override_bounds() {
        let mut model = Model::new();
        model.add_variable(variable().clamp(0, 1)).unwrap();
        let problem = LpProblem::from_model(&model, Minimisation);
        let outcome = problem.solve_with_bounds(&[1.], &[0.], &LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Infeasible);
    }

    #[test]
    fn iteration_limit() {
        let mut model = Model::new();
        let x = model.add_variable(variable().min(0)).unwrap();
        let y = model.add_variable(variable().min(0)).unwrap();
        model.add_constraint(constraint!(x + y >= 2)).unwrap();
        model.set_objective(x + y);
        let options = LpOptions {
            iteration_limit: 0,
            ..LpOptions::default()
        };
        let outcome = LpProblem::from_model(&model, Minimisation).solve(&options);
        assert_eq!(outcome.status, LpStatus::NumericalFailure);
    }

    #[test]
    fn many_pivots_trigger_refactorisation() {
        // x_0 + ... + x_k <= k + 1 for every prefix, earlier variables weigh more
        let mut model = Model::new();
        let vars = model
            .add_vector("x", variable().clamp(0, 1000), 80)
            .unwrap();
        for k in 1..=vars.len() {
            let prefix: Expression = vars[..k].iter().sum();
            model
                .add_constraint(constraint!(prefix <= k as f64))
                .unwrap();
        }
        let objective: Expression = vars
            .iter()
            .enumerate()
            .map(|(i, &v)| (80. - i as f64) * v)
            .sum();
        model.set_objective(objective);
        let outcome = LpProblem::from_model(&model, Maximisation).solve(&LpOptions::default());
        assert_eq!(outcome.status, LpStatus::Optimal);
        // every prefix is tight: x_i = 1
        assert_float_eq!(outcome.values, vec![1.; 80], abs_all <= 1e-7);
    }
}
