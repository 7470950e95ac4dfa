//! Best-bound branch-and-bound over the integer variables of a model.
//!
//! Each node is a set of tightened variable bounds. Its continuous relaxation is solved
//! with the [simplex](crate::solvers::simplex); integral relaxation solutions become
//! incumbents, fractional ones are split on their most fractional integer variable.
//! The incumbent and the queue are only ever touched by the coordinating thread:
//! when several threads are configured, only the relaxations run concurrently.
use std::collections::BinaryHeap;
use std::time::Instant;

use log::{debug, info, trace, warn};

use crate::model::Model;
use crate::solvers::node::{BoundChange, NodeArena, NodeId, NodeState, QueueEntry};
use crate::solvers::simplex::{LpOptions, LpOutcome, LpProblem, LpStatus};
use crate::solvers::{ObjectiveDirection, SolveResult, SolveStatistics, SolveStatus};
use crate::SolveConfig;

/// Solve a model, honouring the integrality of its variables unless the configuration relaxes it
pub fn solve(model: &Model, direction: ObjectiveDirection, config: &SolveConfig) -> SolveResult {
    let start = Instant::now();
    let problem = LpProblem::from_model(model, direction);
    let mut search = Search::new(&problem, config, start);
    let status = search.run();
    let Search {
        incumbent,
        mut stats,
        ..
    } = search;
    stats.elapsed = start.elapsed();
    info!(
        "search finished: {} after {} nodes and {} simplex iterations in {:?}",
        status, stats.nodes_explored, stats.simplex_iterations, stats.elapsed
    );
    let (objective, values) = match incumbent {
        Some(incumbent) if status.has_solution() => {
            (problem.to_objective(incumbent.cost), incumbent.values)
        }
        _ => (f64::NAN, vec![]),
    };
    SolveResult {
        status,
        objective,
        values,
        names: model.variables().map(|(var, _)| model.name(var).to_string()).collect(),
        statistics: stats,
    }
}

/// Best integral solution found so far, with its minimisation cost
#[derive(Debug, Clone)]
struct Incumbent {
    cost: f64,
    values: Vec<f64>,
}

/// Why the node loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// No pending node left
    Exhausted,
    /// The sufficiency deadline elapsed with an incumbent
    Sufficient,
    /// Abort deadline or node limit
    Aborted,
    /// The root relaxation is unbounded
    Unbounded,
}

struct Search<'a> {
    problem: &'a LpProblem,
    config: &'a SolveConfig,
    options: LpOptions,
    /// Root bounds: declared bounds, rounded inwards for integer variables
    lower: Vec<f64>,
    upper: Vec<f64>,
    integers: Vec<usize>,
    arena: NodeArena,
    queue: BinaryHeap<QueueEntry>,
    incumbent: Option<Incumbent>,
    stats: SolveStatistics,
    start: Instant,
    root_unbounded: bool,
}

impl<'a> Search<'a> {
    fn new(problem: &'a LpProblem, config: &'a SolveConfig, start: Instant) -> Self {
        let mut lower = problem.lower().to_vec();
        let mut upper = problem.upper().to_vec();
        let integers: Vec<usize> = if config.relax() {
            vec![]
        } else {
            (0..problem.num_columns())
                .filter(|&j| problem.is_integer(j))
                .collect()
        };
        let integrality = config.integrality();
        for &j in &integers {
            lower[j] = (lower[j] - integrality.epsilon(lower[j])).ceil();
            upper[j] = (upper[j] + integrality.epsilon(upper[j])).floor();
        }
        Search {
            problem,
            config,
            options: LpOptions {
                feasibility: *config.feasibility(),
                iteration_limit: config.iteration_limit(),
            },
            lower,
            upper,
            integers,
            arena: NodeArena::default(),
            queue: BinaryHeap::new(),
            incumbent: None,
            stats: SolveStatistics::default(),
            start,
            root_unbounded: false,
        }
    }

    fn run(&mut self) -> SolveStatus {
        let root = self.arena.root();
        self.stats.nodes_created = 1;
        self.enqueue(root);
        let threads = self.config.threads();
        let stop = loop {
            let mut batch = Vec::with_capacity(threads);
            let mut stop = None;
            while batch.len() < threads {
                if self.queue.is_empty() {
                    break;
                }
                if let Some(reason) = self.limit_reached() {
                    stop = Some(reason);
                    break;
                }
                let Some(entry) = self.queue.pop() else {
                    break;
                };
                if !self.can_improve(entry.bound) {
                    self.arena.set_state(entry.node, NodeState::Pruned);
                    self.stats.pruned_by_bound += 1;
                    continue;
                }
                self.stats.nodes_explored += 1;
                batch.push(entry.node);
            }
            let outcomes = self.relax(&batch);
            for (node, outcome) in batch.into_iter().zip(outcomes) {
                self.process(node, outcome);
            }
            if self.root_unbounded {
                break Stop::Unbounded;
            }
            if let Some(reason) = stop {
                break reason;
            }
            if self.queue.is_empty() {
                break Stop::Exhausted;
            }
        };
        let remaining = self.abandon_pending();
        debug!(
            "search tree: {} nodes, {} pruned, {} abandoned",
            self.arena.len(),
            self.arena.count(NodeState::Pruned),
            self.arena.count(NodeState::Terminal)
        );
        self.stats.best_bound = match (remaining, &self.incumbent) {
            (Some(bound), _) => Some(self.problem.to_objective(bound)),
            (None, Some(incumbent)) => Some(self.problem.to_objective(incumbent.cost)),
            (None, None) => None,
        };
        self.status(stop, remaining)
    }

    fn status(&self, stop: Stop, remaining: Option<f64>) -> SolveStatus {
        let failed = self.stats.numerical_failures > 0;
        match (stop, &self.incumbent) {
            (Stop::Unbounded, _) => SolveStatus::Unbounded,
            (Stop::Exhausted, Some(_)) if failed => SolveStatus::Suboptimal,
            (Stop::Exhausted, Some(_)) => SolveStatus::Optimal,
            (Stop::Exhausted, None) if failed => SolveStatus::NumericalFailure,
            (Stop::Exhausted, None) => SolveStatus::Infeasible,
            (Stop::Sufficient, Some(_)) => {
                let proven = remaining.map_or(true, |bound| !self.can_improve(bound));
                if proven && !failed {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Suboptimal
                }
            }
            (Stop::Aborted, Some(_)) => SolveStatus::Suboptimal,
            (Stop::Sufficient | Stop::Aborted, None) => SolveStatus::TimeLimit,
        }
    }

    /// Mark every queued node as terminal, and return the lowest bound among them
    fn abandon_pending(&mut self) -> Option<f64> {
        let mut best: Option<f64> = None;
        for entry in self.queue.drain() {
            self.arena.set_state(entry.node, NodeState::Terminal);
            best = Some(best.map_or(entry.bound, |b: f64| b.min(entry.bound)));
        }
        best
    }

    fn limit_reached(&self) -> Option<Stop> {
        if let Some(limit) = self.config.node_limit() {
            if self.stats.nodes_explored >= limit {
                debug!("node limit ({}) reached", limit);
                return Some(Stop::Aborted);
            }
        }
        let elapsed = self.start.elapsed();
        if self.config.time_abort().is_some_and(|abort| elapsed >= abort) {
            debug!("abort deadline reached after {:?}", elapsed);
            return Some(Stop::Aborted);
        }
        if self.incumbent.is_some()
            && self
                .config
                .time_suffice()
                .is_some_and(|suffice| elapsed >= suffice)
        {
            debug!("sufficiency deadline reached after {:?}", elapsed);
            return Some(Stop::Sufficient);
        }
        None
    }

    /// True if a node with this minimisation bound may still beat the incumbent
    /// by more than the gap
    fn can_improve(&self, bound: f64) -> bool {
        match &self.incumbent {
            None => true,
            Some(incumbent) => {
                let objective = self.problem.to_objective(incumbent.cost);
                let gap = self
                    .config
                    .mip_gap()
                    .map_or(0., |gap| f64::from(gap) * objective.abs());
                let margin = gap.max(self.config.feasibility().epsilon(incumbent.cost));
                bound < incumbent.cost - margin
            }
        }
    }

    fn enqueue(&mut self, id: NodeId) {
        let node = self.arena.get(id);
        self.queue.push(QueueEntry {
            bound: node.bound,
            sequence: node.sequence,
            node: id,
        });
    }

    /// Solve the relaxations of a batch of nodes. Only this step may run on several threads.
    fn relax(&self, batch: &[NodeId]) -> Vec<LpOutcome> {
        let bounds: Vec<(Vec<f64>, Vec<f64>)> = batch
            .iter()
            .map(|&id| self.arena.bounds(id, &self.lower, &self.upper))
            .collect();
        let problem = self.problem;
        let options = self.options;
        #[cfg(feature = "parallel")]
        if bounds.len() > 1 {
            use rayon::prelude::*;
            return bounds
                .par_iter()
                .map(|(lower, upper)| problem.solve_with_bounds(lower, upper, &options))
                .collect();
        }
        bounds
            .iter()
            .map(|(lower, upper)| problem.solve_with_bounds(lower, upper, &options))
            .collect()
    }

    fn process(&mut self, id: NodeId, outcome: LpOutcome) {
        self.stats.simplex_iterations += outcome.iterations as u64;
        let is_root = self.arena.get(id).parent.is_none();
        match outcome.status {
            LpStatus::Infeasible => {
                trace!("node {} infeasible", id.index());
                self.arena.set_state(id, NodeState::Pruned);
                self.stats.pruned_infeasible += 1;
            }
            LpStatus::Unbounded if is_root => {
                debug!("root relaxation unbounded");
                self.arena.set_state(id, NodeState::Terminal);
                self.root_unbounded = true;
            }
            LpStatus::Unbounded | LpStatus::NumericalFailure => {
                warn!(
                    "relaxation of node {} failed ({:?}), node dropped",
                    id.index(),
                    outcome.status
                );
                self.arena.set_state(id, NodeState::Pruned);
                self.stats.numerical_failures += 1;
            }
            LpStatus::Optimal => self.process_relaxed(id, outcome, is_root),
        }
    }

    fn process_relaxed(&mut self, id: NodeId, outcome: LpOutcome, is_root: bool) {
        let cost = self.problem.to_cost(outcome.objective);
        self.arena.set_bound(id, cost);
        self.arena.set_state(id, NodeState::Relaxed);
        if is_root {
            self.stats.root_bound = Some(outcome.objective);
        }
        trace!(
            "node {} relaxed: objective {} at depth {}",
            id.index(),
            outcome.objective,
            self.arena.get(id).depth
        );
        if !self.can_improve(cost) {
            self.arena.set_state(id, NodeState::Pruned);
            self.stats.pruned_by_bound += 1;
            return;
        }
        match self.branching_column(&outcome.values) {
            None => self.accept(id, outcome.values),
            Some(column) => self.branch(id, column, outcome.values[column]),
        }
    }

    /// Take an integral relaxation solution. Rounding its integer variables may break
    /// tight rows, so the continuous variables are solved again with the integer ones
    /// fixed at their rounded values. If that fails, the node is split instead.
    fn accept(&mut self, id: NodeId, values: Vec<f64>) {
        let deviation = |j: usize| (values[j] - values[j].round()).abs();
        let furthest = self
            .integers
            .iter()
            .copied()
            .filter(|&j| deviation(j) > 0.)
            .max_by(|&a, &b| deviation(a).total_cmp(&deviation(b)));
        let Some(column) = furthest else {
            return self.settle(id, values);
        };
        let (mut lower, mut upper) = self.arena.bounds(id, &self.lower, &self.upper);
        for &j in &self.integers {
            lower[j] = values[j].round();
            upper[j] = lower[j];
        }
        let fixed = self.problem.solve_with_bounds(&lower, &upper, &self.options);
        self.stats.simplex_iterations += fixed.iterations as u64;
        if fixed.status == LpStatus::Optimal {
            self.settle(id, fixed.values);
        } else {
            trace!(
                "node {}: rounded solution is {:?}, splitting on column {}",
                id.index(),
                fixed.status,
                column
            );
            self.branch(id, column, values[column]);
        }
    }

    fn settle(&mut self, id: NodeId, values: Vec<f64>) {
        self.arena.set_state(id, NodeState::FeasibleIntegral);
        self.stats.integral += 1;
        self.offer(values);
    }

    /// The most fractional integer variable, the lowest index among equally fractional ones
    fn branching_column(&self, values: &[f64]) -> Option<usize> {
        let integrality = self.config.integrality();
        let mut best: Option<(usize, f64)> = None;
        for &j in &self.integers {
            let value = values[j];
            if integrality.is_integral(value) {
                continue;
            }
            let fraction = value - value.floor();
            let score = fraction.min(1. - fraction);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((j, score));
            }
        }
        best.map(|(j, _)| j)
    }

    fn branch(&mut self, id: NodeId, column: usize, value: f64) {
        let floor = BoundChange {
            column,
            lower: f64::NEG_INFINITY,
            upper: value.floor(),
        };
        let ceiling = BoundChange {
            column,
            lower: value.ceil(),
            upper: f64::INFINITY,
        };
        self.arena.set_state(id, NodeState::Branched);
        self.stats.branched += 1;
        for change in [floor, ceiling] {
            let child = self.arena.child(id, change);
            self.stats.nodes_created += 1;
            self.stats.max_depth = self.stats.max_depth.max(self.arena.get(child).depth);
            self.enqueue(child);
        }
        trace!("node {} branched on column {} = {}", id.index(), column, value);
    }

    /// Snap the integer variables of an integral relaxation solution, and keep it
    /// if it strictly improves the incumbent
    fn offer(&mut self, mut values: Vec<f64>) {
        for &j in &self.integers {
            values[j] = values[j].round();
        }
        let cost = self.problem.cost_of(&values);
        let improves = match &self.incumbent {
            None => true,
            Some(incumbent) => {
                cost < incumbent.cost - self.config.feasibility().epsilon(incumbent.cost)
            }
        };
        if !improves {
            return;
        }
        let objective = self.problem.to_objective(cost);
        debug!(
            "new incumbent {} after {} nodes",
            objective, self.stats.nodes_explored
        );
        self.stats.incumbent_history.push(objective);
        self.incumbent = Some(Incumbent { cost, values });
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use crate::solvers::ObjectiveDirection::{Maximisation, Minimisation};
    use crate::{constraint, variable, Model, Solution, SolveConfig, SolveStatus};

    fn knapsack() -> (Model, Vec<crate::Variable>) {
        // weights 5 4 3 2, values 10 7 5 3, capacity 10
        let mut model = Model::new();
        let items = model.add_vector("item", variable().binary(), 4).unwrap();
        let weights = [5., 4., 3., 2.];
        let values = [10., 7., 5., 3.];
        let weight: crate::Expression = items.iter().zip(weights).map(|(&x, w)| w * x).sum();
        let value: crate::Expression = items.iter().zip(values).map(|(&x, v)| v * x).sum();
        model.add_constraint(constraint!(weight <= 10)).unwrap();
        model.set_objective(value);
        (model, items)
    }

    #[test]
    fn integer_rounding_up() {
        let mut model = Model::new();
        let x = model
            .add_variable(variable().name("x").integer().clamp(0, 10))
            .unwrap();
        model.add_constraint(constraint!(x >= 3.5)).unwrap();
        model.set_objective(x);
        let result = model.solve(Minimisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert_eq!(result.value(x), 4.);
        assert_eq!(result.objective(), 4.);
        assert_eq!(result.statistics().root_bound, Some(3.5));
    }

    #[test]
    fn knapsack_optimum() {
        let (model, items) = knapsack();
        let result = model.solve(Maximisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert_float_eq!(result.objective(), 18., abs <= 1e-9);
        let chosen: Vec<f64> = items.iter().map(|&x| result.value(x)).collect();
        assert_eq!(chosen, vec![1., 0., 1., 1.]);
        let stats = result.statistics();
        assert!(stats.branched > 0);
        assert_eq!(stats.nodes_created, 1 + 2 * stats.branched);
        assert!(stats.root_bound.unwrap() >= 18.);
    }

    #[test]
    fn incumbents_only_improve() {
        let (model, _) = knapsack();
        let result = model.solve(Maximisation, &SolveConfig::default());
        let history = &result.statistics().incumbent_history;
        assert!(!history.is_empty());
        assert!(history.windows(2).all(|w| w[1] > w[0]));
        assert_float_eq!(*history.last().unwrap(), result.objective(), abs <= 1e-9);
    }

    #[test]
    fn relaxed_solve_ignores_integrality() {
        let (model, _) = knapsack();
        let relaxed = model.solve(Maximisation, &SolveConfig::default().relaxed());
        assert_eq!(relaxed.status(), SolveStatus::Optimal);
        // items 0 and 1, then a third of item 2
        assert_float_eq!(relaxed.objective(), 17. + 5. / 3., abs <= 1e-9);
        assert_eq!(relaxed.statistics().branched, 0);
    }

    #[test]
    fn node_limit_without_incumbent() {
        let (model, _) = knapsack();
        let result = model.solve(Maximisation, &SolveConfig::default().with_node_limit(0));
        assert_eq!(result.status(), SolveStatus::TimeLimit);
        assert!(result.values().is_empty());
    }

    #[test]
    fn node_limit_with_incumbent() {
        // root (1.5, 1.5), then x <= 1, x >= 2, and the incumbent (1, 1) at the fourth node
        let mut model = Model::new();
        let x = model.add_variable(variable().integer().min(0)).unwrap();
        let y = model.add_variable(variable().integer().min(0)).unwrap();
        model.add_constraint(constraint!(2 * x <= 3)).unwrap();
        model.add_constraint(constraint!(2 * y <= 3)).unwrap();
        model.set_objective(x + y);
        let result = model.solve(Maximisation, &SolveConfig::default().with_node_limit(4));
        assert_eq!(result.status(), SolveStatus::Suboptimal);
        assert_eq!((result.value(x), result.value(y)), (1., 1.));
        assert_float_eq!(result.objective(), 2., abs <= 1e-9);
        let stats = result.statistics();
        assert_eq!(stats.nodes_explored, 4);
        assert_float_eq!(stats.best_bound.unwrap(), 2.5, abs <= 1e-9);
    }

    #[test]
    fn rounded_incumbent_satisfies_tight_rows() {
        // the root relaxation has x = 2.0000005, integral within 1e-6,
        // but y would have to be negative with x = 2
        let mut model = Model::new();
        let x = model
            .add_variable(variable().name("x").integer().clamp(0, 10))
            .unwrap();
        let y = model.add_variable(variable().name("y").min(0)).unwrap();
        model
            .add_constraint(constraint!(1000 * x - y == 2000.0005))
            .unwrap();
        model.set_objective(y);
        let result = model.solve(Minimisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert_eq!(result.value(x), 3.);
        assert_float_eq!(result.value(y), 999.9995, abs <= 1e-6);
        assert!(result.statistics().branched > 0);
    }

    #[test]
    fn root_unbounded() {
        let mut model = Model::new();
        let x = model.add_variable(variable().integer().min(0)).unwrap();
        model.set_objective(x);
        let result = model.solve(Maximisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Unbounded);
    }

    #[test]
    fn integer_infeasible() {
        // 2x = 1 has no integer solution
        let mut model = Model::new();
        let x = model.add_variable(variable().integer().clamp(0, 5)).unwrap();
        model.add_constraint(constraint!(2 * x == 1)).unwrap();
        model.set_objective(x);
        let result = model.solve(Minimisation, &SolveConfig::default());
        assert_eq!(result.status(), SolveStatus::Infeasible);
        assert_eq!(result.statistics().pruned_infeasible, 2);
    }

    #[test]
    fn parallel_batches_agree_with_sequential() {
        let (model, _) = knapsack();
        let sequential = model.solve(Maximisation, &SolveConfig::default());
        let parallel = model.solve(Maximisation, &SolveConfig::default().with_threads(4));
        assert_eq!(parallel.status(), SolveStatus::Optimal);
        assert_eq!(parallel.values(), sequential.values());
    }

    #[test]
    fn fractional_bounds_are_rounded_inwards() {
        let mut model = Model::new();
        let x = model
            .add_variable(variable().integer().clamp(0.5, 2.5))
            .unwrap();
        model.set_objective(x);
        let min = model.solve(Minimisation, &SolveConfig::default());
        let max = model.solve(Maximisation, &SolveConfig::default());
        assert_eq!((min.value(x), max.value(x)), (1., 2.));
    }
}
