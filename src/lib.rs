//! A Mixed Integer Linear Programming engine in pure Rust:
//! an algebraic modeler, a revised simplex for continuous relaxations,
//! a best-bound branch-and-bound for integer variables, an MPS reader
//! and a solution validator with configurable numeric tolerances.
//!
//! ```rust
//! use mip_lp::{constraint, variable, Model, Solution, SolveConfig, SolveStatus, ToleranceContext};
//!
//! let mut model = Model::new();
//! let a = model.add_variable(variable().name("a").integer().min(0))?;
//! let b = model.add_variable(variable().name("b").clamp(0, 3))?;
//! model.add_constraint(constraint!(2 * a + b <= 7.5))?;
//! model.add_constraint((3. - a) >> b)?;
//! model.set_objective(9. * (a * 2 + b / 3));
//!
//! let result = model.maximise(&SolveConfig::default());
//! assert_eq!(result.status(), SolveStatus::Optimal);
//! println!("a={}   b={}", result.value(a), result.value(b));
//!
//! // the solution is committed to the model, and can be checked against it
//! assert!(model.validate(&ToleranceContext::new(7, 6)));
//! # Ok::<_, mip_lp::ModelError>(())
//! ```

pub use affine_expression_trait::IntoAffineExpression;
pub use config::{MipGapError, SolveConfig, TimeLimitError};
pub use constraint::{Constraint, ConstraintReference};
pub use expression::{Expression, LinearExpression};
pub use model::{Model, ModelError};
pub use solvers::{ObjectiveDirection, Solution, SolveResult, SolveStatistics, SolveStatus};
pub use tolerance::ToleranceContext;
pub use validation::{validate_solution, ValidationReport, Violation};
pub use variable::{variable, Variable, VariableDefinition, VariableDomain};

mod affine_expression_trait;
mod config;
pub mod constraint;
mod expression;
mod model;
pub mod mps;
pub mod solvers;
pub mod tolerance;
mod validation;
pub mod variable;
