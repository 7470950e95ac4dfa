//! Checks an assignment of the variables against a [Model].
//!
//! Every constraint, every variable bound and, unless integrality is relaxed,
//! every integer requirement is checked within a [ToleranceContext].
//! Checking never fails: the outcome is a [ValidationReport] listing all violations.
use std::fmt::{Display, Formatter};

use log::trace;

use crate::constraint::ConstraintReference;
use crate::model::Model;
use crate::tolerance::ToleranceContext;
use crate::{Solution, Variable};

/// A single requirement not met by an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The value of a constraint body lies outside its limits
    Constraint {
        /// the violated constraint
        reference: ConstraintReference,
        /// its name, if it has one
        name: Option<String>,
        /// the value of the constraint body
        activity: f64,
        /// lower limit (`-inf` when absent)
        lower: f64,
        /// upper limit (`+inf` when absent)
        upper: f64,
    },
    /// A variable lies outside its bounds
    Bound {
        /// the variable
        variable: Variable,
        /// its name
        name: String,
        /// its value
        value: f64,
        /// lower bound
        lower: f64,
        /// upper bound
        upper: f64,
    },
    /// An integer variable holds a fractional value
    Integrality {
        /// the variable
        variable: Variable,
        /// its name
        name: String,
        /// its value
        value: f64,
    },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Constraint {
                reference,
                name,
                activity,
                lower,
                upper,
            } => {
                match name {
                    Some(name) => write!(f, "constraint {:?}", name)?,
                    None => write!(f, "constraint #{}", reference.index())?,
                }
                write!(f, ": {} not in [{}, {}]", activity, lower, upper)
            }
            Violation::Bound {
                name,
                value,
                lower,
                upper,
                ..
            } => write!(f, "variable {:?}: {} not in [{}, {}]", name, value, lower, upper),
            Violation::Integrality { name, value, .. } => {
                write!(f, "variable {:?}: {} is not integral", name, value)
            }
        }
    }
}

/// The outcome of a validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// True when nothing is violated
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Every violation, constraints first, in model order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The first violation found, if any
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        write!(f, "{} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {}", violation)?;
        }
        Ok(())
    }
}

/// Check any [Solution] against a model, for instance a
/// [SolveResult](crate::SolveResult) that was not committed to the model.
///
/// ```
/// use mip_lp::{constraint, validate_solution, variable, Model, ObjectiveDirection, SolveConfig, ToleranceContext};
///
/// let mut model = Model::new();
/// let x = model.add_variable(variable().integer().clamp(0, 10))?;
/// model.add_constraint(constraint!(x >= 3.5))?;
/// model.set_objective(x);
/// let result = model.solve(ObjectiveDirection::Minimisation, &SolveConfig::default());
/// let report = validate_solution(&model, &result, &ToleranceContext::new(7, 6), true);
/// assert!(report.is_valid());
/// # Ok::<_, mip_lp::ModelError>(())
/// ```
pub fn validate_solution<S: Solution>(
    model: &Model,
    solution: &S,
    context: &ToleranceContext,
    check_integrality: bool,
) -> ValidationReport {
    let mut violations = vec![];
    for (reference, constraint) in model.constraints() {
        let activity = constraint.expression().eval_with(solution);
        if !context.is_between(constraint.lower, activity, constraint.upper) {
            violations.push(Violation::Constraint {
                reference,
                name: constraint.name().map(String::from),
                activity,
                lower: constraint.lower,
                upper: constraint.upper,
            });
        }
    }
    for (variable, definition) in model.variables() {
        let value = solution.value(variable);
        if !context.is_between(definition.min, value, definition.max) {
            violations.push(Violation::Bound {
                variable,
                name: model.name(variable).to_string(),
                value,
                lower: definition.min,
                upper: definition.max,
            });
        }
        if check_integrality && definition.domain.is_integer() && !context.is_integral(value) {
            violations.push(Violation::Integrality {
                variable,
                name: model.name(variable).to_string(),
                value,
            });
        }
    }
    trace!(
        "validation with {}: {} violation(s)",
        context,
        violations.len()
    );
    ValidationReport { violations }
}

#[cfg(test)]
mod tests {
    use super::{validate_solution, Violation};
    use crate::{constraint, variable, Model, ToleranceContext};

    fn model() -> Model {
        let mut model = Model::new();
        let x = model
            .add_variable(variable().name("x").integer().clamp(0, 10))
            .unwrap();
        let y = model
            .add_variable(variable().name("y").clamp(0, 5))
            .unwrap();
        model
            .add_constraint(constraint!(x + y <= 8).set_name("cap".into()))
            .unwrap();
        model
    }

    #[test]
    fn reports_every_violation() {
        let mut model = model();
        model.set_value("x", 7.5);
        model.set_value("y", 6.);
        let report = model.validation_report(&ToleranceContext::new(7, 6), true);
        assert_eq!(report.violations().len(), 3);
        assert!(matches!(
            report.first(),
            Some(Violation::Constraint { name: Some(n), .. }) if n == "cap"
        ));
        assert!(matches!(
            report.violations()[1],
            Violation::Integrality { value, .. } if value == 7.5
        ));
        assert!(matches!(
            report.violations()[2],
            Violation::Bound { upper, .. } if upper == 5.
        ));
        assert!(!report.to_string().is_empty());
    }

    #[test]
    fn within_tolerance() {
        let mut model = model();
        model.set_value("x", 3.000_000_1);
        model.set_value("y", 5.000_000_5);
        let context = ToleranceContext::new(7, 6);
        assert!(model.validate(&context));
        assert!(model.validate(&context), "validation must be repeatable");
        model.set_value("y", 5.01);
        assert!(!model.validate(&context));
    }

    #[test]
    fn relaxed_validation_skips_integrality() {
        let mut model = model();
        model.set_value("x", 2.5);
        assert!(!model.validate(&ToleranceContext::new(7, 6)));
        assert!(model.validate_relaxed(&ToleranceContext::new(7, 6)));
    }

    #[test]
    fn hashmap_candidate() {
        let model = model();
        let x = model.variable("x").unwrap();
        let y = model.variable("y").unwrap();
        let candidate: std::collections::HashMap<_, _> = [(x, 4.), (y, 4.)].into_iter().collect();
        let report = validate_solution(&model, &candidate, &ToleranceContext::new(7, 6), true);
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "valid");
    }
}
