//! The [Model] owns the variables, the constraints and the objective of an optimisation problem,
//! together with the values currently assigned to its variables.
//!
//! A model is built once (programmatically or with [parse_mps](crate::mps::parse_mps)),
//! then either validated against an assignment or solved.
//! Solving borrows the model: the search never modifies it, except when
//! [minimise](Model::minimise) or [maximise](Model::maximise) commit the best solution found.
use std::fmt::{Display, Formatter};

use fnv::FnvHashMap as HashMap;
use log::debug;

use crate::constraint::ConstraintReference;
use crate::solvers::{self, ObjectiveDirection, Solution, SolveResult};
use crate::tolerance::ToleranceContext;
use crate::validation::{self, ValidationReport};
use crate::variable::{FormatWithVars, Variable, VariableDefinition};
use crate::{Constraint, Expression, IntoAffineExpression, SolveConfig};

/// Errors that can occur while building a model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A variable or a constraint with the same name already exists
    DuplicateName(String),
    /// The lower bound of a variable is above its upper bound, or a bound is NaN
    InvalidVariableBounds {
        /// name of the variable
        name: String,
        /// lower bound
        lower: f64,
        /// upper bound
        upper: f64,
    },
    /// The lower limit of a constraint is above its upper limit, or a limit is NaN
    InvalidConstraintBounds {
        /// lower limit
        lower: f64,
        /// upper limit
        upper: f64,
    },
    /// An expression references a variable that does not belong to the model
    UnknownVariable(Variable),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::DuplicateName(name) => write!(f, "Duplicate name: {:?}", name),
            ModelError::InvalidVariableBounds { name, lower, upper } => write!(
                f,
                "Invalid bounds for variable {:?}: lower ({}) > upper ({})",
                name, lower, upper
            ),
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "Invalid constraint limits: lower ({}) > upper ({})",
                lower, upper
            ),
            ModelError::UnknownVariable(var) => write!(
                f,
                "Variable v{} does not belong to this model. \
                You probably used variables from a different model in this one.",
                var.index()
            ),
        }
    }
}

impl std::error::Error for ModelError {}

fn ordered(lower: f64, upper: f64) -> bool {
    !lower.is_nan() && !upper.is_nan() && lower <= upper
}

/// A linear or mixed-integer optimisation model.
///
/// ```
/// use mip_lp::{constraint, variable, Model, SolveConfig, SolveStatus, Solution};
///
/// let mut model = Model::new();
/// let x = model.add_variable(variable().name("x").integer().clamp(0, 10))?;
/// model.add_constraint(constraint!(x >= 3.5))?;
/// model.set_objective(x);
/// let result = model.minimise(&SolveConfig::default());
/// assert_eq!(result.status(), SolveStatus::Optimal);
/// assert_eq!(result.value(x), 4.);
/// # Ok::<_, mip_lp::ModelError>(())
/// ```
#[derive(Clone, Default)]
pub struct Model {
    variables: Vec<VariableDefinition>,
    names: Vec<String>,
    variable_index: HashMap<String, Variable>,
    constraints: Vec<Constraint>,
    constraint_index: HashMap<String, ConstraintReference>,
    objective: Expression,
    values: Vec<Option<f64>>,
}

impl Model {
    /// Create an empty model, with a zero objective
    pub fn new() -> Self {
        Model::default()
    }

    /// Add a variable with the given definition.
    /// Anonymous variables are named `x<index>`.
    ///
    /// Fails with [ModelError::DuplicateName] if the name is already used,
    /// and with [ModelError::InvalidVariableBounds] if `lower > upper`.
    pub fn add_variable(&mut self, definition: VariableDefinition) -> Result<Variable, ModelError> {
        let index = self.variables.len();
        let name = match &definition.name {
            Some(name) => name.clone(),
            None => format!("x{}", index),
        };
        if self.variable_index.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        if !ordered(definition.min, definition.max) {
            return Err(ModelError::InvalidVariableBounds {
                name,
                lower: definition.min,
                upper: definition.max,
            });
        }
        let var = Variable::at(index);
        self.variable_index.insert(name.clone(), var);
        self.names.push(name);
        self.variables.push(definition);
        self.values.push(None);
        Ok(var)
    }

    /// Adds a list of variables with the given definition, named `<prefix>0`, `<prefix>1`, ...
    pub fn add_vector(
        &mut self,
        prefix: &str,
        definition: VariableDefinition,
        len: usize,
    ) -> Result<Vec<Variable>, ModelError> {
        (0..len)
            .map(|i| self.add_variable(definition.clone().name(format!("{}{}", prefix, i))))
            .collect()
    }

    /// Add a constraint to the model.
    ///
    /// Fails with [ModelError::DuplicateName] if a constraint with the same name exists,
    /// with [ModelError::InvalidConstraintBounds] if its lower limit is above its upper limit,
    /// and with [ModelError::UnknownVariable] if it references a variable of another model.
    pub fn add_constraint(
        &mut self,
        constraint: Constraint,
    ) -> Result<ConstraintReference, ModelError> {
        if !ordered(constraint.lower, constraint.upper) {
            return Err(ModelError::InvalidConstraintBounds {
                lower: constraint.lower,
                upper: constraint.upper,
            });
        }
        self.check_expression(&constraint.expression)?;
        let reference = ConstraintReference {
            index: self.constraints.len(),
        };
        if let Some(name) = &constraint.name {
            if self.constraint_index.contains_key(name) {
                return Err(ModelError::DuplicateName(name.clone()));
            }
            self.constraint_index.insert(name.clone(), reference);
        }
        self.constraints.push(constraint);
        Ok(reference)
    }

    /// Add all the constraints, stopping at the first error
    pub fn add_constraints<I: IntoIterator<Item = Constraint>>(
        &mut self,
        constraints: I,
    ) -> Result<Vec<ConstraintReference>, ModelError> {
        constraints
            .into_iter()
            .map(|c| self.add_constraint(c))
            .collect()
    }

    /// Set the expression to optimise. The direction is chosen when solving.
    ///
    /// ## Panics
    /// If the objective references a variable that does not belong to the model.
    /// See [Model::try_set_objective] for the fallible version.
    pub fn set_objective<E: IntoAffineExpression>(&mut self, objective: E) {
        if let Err(e) = self.try_set_objective(objective) {
            panic!("{}", e);
        }
    }

    /// Set the expression to optimise, failing with [ModelError::UnknownVariable]
    /// if it references a variable of another model. The objective is left unchanged on error.
    pub fn try_set_objective<E: IntoAffineExpression>(
        &mut self,
        objective: E,
    ) -> Result<(), ModelError> {
        let objective = Expression::from_other_affine(objective);
        self.check_expression(&objective)?;
        self.objective = objective;
        Ok(())
    }

    fn check_expression(&self, expression: &Expression) -> Result<(), ModelError> {
        match expression
            .terms()
            .find(|(var, _)| var.index() >= self.variables.len())
        {
            Some((var, _)) => Err(ModelError::UnknownVariable(var)),
            None => Ok(()),
        }
    }

    /// The objective expression
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Find a variable by its name
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.variable_index.get(name).copied()
    }

    /// Find a named constraint
    pub fn constraint_by_name(&self, name: &str) -> Option<ConstraintReference> {
        self.constraint_index.get(name).copied()
    }

    /// The definition of a variable
    pub fn definition(&self, var: Variable) -> &VariableDefinition {
        &self.variables[var.index()]
    }

    /// The unique name of a variable
    pub fn name(&self, var: Variable) -> &str {
        &self.names[var.index()]
    }

    /// A constraint of the model
    pub fn constraint(&self, reference: ConstraintReference) -> &Constraint {
        &self.constraints[reference.index]
    }

    /// Iterates over the variables with their definitions
    pub fn variables(&self) -> impl Iterator<Item = (Variable, &VariableDefinition)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, def)| (Variable::at(i), def))
    }

    /// Iterates over the constraints with their references
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintReference, &Constraint)> {
        self.constraints
            .iter()
            .enumerate()
            .map(|(index, c)| (ConstraintReference { index }, c))
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true when no variables have been added
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// True if at least one variable is declared integer or binary
    pub fn has_integer_variables(&self) -> bool {
        self.variables.iter().any(|def| def.domain.is_integer())
    }

    /// Assign a value to the variable called `name`, typically a candidate solution to validate.
    /// Unknown names are ignored; returns whether a variable was found.
    pub fn set_value(&mut self, name: &str, value: f64) -> bool {
        match self.variable(name) {
            Some(var) => {
                self.assign(var, value);
                true
            }
            None => false,
        }
    }

    /// Assign a value to a variable
    pub fn assign(&mut self, var: Variable, value: f64) {
        self.values[var.index()] = Some(value);
    }

    /// Forget all assigned values
    pub fn clear_values(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }

    /// The value currently assigned to a variable. Unassigned variables are worth zero.
    pub fn value(&self, var: Variable) -> f64 {
        self.values[var.index()].unwrap_or(0.)
    }

    /// True if a value has been assigned to the variable
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.values[var.index()].is_some()
    }

    /// The values of all variables, unassigned ones being zero
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(0.)).collect()
    }

    /// Check the current assignment against every constraint, every variable bound and
    /// every integrality requirement. Never fails: branch on the returned boolean.
    ///
    /// ```
    /// # use mip_lp::{constraint, variable, Model, ToleranceContext};
    /// let mut model = Model::new();
    /// let x = model.add_variable(variable().name("x").integer().min(0))?;
    /// model.add_constraint(constraint!(x >= 3.5))?;
    /// model.set_value("x", 4.);
    /// assert!(model.validate(&ToleranceContext::new(7, 6)));
    /// model.set_value("x", 3.6);
    /// assert!(!model.validate(&ToleranceContext::new(7, 6)));
    /// assert!(model.validate_relaxed(&ToleranceContext::new(7, 6)));
    /// # Ok::<_, mip_lp::ModelError>(())
    /// ```
    pub fn validate(&self, context: &ToleranceContext) -> bool {
        self.validation_report(context, true).is_valid()
    }

    /// Like [Model::validate], but integer variables may take fractional values
    pub fn validate_relaxed(&self, context: &ToleranceContext) -> bool {
        self.validation_report(context, false).is_valid()
    }

    /// Every violated constraint, bound and integrality requirement of the current assignment
    pub fn validation_report(
        &self,
        context: &ToleranceContext,
        check_integrality: bool,
    ) -> ValidationReport {
        validation::validate_solution(self, self, context, check_integrality)
    }

    /// Solve the model without modifying it
    pub fn solve(&self, direction: ObjectiveDirection, config: &SolveConfig) -> SolveResult {
        solvers::solve(self, direction, config)
    }

    /// Find the assignment minimising the objective, and commit it to the model's values
    pub fn minimise(&mut self, config: &SolveConfig) -> SolveResult {
        self.optimise(ObjectiveDirection::Minimisation, config)
    }

    /// Find the assignment maximising the objective, and commit it to the model's values
    pub fn maximise(&mut self, config: &SolveConfig) -> SolveResult {
        self.optimise(ObjectiveDirection::Maximisation, config)
    }

    /// Solve the model in the given direction, and commit the solution found (if any)
    pub fn optimise(&mut self, direction: ObjectiveDirection, config: &SolveConfig) -> SolveResult {
        let result = self.solve(direction, config);
        if result.status().has_solution() {
            self.commit(&result);
        }
        result
    }

    /// Copy the values of a solution into the model
    pub fn commit(&mut self, result: &SolveResult) {
        debug!(
            "committing a {:?} solution of {} variables",
            result.status(),
            result.values().len()
        );
        for (slot, &value) in self.values.iter_mut().zip(result.values()) {
            *slot = Some(value);
        }
    }
}

/// The values currently assigned to the variables, unassigned ones being zero
impl Solution for Model {
    fn value(&self, variable: Variable) -> f64 {
        Model::value(self, variable)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = |f: &mut Formatter<'_>, var: Variable| write!(f, "{}", self.name(var));
        write!(f, "objective: ")?;
        self.objective.format_with(f, name)?;
        writeln!(f)?;
        for (_, c) in self.constraints() {
            write!(f, "{}: ", c.name().unwrap_or("_"))?;
            c.format_with(f, name)?;
            writeln!(f)?;
        }
        for (var, def) in self.variables() {
            writeln!(
                f,
                "{} {} in [{}, {}]",
                self.name(var),
                def.domain,
                def.min,
                def.max
            )?;
        }
        Ok(())
    }
}
