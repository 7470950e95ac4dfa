//! A [Variable] is the base element used to create an [Expression].
//! The goal of the solver is to find optimal values for all variables in a model.
//!
//! Each variable has a [VariableDefinition] that sets its name, its [domain](VariableDomain)
//! and its bounds.
use std::collections::Bound;
use std::fmt::{Display, Formatter};
use std::ops::{Div, Mul, Neg, RangeBounds};

use fnv::FnvHashMap as HashMap;

use crate::affine_expression_trait::IntoAffineExpression;
use crate::expression::{Expression, LinearExpression};

/// A variable in a model. Use variables to create [expressions](Expression),
/// to express the objective and the [Constraints](crate::Constraint) of your model.
///
/// Variables are created using [Model::add_variable](crate::Model::add_variable)
///
/// ## Warning
/// `Eq` is implemented on this type, but
/// `v1 == v2` is true only if the two variables represent the same object,
/// not if they have the same definition.
///
/// ```
/// # use mip_lp::{variable, Model};
/// let mut model = Model::new();
/// let v1 = model.add_variable(variable().min(1).max(8)).unwrap();
/// let v2 = model.add_variable(variable().min(1).max(8)).unwrap();
/// assert_ne!(v1, v2);
///
/// let v1_copy = v1;
/// assert_eq!(v1, v1_copy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// A variable is nothing more than an index into the `variables` field of a Model
    /// That's why it can be `Copy`.
    /// All the actual information about the variable (name, type, bounds, ...) is stored in the Model
    index: usize,
}

impl IntoAffineExpression for Variable {
    type Iter = std::iter::Once<(Self, f64)>;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        std::iter::once((self, 1.))
    }
}

impl<'a> IntoAffineExpression for &'a Variable {
    type Iter = std::iter::Once<(Variable, f64)>;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        (*self).linear_coefficients()
    }
}

impl Variable {
    /// No one should use this method outside of the crate
    pub(crate) fn at(index: usize) -> Self {
        Self { index }
    }

    /// The position of the variable in its model
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An element that can be displayed if you give a variable display function
pub trait FormatWithVars {
    /// Write the element to the formatter. See [std::fmt::Display]
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result;

    /// Write the elements, naming the variables v0, v1, ... vn
    fn format_debug(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_with(f, |f, var| write!(f, "v{}", var.index()))
    }
}

/// The set of values a variable may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableDomain {
    /// Any real number between the bounds
    Continuous,
    /// Any integer between the bounds
    Integer,
    /// 0 or 1
    Binary,
}

impl VariableDomain {
    /// True for [Integer](VariableDomain::Integer) and [Binary](VariableDomain::Binary)
    pub fn is_integer(&self) -> bool {
        !matches!(self, VariableDomain::Continuous)
    }
}

impl Display for VariableDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VariableDomain::Continuous => "continuous",
            VariableDomain::Integer => "integer",
            VariableDomain::Binary => "binary",
        })
    }
}

/// Defines the properties of a variable, such as its name and its lower and upper bounds.
#[derive(Clone, PartialEq, Debug)]
pub struct VariableDefinition {
    pub(crate) name: Option<String>,
    pub(crate) domain: VariableDomain,
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl VariableDefinition {
    /// Creates an unbounded continuous linear variable
    pub fn new() -> Self {
        VariableDefinition {
            name: None,
            domain: VariableDomain::Continuous,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Set the name of the variable. Names must be unique within a model.
    ///
    /// ```
    /// # use mip_lp::{variable, Model};
    /// let mut model = Model::new();
    /// let x = model.add_variable(variable().name("x")).unwrap();
    /// assert_eq!(model.name(x), "x");
    /// ```
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the lower and/or higher bounds of the variable
    ///
    /// ## Examples
    /// ```
    /// # use mip_lp::variable;
    /// assert_eq!(
    ///     variable().bounds(1..2),
    ///     variable().min(1).max(2)
    /// );
    ///
    /// assert_eq!(
    ///     variable().bounds(1..),
    ///     variable().min(1)
    /// );
    ///
    /// assert_eq!(
    ///     variable().bounds(..=2),
    ///     variable().max(2)
    /// );
    ///
    /// # assert_eq!(variable().bounds::<f64, _>(..), variable());
    /// ```
    pub fn bounds<N: Into<f64> + Copy, B: RangeBounds<N>>(self, bounds: B) -> Self {
        self.min(match bounds.start_bound() {
            Bound::Included(&x) => x.into(),
            Bound::Excluded(&x) => x.into(),
            Bound::Unbounded => f64::NEG_INFINITY,
        })
        .max(match bounds.end_bound() {
            Bound::Included(&x) => x.into(),
            Bound::Excluded(&x) => x.into(),
            Bound::Unbounded => f64::INFINITY,
        })
    }

    /// Set the lower bound of the variable
    pub fn min<N: Into<f64>>(mut self, min: N) -> Self {
        self.min = min.into();
        self
    }
    /// Set the higher bound of the variable
    pub fn max<N: Into<f64>>(mut self, max: N) -> Self {
        self.max = max.into();
        self
    }

    /// Set both the lower and higher bounds of the variable
    pub fn clamp<N1: Into<f64>, N2: Into<f64>>(self, min: N1, max: N2) -> Self {
        self.min(min).max(max)
    }

    /// Restrict the variable to integer values
    ///
    /// ```
    /// # use mip_lp::{variable, VariableDomain};
    /// assert!(variable().integer().domain().is_integer());
    /// ```
    pub fn integer(mut self) -> Self {
        self.domain = VariableDomain::Integer;
        self
    }

    /// Restrict the variable to the values 0 and 1.
    /// This also sets the bounds to `[0, 1]`.
    pub fn binary(mut self) -> Self {
        self.domain = VariableDomain::Binary;
        self.min = 0.;
        self.max = 1.;
        self
    }

    /// The declared domain
    pub fn domain(&self) -> VariableDomain {
        self.domain
    }

    /// The lower bound, possibly `-inf`
    pub fn lower(&self) -> f64 {
        self.min
    }

    /// The upper bound, possibly `+inf`
    pub fn upper(&self) -> f64 {
        self.max
    }

    /// The name given with [VariableDefinition::name], if any
    pub fn given_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Creates an unbounded continuous linear variable
impl Default for VariableDefinition {
    fn default() -> Self {
        VariableDefinition::new()
    }
}

/// Returns an anonymous unbounded continuous variable definition
pub fn variable() -> VariableDefinition {
    VariableDefinition::default()
}

impl<N: Into<f64>> Mul<N> for Variable {
    type Output = Expression;

    fn mul(self, rhs: N) -> Self::Output {
        let mut coefficients = HashMap::with_capacity_and_hasher(1, Default::default());
        coefficients.insert(self, rhs.into());
        Expression {
            linear: LinearExpression { coefficients },
            constant: 0.0,
        }
    }
}

impl Mul<Variable> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Variable) -> Self::Output {
        rhs.mul(self)
    }
}

impl Mul<Variable> for i32 {
    type Output = Expression;

    fn mul(self, rhs: Variable) -> Self::Output {
        rhs.mul(f64::from(self))
    }
}

impl Div<f64> for Variable {
    type Output = Expression;
    fn div(self, rhs: f64) -> Self::Output {
        self * (1. / rhs)
    }
}

impl Div<i32> for Variable {
    type Output = Expression;
    fn div(self, rhs: i32) -> Self::Output {
        self * (1. / f64::from(rhs))
    }
}

impl Neg for Variable {
    type Output = Expression;

    fn neg(self) -> Self::Output {
        -Expression::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{variable, VariableDomain};

    #[test]
    fn binary_sets_bounds() {
        let def = variable().min(-5).binary();
        assert_eq!(def.domain(), VariableDomain::Binary);
        assert_eq!((def.lower(), def.upper()), (0., 1.));
    }

    #[test]
    fn domain_display() {
        assert_eq!(VariableDomain::Integer.to_string(), "integer");
        assert!(!VariableDomain::Continuous.is_integer());
    }
}
