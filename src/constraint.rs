//! Constraints define the inequalities that must hold in the solution.
//!
//! Every constraint is stored as `lower <= body <= upper`, which covers `<=`, `>=`, `=`
//! and range constraints uniformly. A missing limit is represented by an infinite value.
use crate::expression::Expression;
use crate::variable::{FormatWithVars, Variable};
use core::fmt::{Debug, Formatter};
use std::ops::{Shl, Shr, Sub};

/// A constraint represents a single two-sided (in)equality that must hold in the solution.
#[derive(Clone)]
pub struct Constraint {
    /// The constrained expression. Its constant is always zero:
    /// constants are folded into the limits at construction.
    pub(crate) expression: Expression,
    /// `-inf` when there is no lower limit
    pub(crate) lower: f64,
    /// `+inf` when there is no upper limit
    pub(crate) upper: f64,
    /// Optional constraint name
    pub(crate) name: Option<String>,
}

impl Constraint {
    fn new(mut expression: Expression, lower: f64, upper: f64) -> Constraint {
        let constant = std::mem::take(&mut expression.constant);
        Constraint {
            expression,
            lower: lower - constant,
            upper: upper - constant,
            name: None,
        }
    }

    /// A range constraint `lower <= expression <= upper`.
    /// Infinite values can be used to leave one side open.
    ///
    /// ```
    /// # use mip_lp::{variable, Constraint, Model};
    /// let mut model = Model::new();
    /// let x = model.add_variable(variable()).unwrap();
    /// let c = Constraint::range(2 * x + 1, 3, 7);
    /// assert_eq!((c.lower(), c.upper()), (Some(2.), Some(6.)));
    /// assert_eq!(format!("{:?}", c), "2 <= 2 v0 <= 6");
    /// ```
    pub fn range<E, L, U>(expression: E, lower: L, upper: U) -> Constraint
    where
        E: Into<Expression>,
        L: Into<f64>,
        U: Into<f64>,
    {
        Constraint::new(expression.into(), lower.into(), upper.into())
    }

    /// set the constraint name
    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// The name given with [Constraint::set_name]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The constrained expression (without constant term)
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The lower limit, if any
    pub fn lower(&self) -> Option<f64> {
        Some(self.lower).filter(|l| l.is_finite())
    }

    /// The upper limit, if any
    pub fn upper(&self) -> Option<f64> {
        Some(self.upper).filter(|u| u.is_finite())
    }

    /// True when both limits are equal
    pub fn is_equality(&self) -> bool {
        #[allow(clippy::float_cmp)]
        let equal = self.lower == self.upper;
        equal
    }
}

impl FormatWithVars for Constraint {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        match (self.lower(), self.upper()) {
            (Some(l), Some(_)) if self.is_equality() => {
                self.expression.linear.format_with(f, variable_format)?;
                write!(f, " = {}", l)
            }
            (Some(l), Some(u)) => {
                write!(f, "{} <= ", l)?;
                self.expression.linear.format_with(f, variable_format)?;
                write!(f, " <= {}", u)
            }
            (Some(l), None) => {
                self.expression.linear.format_with(f, variable_format)?;
                write!(f, " >= {}", l)
            }
            (None, Some(u)) => {
                self.expression.linear.format_with(f, variable_format)?;
                write!(f, " <= {}", u)
            }
            (None, None) => {
                self.expression.linear.format_with(f, variable_format)?;
                write!(f, " free")
            }
        }
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_debug(f)
    }
}

/// equals
pub fn eq<B, A: Sub<B, Output = Expression>>(a: A, b: B) -> Constraint {
    Constraint::new(a - b, 0., 0.)
}

/// less than or equal
pub fn leq<B, A: Sub<B, Output = Expression>>(a: A, b: B) -> Constraint {
    Constraint::new(a - b, f64::NEG_INFINITY, 0.)
}

/// greater than or equal
pub fn geq<B, A: Sub<B, Output = Expression>>(a: A, b: B) -> Constraint {
    Constraint::new(a - b, 0., f64::INFINITY)
}

macro_rules! impl_shifts {
    ($($t:ty)*) => {$(
        impl< RHS> Shl<RHS> for $t where Self: Sub<RHS, Output=Expression> {
            type Output = Constraint;

            fn shl(self, rhs: RHS) -> Self::Output {
                leq(self, rhs)
            }
        }

        impl< RHS> Shr<RHS> for $t where Self: Sub<RHS, Output=Expression> {
            type Output = Constraint;

            fn shr(self, rhs: RHS) -> Self::Output {
                geq(self, rhs)
            }
        }
    )*}
}

impl_shifts!(Expression Variable);

/// This macro allows defining constraints using `a + b <= c + d`
/// instead of `(a + b).leq(c + d)` or `a + b << c + d`
///
/// # Example
///
/// ```
/// # use float_eq::assert_float_eq;
/// use mip_lp::*;
///
/// let mut model = Model::new();
/// let a = model.add_variable(variable().max(10)).unwrap();
/// let b = model.add_variable(variable()).unwrap();
/// model.add_constraint(constraint!(a - 5 <= b / 2)).unwrap();
/// model.add_constraint(constraint!(b == a)).unwrap();
/// model.set_objective(a + b);
/// let result = model.maximise(&SolveConfig::default());
/// assert_float_eq!(10., result.value(a), abs <= 1e-8);
/// assert_float_eq!(10., result.value(b), abs <= 1e-8);
/// ```
#[macro_export]
macro_rules! constraint {
    ([$($left:tt)*] <= $($right:tt)*) => {
        $crate::constraint::leq($($left)*, $($right)*)
    };
    ([$($left:tt)*] >= $($right:tt)*) => {
        $crate::constraint::geq($($left)*, $($right)*)
    };
    ([$($left:tt)*] == $($right:tt)*) => {
        $crate::constraint::eq($($left)*, $($right)*)
    };
    // Stop condition: all token have been processed
    ([$($left:tt)*]) => {
        $($left:tt)*
    };
    // The next token is not a special one
    ([$($left:tt)*] $next:tt $($right:tt)*) => {
        $crate::constraint!([$($left)* $next] $($right)*)
    };
    // Initial rule: start the recursive calls
    ($($all:tt)*) => {
        $crate::constraint!([] $($all)*)
    };
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// A constraint reference contains the sequence id of the constraint within the model
pub struct ConstraintReference {
    pub(crate) index: usize,
}

impl ConstraintReference {
    /// The position of the constraint in its model
    pub fn index(&self) -> usize {
        self.index
    }
}
