use std::fmt::{Debug, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use fnv::FnvHashMap as HashMap;

use crate::affine_expression_trait::IntoAffineExpression;
use crate::constraint;
use crate::variable::{FormatWithVars, Variable};
use crate::{Constraint, Solution};

/// An linear expression without a constant component
pub struct LinearExpression {
    pub(crate) coefficients: HashMap<Variable, f64>,
}

impl IntoAffineExpression for LinearExpression {
    type Iter = std::collections::hash_map::IntoIter<Variable, f64>;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        self.coefficients.into_iter()
    }
}

/// Return type for `&'a LinearExpression::linear_coefficients`
#[doc(hidden)]
pub struct CopiedCoefficients<'a>(std::collections::hash_map::Iter<'a, Variable, f64>);

impl Iterator for CopiedCoefficients<'_> {
    type Item = (Variable, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&var, &c)| (var, c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoAffineExpression for &'a LinearExpression {
    type Iter = CopiedCoefficients<'a>;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        CopiedCoefficients(self.coefficients.iter())
    }
}

impl FormatWithVars for LinearExpression {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, mut variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        // Sorted so that the output does not depend on the hash map iteration order
        let mut terms: Vec<(Variable, f64)> = self
            .coefficients
            .iter()
            .filter(|(_, &coeff)| coeff != 0f64)
            .map(|(&var, &coeff)| (var, coeff))
            .collect();
        terms.sort_unstable_by_key(|&(var, _)| var);
        let mut first = true;
        for (var, coeff) in terms {
            if first {
                first = false;
            } else {
                write!(f, " + ")?;
            }
            if (coeff - 1.).abs() > f64::EPSILON {
                write!(f, "{} ", coeff)?;
            }
            variable_format(f, var)?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl Clone for LinearExpression {
    fn clone(&self) -> Self {
        LinearExpression {
            coefficients: self.coefficients.clone(),
        }
    }
}

impl Debug for LinearExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearExpression")
            .field("coefficients", &self.coefficients)
            .finish()
    }
}

/// Represents an affine expression, such as `2x + 3` or `x + y + z`.
/// Used both for the objective of a [Model](crate::Model) and for the body of each [Constraint].
pub struct Expression {
    pub(crate) linear: LinearExpression,
    pub(crate) constant: f64,
}

impl IntoAffineExpression for Expression {
    type Iter = <LinearExpression as IntoAffineExpression>::Iter;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        self.linear.linear_coefficients()
    }

    #[inline]
    fn constant(&self) -> f64 {
        self.constant
    }
}

/// This implementation copies all the variables and coefficients from the referenced
/// Expression into the created iterator
impl<'a> IntoAffineExpression for &'a Expression {
    type Iter = <&'a LinearExpression as IntoAffineExpression>::Iter;

    #[inline]
    fn linear_coefficients(self) -> Self::Iter {
        (&self.linear).linear_coefficients()
    }

    #[inline]
    fn constant(&self) -> f64 {
        self.constant
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.constant == other.constant && self.linear.coefficients == other.linear.coefficients
    }
}

impl Clone for Expression {
    fn clone(&self) -> Self {
        Expression {
            linear: self.linear.clone(),
            constant: self.constant,
        }
    }
}

impl Debug for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_debug(f)
    }
}

impl Default for Expression {
    fn default() -> Self {
        Expression::from(0.)
    }
}

impl Expression {
    /// Create an expression that has the value 0, but has memory allocated
    /// for `capacity` coefficients.
    pub fn with_capacity(capacity: usize) -> Self {
        Expression {
            linear: LinearExpression {
                coefficients: HashMap::with_capacity_and_hasher(capacity, Default::default()),
            },
            constant: 0.0,
        }
    }

    /// Create a concrete expression struct from anything that has linear coefficients and a constant
    ///
    /// ```
    /// # use mip_lp::Expression;
    /// Expression::from_other_affine(0.); // A constant expression
    /// ```
    pub fn from_other_affine<E: IntoAffineExpression>(source: E) -> Self {
        source.into_expression()
    }

    /// Creates a constraint indicating that this expression
    /// is lesser than or equal to the right hand side
    pub fn leq<RHS>(self, rhs: RHS) -> Constraint
    where
        Expression: Sub<RHS, Output = Expression>,
    {
        constraint::leq(self, rhs)
    }

    /// Creates a constraint indicating that this expression
    /// is greater than or equal to the right hand side
    pub fn geq<RHS>(self, rhs: RHS) -> Constraint
    where
        Expression: Sub<RHS, Output = Expression>,
    {
        constraint::geq(self, rhs)
    }

    /// Creates a constraint indicating that this expression
    /// is equal to the right hand side
    pub fn eq<RHS>(self, rhs: RHS) -> Constraint
    where
        Expression: Sub<RHS, Output = Expression>,
    {
        constraint::eq(self, rhs)
    }

    /// Performs self = self + (a * b)
    #[inline]
    pub fn add_mul<N: Into<f64>, E: IntoAffineExpression>(&mut self, a: N, b: E) {
        let factor = a.into();
        let constant = b.constant();
        for (var, value) in b.linear_coefficients().into_iter() {
            *self.linear.coefficients.entry(var).or_default() += factor * value
        }
        self.constant += factor * constant;
    }

    /// See [IntoAffineExpression::eval_with]
    pub fn eval_with<S: Solution>(&self, values: &S) -> f64 {
        IntoAffineExpression::eval_with(self, values)
    }

    /// Add a linear term to this expression
    pub fn add_linear_term(&mut self, var: Variable, coefficient: f64) {
        *self.linear.coefficients.entry(var).or_default() += coefficient;
    }

    /// Add a constant term to this expression
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The coefficient of `var`, 0 if the variable does not appear in the expression
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.linear.coefficients.get(&var).copied().unwrap_or(0.)
    }

    /// The constant term
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Iterates over the variables and their coefficients, in no particular order
    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.linear.coefficients.iter().map(|(&var, &c)| (var, c))
    }

    /// The number of variables with a stored coefficient
    pub fn len(&self) -> usize {
        self.linear.coefficients.len()
    }

    /// True when the expression is a constant
    pub fn is_empty(&self) -> bool {
        self.linear.coefficients.is_empty()
    }
}

#[inline]
pub fn add_mul<LHS: Into<Expression>, RHS: IntoAffineExpression>(
    lhs: LHS,
    rhs: RHS,
    factor: f64,
) -> Expression {
    let mut result = lhs.into();
    result.add_mul(factor, rhs);
    result
}

#[inline]
pub fn sub<LHS: Into<Expression>, RHS: IntoAffineExpression>(lhs: LHS, rhs: RHS) -> Expression {
    add_mul(lhs, rhs, -1.)
}

#[inline]
pub fn add<LHS: Into<Expression>, RHS: IntoAffineExpression>(lhs: LHS, rhs: RHS) -> Expression {
    add_mul(lhs, rhs, 1.)
}

// Expression op number
macro_rules! impl_expr_ops_for_num {
    ($($num:ty),*) => {$(
        impl Mul<$num> for Expression {
            type Output = Expression;
            fn mul(mut self, rhs: $num) -> Self::Output {
                self *= rhs;
                self
            }
        }

        impl Div<$num> for Expression {
            type Output = Expression;
            fn div(mut self, rhs: $num) -> Self::Output {
                self *= 1.0 / f64::from(rhs);
                self
            }
        }
    )*};
}

// number op Expression, number op Variable
macro_rules! impl_num_ops_for_expr {
    ($($num:ty),*) => {$(
        impl Add<Expression> for $num {
            type Output = Expression;
            fn add(self, rhs: Expression) -> Self::Output {
                rhs + self
            }
        }

        impl Sub<Expression> for $num {
            type Output = Expression;
            fn sub(self, rhs: Expression) -> Self::Output {
                Expression::from(self) - rhs
            }
        }

        impl Mul<Expression> for $num {
            type Output = Expression;
            fn mul(self, mut rhs: Expression) -> Self::Output {
                rhs *= self;
                rhs
            }
        }

        impl Add<Variable> for $num {
            type Output = Expression;
            fn add(self, rhs: Variable) -> Self::Output {
                Expression::from(self) + rhs
            }
        }

        impl Sub<Variable> for $num {
            type Output = Expression;
            fn sub(self, rhs: Variable) -> Self::Output {
                Expression::from(self) - rhs
            }
        }
    )*};
}

impl_expr_ops_for_num!(f64, f32, u32, i32);
impl_num_ops_for_expr!(f64, f32, u32, i32);

impl FormatWithVars for Expression {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        let has_terms = self.linear.coefficients.values().any(|&c| c != 0f64);
        if has_terms {
            self.linear.format_with(f, variable_format)?;
            if self.constant.abs() >= f64::EPSILON {
                write!(f, " + {}", self.constant)?;
            }
        } else {
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

impl<RHS: IntoAffineExpression> SubAssign<RHS> for Expression {
    #[inline]
    fn sub_assign(&mut self, rhs: RHS) {
        self.add_mul(-1., rhs)
    }
}

impl<RHS: IntoAffineExpression> AddAssign<RHS> for Expression {
    #[inline]
    fn add_assign(&mut self, rhs: RHS) {
        self.add_mul(1, rhs);
    }
}

impl Neg for Expression {
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self::Output {
        self *= -1;
        self
    }
}

impl<N: Into<f64>> MulAssign<N> for Expression {
    #[inline]
    fn mul_assign(&mut self, rhs: N) {
        let factor = rhs.into();
        for value in self.linear.coefficients.values_mut() {
            *value *= factor
        }
        self.constant *= factor
    }
}

impl Add<Expression> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: Expression) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sub<Expression> for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: Expression) -> Self::Output {
        self -= rhs;
        self
    }
}

macro_rules! impl_var_num_ops {
    ($($num:ty),*) => {$(
        impl Add<$num> for Variable {
            type Output = Expression;
            fn add(self, rhs: $num) -> Self::Output {
                Expression::from(self) + rhs
            }
        }

        impl Sub<$num> for Variable {
            type Output = Expression;
            fn sub(self, rhs: $num) -> Self::Output {
                Expression::from(self) - rhs
            }
        }
    )*};
}

impl_var_num_ops!(f64, f32, u32, i32);

impl Add<Expression> for Variable {
    type Output = Expression;
    fn add(self, rhs: Expression) -> Self::Output {
        Expression::from(self) + rhs
    }
}

impl Sub<Expression> for Variable {
    type Output = Expression;
    fn sub(self, rhs: Expression) -> Self::Output {
        Expression::from(self) - rhs
    }
}

impl Add<Variable> for Variable {
    type Output = Expression;
    fn add(self, rhs: Variable) -> Self::Output {
        Expression::from(self) + rhs
    }
}

impl Sub<Variable> for Variable {
    type Output = Expression;
    fn sub(self, rhs: Variable) -> Self::Output {
        Expression::from(self) - rhs
    }
}

impl Add<&Variable> for Variable {
    type Output = Expression;
    fn add(self, rhs: &Variable) -> Self::Output {
        Expression::from(self) + *rhs
    }
}

impl Sub<&Variable> for Variable {
    type Output = Expression;
    fn sub(self, rhs: &Variable) -> Self::Output {
        Expression::from(self) - *rhs
    }
}

macro_rules! impl_expr_affine_ops {
    ($($affine_type:ty),*) => {$(
        impl Sub<$affine_type> for Expression {
            type Output = Expression;
            fn sub(self, rhs: $affine_type) -> Self::Output { sub(self, rhs) }
        }

        impl Add<$affine_type> for Expression {
            type Output = Expression;
            fn add(self, rhs: $affine_type) -> Self::Output { add(self, rhs) }
        }
    )*};
}

impl_expr_affine_ops!(Variable, f64, f32, u32, i32);

macro_rules! impl_conv {
    ( $( $typename:ident ),* ) => {$(
        impl From<$typename> for Expression {
            fn from(x: $typename) -> Expression { Expression::from_other_affine(x) }
        }
    )*}
}
impl_conv!(f64, f32, u32, i32, Variable);

impl<E: IntoAffineExpression> std::iter::Sum<E> for Expression {
    fn sum<I: Iterator<Item = E>>(iter: I) -> Self {
        let (capacity, _) = iter.size_hint();
        let mut res = Expression::with_capacity(capacity);
        for i in iter {
            res.add_assign(i)
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{variable, Expression, Model};

    #[test]
    fn expression_manipulation() {
        let mut model = Model::new();
        let v0 = model.add_variable(variable()).unwrap();
        let v1 = model.add_variable(variable()).unwrap();
        assert_eq!((3. - v0) - v1, (-1.) * v0 + (-1.) * v1 + 3.)
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn eval() {
        let mut model = Model::new();
        let a = model.add_variable(variable()).unwrap();
        let b = model.add_variable(variable()).unwrap();
        let mut values = HashMap::new();
        values.insert(a, 100);
        values.insert(b, -1);
        assert_eq!((a + 3.0_f64 * (b + 3.0_f64)).eval_with(&values), 106.)
    }

    #[test]
    fn debug_format_is_sorted() {
        let mut model = Model::new();
        let a = model.add_variable(variable()).unwrap();
        let b = model.add_variable(variable()).unwrap();
        let expression: Expression = 2 * b + a + 1;
        assert_eq!(format!("{:?}", expression), "v0 + 2 v1 + 1");
        assert_eq!(format!("{:?}", Expression::from(4)), "4");
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn coefficient_lookup() {
        let mut model = Model::new();
        let a = model.add_variable(variable()).unwrap();
        let b = model.add_variable(variable()).unwrap();
        let expression: Expression = 4 * a - 7;
        assert_eq!(expression.coefficient(a), 4.);
        assert_eq!(expression.coefficient(b), 0.);
        assert_eq!(expression.constant(), -7.);
        assert_eq!(expression.len(), 1);
    }
}
