//! Expression trees over hyperparameter bindings.
//!
//! Expressions drive activation conditions and forbidden clauses, and define
//! objectives. They are immutable trees of literals, variables (by context
//! index), unary and binary operators, list membership, and a ternary
//! conditional, evaluated against a context plus one value per
//! hyperparameter.
//!
//! Evaluation is total except for type errors: arithmetic requires numeric
//! operands, logic requires booleans, and equality across mismatched types
//! is `false` rather than an error. The inactive marker behaves as a
//! distinguishable value under equality, makes ordering comparisons `false`,
//! and is an error everywhere else.

use core::cmp::Ordering;

use crate::context::Context;
use crate::datum::{Datum, Numeric};
use crate::error::{Error, Result};
use crate::hyperparameter::Hyperparameter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    /// Numeric identity.
    Positive,
    /// Numeric negation.
    Negative,
    /// Boolean negation.
    Not,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    /// Boolean disjunction, short-circuiting.
    Or,
    /// Boolean conjunction, short-circuiting.
    And,
    /// Equality.
    Equal,
    /// Inequality.
    NotEqual,
    /// Strictly-less comparison.
    Less,
    /// Strictly-greater comparison.
    Greater,
    /// Less-or-equal comparison.
    LessOrEqual,
    /// Greater-or-equal comparison.
    GreaterOrEqual,
    /// Numeric addition.
    Add,
    /// Numeric subtraction.
    Subtract,
    /// Numeric multiplication.
    Multiply,
    /// Numeric division.
    Divide,
    /// Numeric remainder.
    Modulo,
}

/// An immutable expression tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expression {
    /// A constant value.
    Literal(Datum),
    /// The value of the hyperparameter at a context index.
    Variable(usize),
    /// A unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expression>,
    },
    /// A binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        left: Box<Expression>,
        /// The right operand.
        right: Box<Expression>,
    },
    /// List membership under equality semantics.
    In {
        /// The value searched for.
        needle: Box<Expression>,
        /// The candidate values.
        list: Vec<Expression>,
    },
    /// A conditional that evaluates only the selected branch.
    Ternary {
        /// The boolean selector.
        condition: Box<Expression>,
        /// Evaluated when the selector is true.
        then: Box<Expression>,
        /// Evaluated when the selector is false.
        otherwise: Box<Expression>,
    },
}

impl Expression {
    /// A constant expression.
    #[must_use]
    pub fn literal(value: impl Into<Datum>) -> Self {
        Expression::Literal(value.into())
    }

    /// The hyperparameter at `index` in the evaluation context.
    #[must_use]
    pub fn variable(index: usize) -> Self {
        Expression::Variable(index)
    }

    /// A unary operator application.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// A binary operator application.
    #[must_use]
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// List membership: true when `needle` equals any list element.
    #[must_use]
    pub fn in_list(needle: Expression, list: Vec<Expression>) -> Self {
        Expression::In {
            needle: Box::new(needle),
            list,
        }
    }

    /// A conditional expression.
    #[must_use]
    pub fn ternary(condition: Expression, then: Expression, otherwise: Expression) -> Self {
        Expression::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// `self == other`.
    #[must_use]
    pub fn equal(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Equal, self, other)
    }

    /// `self != other`.
    #[must_use]
    pub fn not_equal(self, other: Expression) -> Self {
        Self::binary(BinaryOp::NotEqual, self, other)
    }

    /// `self < other`.
    #[must_use]
    pub fn less(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Less, self, other)
    }

    /// `self > other`.
    #[must_use]
    pub fn greater(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Greater, self, other)
    }

    /// `self <= other`.
    #[must_use]
    pub fn less_or_equal(self, other: Expression) -> Self {
        Self::binary(BinaryOp::LessOrEqual, self, other)
    }

    /// `self >= other`.
    #[must_use]
    pub fn greater_or_equal(self, other: Expression) -> Self {
        Self::binary(BinaryOp::GreaterOrEqual, self, other)
    }

    /// `self || other`.
    #[must_use]
    pub fn or(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Or, self, other)
    }

    /// `self && other`.
    #[must_use]
    pub fn and(self, other: Expression) -> Self {
        Self::binary(BinaryOp::And, self, other)
    }

    /// `self + other`.
    #[must_use]
    pub fn add(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Add, self, other)
    }

    /// `self - other`.
    #[must_use]
    pub fn subtract(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Subtract, self, other)
    }

    /// `self * other`.
    #[must_use]
    pub fn multiply(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Multiply, self, other)
    }

    /// `self / other`.
    #[must_use]
    pub fn divide(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Divide, self, other)
    }

    /// `self % other`.
    #[must_use]
    pub fn modulo(self, other: Expression) -> Self {
        Self::binary(BinaryOp::Modulo, self, other)
    }

    /// `!self`.
    #[must_use]
    pub fn not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// `-self`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::unary(UnaryOp::Negative, self)
    }

    /// The context indices this expression reads, sorted and deduplicated.
    #[must_use]
    pub fn variables(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        self.collect_variables(&mut indices);
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    fn collect_variables(&self, indices: &mut Vec<usize>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Variable(index) => indices.push(*index),
            Expression::Unary { operand, .. } => operand.collect_variables(indices),
            Expression::Binary { left, right, .. } => {
                left.collect_variables(indices);
                right.collect_variables(indices);
            }
            Expression::In { needle, list } => {
                needle.collect_variables(indices);
                for item in list {
                    item.collect_variables(indices);
                }
            }
            Expression::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_variables(indices);
                then.collect_variables(indices);
                otherwise.collect_variables(indices);
            }
        }
    }

    /// Conservative static check that the expression yields a boolean.
    /// Variables pass, since their domains may hold booleans; evaluation
    /// still enforces the type.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        match self {
            Expression::Literal(value) => matches!(value, Datum::Bool(_)),
            Expression::Variable(_) | Expression::In { .. } => true,
            Expression::Unary { op, .. } => *op == UnaryOp::Not,
            Expression::Binary { op, .. } => !matches!(
                op,
                BinaryOp::Add
                    | BinaryOp::Subtract
                    | BinaryOp::Multiply
                    | BinaryOp::Divide
                    | BinaryOp::Modulo
            ),
            Expression::Ternary {
                then, otherwise, ..
            } => then.is_boolean() && otherwise.is_boolean(),
        }
    }

    /// Validates that every variable this expression reads exists in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for the first missing index.
    pub fn check_context(&self, ctx: &Context) -> Result<()> {
        for index in self.variables() {
            if index >= ctx.len() {
                return Err(Error::OutOfBounds {
                    index,
                    len: ctx.len(),
                });
            }
        }
        Ok(())
    }

    /// Evaluates the expression against one value per context slot.
    ///
    /// # Errors
    ///
    /// Returns type errors for misused operands, [`Error::InvalidValue`] for
    /// integer division or remainder by zero, and
    /// [`Error::InactiveHyperparameter`] when an inactive value reaches an
    /// operator other than equality or ordering.
    pub fn eval(&self, ctx: &Context, values: &[Datum]) -> Result<Datum> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(index) => values
                .get(*index)
                .cloned()
                .ok_or(Error::OutOfBounds {
                    index: *index,
                    len: values.len(),
                }),
            Expression::Unary { op, operand } => {
                let value = operand.eval(ctx, values)?;
                eval_unary(*op, value, || inactive_name(operand, ctx))
            }
            Expression::Binary { op, left, right } => {
                eval_binary(*op, left, right, ctx, values)
            }
            Expression::In { needle, list } => {
                let needle = needle.eval(ctx, values)?;
                for item in list {
                    if data_equal(&needle, &item.eval(ctx, values)?) {
                        return Ok(Datum::Bool(true));
                    }
                }
                Ok(Datum::Bool(false))
            }
            Expression::Ternary {
                condition,
                then,
                otherwise,
            } => {
                let selected = condition.eval(ctx, values)?;
                match selected {
                    Datum::Bool(true) => then.eval(ctx, values),
                    Datum::Bool(false) => otherwise.eval(ctx, values),
                    Datum::Inactive => {
                        Err(Error::InactiveHyperparameter(inactive_name(condition, ctx)))
                    }
                    other => Err(Error::InvalidType {
                        expected: "boolean",
                        got: other.type_name(),
                    }),
                }
            }
        }
    }

    /// Evaluates the expression and requires a boolean result, the form
    /// activation conditions and forbidden clauses take.
    pub(crate) fn eval_truthy(&self, ctx: &Context, values: &[Datum]) -> Result<bool> {
        match self.eval(ctx, values)? {
            Datum::Bool(b) => Ok(b),
            other => Err(Error::InvalidType {
                expected: "boolean",
                got: other.type_name(),
            }),
        }
    }
}

fn eval_unary(
    op: UnaryOp,
    value: Datum,
    inactive: impl Fn() -> String,
) -> Result<Datum> {
    if value.is_inactive() {
        return Err(Error::InactiveHyperparameter(inactive()));
    }
    match op {
        UnaryOp::Positive => match value {
            Datum::Int(_) | Datum::Float(_) => Ok(value),
            other => Err(Error::InvalidType {
                expected: "numeric",
                got: other.type_name(),
            }),
        },
        UnaryOp::Negative => match value {
            Datum::Int(i) => Ok(Datum::Int(-i)),
            Datum::Float(f) => Ok(Datum::Float(-f)),
            other => Err(Error::InvalidType {
                expected: "numeric",
                got: other.type_name(),
            }),
        },
        UnaryOp::Not => match value {
            Datum::Bool(b) => Ok(Datum::Bool(!b)),
            other => Err(Error::InvalidType {
                expected: "boolean",
                got: other.type_name(),
            }),
        },
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    ctx: &Context,
    values: &[Datum],
) -> Result<Datum> {
    match op {
        // Short-circuiting, so inactive or ill-typed right operands are
        // never observed when the left operand decides the result.
        BinaryOp::Or | BinaryOp::And => {
            let lhs = as_bool(left, ctx, values)?;
            if (op == BinaryOp::Or && lhs) || (op == BinaryOp::And && !lhs) {
                return Ok(Datum::Bool(lhs));
            }
            Ok(Datum::Bool(as_bool(right, ctx, values)?))
        }
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let lhs = left.eval(ctx, values)?;
            let rhs = right.eval(ctx, values)?;
            let equal = data_equal(&lhs, &rhs);
            Ok(Datum::Bool(if op == BinaryOp::Equal {
                equal
            } else {
                !equal
            }))
        }
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessOrEqual | BinaryOp::GreaterOrEqual => {
            let lhs = left.eval(ctx, values)?;
            let rhs = right.eval(ctx, values)?;
            if lhs.is_inactive() || rhs.is_inactive() {
                return Ok(Datum::Bool(false));
            }
            let ordering = match ordinal_of(left, ctx).or_else(|| ordinal_of(right, ctx)) {
                Some(hp) => hp.compare_values(&lhs, &rhs)?,
                None => lhs.try_cmp(&rhs).ok_or(Error::NotComparable)?,
            };
            let holds = match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::Greater => ordering == Ordering::Greater,
                BinaryOp::LessOrEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Datum::Bool(holds))
        }
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide
        | BinaryOp::Modulo => {
            let lhs = left.eval(ctx, values)?;
            if lhs.is_inactive() {
                return Err(Error::InactiveHyperparameter(inactive_name(left, ctx)));
            }
            let rhs = right.eval(ctx, values)?;
            if rhs.is_inactive() {
                return Err(Error::InactiveHyperparameter(inactive_name(right, ctx)));
            }
            eval_arithmetic(op, &lhs, &rhs)
        }
    }
}

fn eval_arithmetic(op: BinaryOp, lhs: &Datum, rhs: &Datum) -> Result<Datum> {
    let numeric = |v: &Datum| {
        v.as_numeric().ok_or(Error::InvalidType {
            expected: "numeric",
            got: v.type_name(),
        })
    };
    let (a, b) = (numeric(lhs)?, numeric(rhs)?);
    match (a, b) {
        (Numeric::Int(a), Numeric::Int(b)) => {
            let value = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Subtract => a.wrapping_sub(b),
                BinaryOp::Multiply => a.wrapping_mul(b),
                BinaryOp::Divide | BinaryOp::Modulo => {
                    if b == 0 {
                        return Err(Error::InvalidValue("integer division by zero"));
                    }
                    if op == BinaryOp::Divide {
                        a / b
                    } else {
                        a % b
                    }
                }
                _ => unreachable!("arithmetic operator"),
            };
            Ok(Datum::Int(value))
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                _ => unreachable!("arithmetic operator"),
            };
            Ok(Datum::Float(value))
        }
    }
}

/// Equality over data: inactive equals only inactive, numerics compare
/// across kinds, and mismatched types are unequal rather than an error.
#[allow(clippy::float_cmp)]
fn data_equal(lhs: &Datum, rhs: &Datum) -> bool {
    match (lhs.as_numeric(), rhs.as_numeric()) {
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => lhs == rhs,
    }
}

fn as_bool(expr: &Expression, ctx: &Context, values: &[Datum]) -> Result<bool> {
    match expr.eval(ctx, values)? {
        Datum::Bool(b) => Ok(b),
        Datum::Inactive => Err(Error::InactiveHyperparameter(inactive_name(expr, ctx))),
        other => Err(Error::InvalidType {
            expected: "boolean",
            got: other.type_name(),
        }),
    }
}

fn ordinal_of<'a>(expr: &Expression, ctx: &'a Context) -> Option<&'a Hyperparameter> {
    if let Expression::Variable(index) = expr {
        let hp = ctx.get(*index).ok()?;
        hp.is_ordered().then_some(hp)
    } else {
        None
    }
}

fn inactive_name(expr: &Expression, ctx: &Context) -> String {
    if let Expression::Variable(index) = expr {
        if let Ok(hp) = ctx.get(*index) {
            return hp.name().to_string();
        }
    }
    "<expression>".to_string()
}
