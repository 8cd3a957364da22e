//! Objective spaces: named result variables and the objectives over them.

use crate::context::Context;
use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::hyperparameter::Hyperparameter;
use crate::types::Direction;

/// An expression over objective-result variables, tuned in one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    expression: Expression,
    direction: Direction,
}

impl Objective {
    /// The objective's expression.
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Whether the objective is minimized or maximized.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// A context of objective-result variables plus an ordered objective list.
#[derive(Clone, Debug, Default)]
pub struct ObjectiveSpace {
    name: String,
    context: Context,
    objectives: Vec<Objective>,
}

impl ObjectiveSpace {
    /// Creates an empty objective space.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Context::new(),
            objectives: Vec::new(),
        }
    }

    /// The space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying result-variable context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The number of result variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// True when the space holds no result variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Appends a result variable and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHyperparameter`] if the name is taken.
    pub fn add_hyperparameter(&mut self, hyperparameter: Hyperparameter) -> Result<usize> {
        self.context.add(hyperparameter)
    }

    /// The index of the result variable named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHyperparameter`] if no such name exists.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.context.index_of(name)
    }

    /// Appends an objective evaluated over the result variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] when the expression references a
    /// variable outside the space.
    pub fn add_objective(&mut self, expression: Expression, direction: Direction) -> Result<()> {
        expression.check_context(&self.context)?;
        self.objectives.push(Objective {
            expression,
            direction,
        });
        Ok(())
    }

    /// The objectives, in insertion order.
    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Validates one value per result variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvaluation`] for a wrong-length binding or a
    /// value outside its variable's domain.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidEvaluation(
                "binding length does not match the objective space",
            ));
        }
        for (hyperparameter, value) in self.context.iter().zip(values) {
            if value.is_inactive() || !hyperparameter.check_value(value) {
                return Err(Error::InvalidEvaluation(
                    "value lies outside its result variable's domain",
                ));
            }
        }
        Ok(())
    }

    /// Evaluates every objective against a result-variable binding.
    ///
    /// # Errors
    ///
    /// Propagates expression evaluation failures.
    pub fn evaluate(&self, values: &[Datum]) -> Result<Vec<Datum>> {
        self.objectives
            .iter()
            .map(|objective| objective.expression.eval(&self.context, values))
            .collect()
    }
}
