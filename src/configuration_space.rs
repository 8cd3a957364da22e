//! Configuration spaces: conditional hyperparameter collections.
//!
//! A [`ConfigurationSpace`] holds an ordered set of hyperparameters, an
//! optional activation condition per hyperparameter, a sampling distribution
//! per hyperparameter, and a list of forbidden clauses. Conditions form a
//! directed acyclic graph over the hyperparameters; a hyperparameter whose
//! condition evaluates to false takes the inactive marker instead of a
//! value. Sampling resolves hyperparameters in topological order and rejects
//! bindings matched by a forbidden clause.
//!
//! Spaces are built mutably, then shared immutably behind an [`Arc`]; the
//! only interior mutability is the sampling RNG.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::Context;
use crate::datum::Datum;
use crate::distribution::{Distribution, MAX_SAMPLING_ATTEMPTS};
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::hyperparameter::{Domain, Hyperparameter};

/// A set of hyperparameters with activation conditions and forbidden
/// clauses.
#[derive(Debug)]
pub struct ConfigurationSpace {
    name: String,
    context: Context,
    distributions: Vec<Option<Distribution>>,
    conditions: Vec<Option<Expression>>,
    forbidden: Vec<Expression>,
    topo_order: Vec<usize>,
    rng: Mutex<fastrand::Rng>,
}

impl ConfigurationSpace {
    /// Creates an empty space.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Context::new(),
            distributions: Vec::new(),
            conditions: Vec::new(),
            forbidden: Vec::new(),
            topo_order: Vec::new(),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates an empty space with a seeded RNG, for reproducible sampling.
    #[must_use]
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        let mut space = Self::new(name);
        space.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        space
    }

    /// The space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying hyperparameter context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The number of hyperparameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// True when the space holds no hyperparameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// The index of the hyperparameter named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHyperparameter`] if no such name exists.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.context.index_of(name)
    }

    /// The hyperparameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the index is past the collection.
    pub fn hyperparameter(&self, index: usize) -> Result<&Hyperparameter> {
        self.context.get(index)
    }

    /// Appends a hyperparameter sampled through its default distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHyperparameter`] if the name is taken.
    pub fn add_hyperparameter(&mut self, hyperparameter: Hyperparameter) -> Result<usize> {
        let distribution = match hyperparameter.domain() {
            Domain::String => None,
            _ => Some(hyperparameter.default_distribution()?),
        };
        self.push(hyperparameter, distribution)
    }

    /// Appends a hyperparameter sampled through an explicit distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHyperparameter`] if the name is taken,
    /// [`Error::InvalidValue`] if the distribution kind does not fit a
    /// numerical domain, and [`Error::UnsupportedOperation`] for string
    /// domains.
    pub fn add_hyperparameter_with_distribution(
        &mut self,
        hyperparameter: Hyperparameter,
        distribution: Distribution,
    ) -> Result<usize> {
        match hyperparameter.domain() {
            Domain::Numerical { kind, .. } => {
                if distribution.kind() != *kind {
                    return Err(Error::InvalidValue(
                        "distribution kind does not match the numerical domain",
                    ));
                }
            }
            Domain::String => {
                return Err(Error::UnsupportedOperation(
                    "string hyperparameters cannot be sampled",
                ));
            }
            _ => {}
        }
        self.push(hyperparameter, Some(distribution))
    }

    fn push(
        &mut self,
        hyperparameter: Hyperparameter,
        distribution: Option<Distribution>,
    ) -> Result<usize> {
        let index = self.context.add(hyperparameter)?;
        self.distributions.push(distribution);
        self.conditions.push(None);
        self.topo_order = self.toposort()?;
        Ok(index)
    }

    /// The sampling distribution of the hyperparameter at `index`, if it has
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the index is past the collection.
    pub fn distribution(&self, index: usize) -> Result<Option<&Distribution>> {
        self.distributions
            .get(index)
            .map(Option::as_ref)
            .ok_or(Error::OutOfBounds {
                index,
                len: self.distributions.len(),
            })
    }

    /// Sets the activation condition of the hyperparameter at `index`. The
    /// hyperparameter is active only when the condition evaluates to true.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for an unknown index or a condition
    /// referencing one, [`Error::InvalidCondition`] when a condition is
    /// already set or the expression cannot yield a boolean, and
    /// [`Error::InvalidGraph`] when the condition would close a dependency
    /// cycle.
    pub fn set_condition(&mut self, index: usize, condition: Expression) -> Result<()> {
        condition.check_context(&self.context)?;
        if !condition.is_boolean() {
            return Err(Error::InvalidCondition(
                "condition must be a boolean expression",
            ));
        }
        let slot = self
            .conditions
            .get_mut(index)
            .ok_or(Error::OutOfBounds {
                index,
                len: self.context.len(),
            })?;
        if slot.is_some() {
            return Err(Error::InvalidCondition(
                "a condition is already set for this hyperparameter",
            ));
        }
        *slot = Some(condition);
        match self.toposort() {
            Ok(order) => {
                self.topo_order = order;
                Ok(())
            }
            Err(err) => {
                self.conditions[index] = None;
                Err(err)
            }
        }
    }

    /// The activation condition of the hyperparameter at `index`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the index is past the collection.
    pub fn condition(&self, index: usize) -> Result<Option<&Expression>> {
        self.conditions
            .get(index)
            .map(Option::as_ref)
            .ok_or(Error::OutOfBounds {
                index,
                len: self.conditions.len(),
            })
    }

    /// All activation conditions, indexed like the hyperparameters.
    #[must_use]
    pub fn conditions(&self) -> &[Option<Expression>] {
        &self.conditions
    }

    /// Adds a forbidden clause; bindings where the clause evaluates to true
    /// are rejected at sampling time and fail validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] when the clause references a
    /// hyperparameter outside the space, and [`Error::InvalidExpression`]
    /// when the clause cannot yield a boolean.
    pub fn add_forbidden_clause(&mut self, clause: Expression) -> Result<()> {
        clause.check_context(&self.context)?;
        if !clause.is_boolean() {
            return Err(Error::InvalidExpression(
                "forbidden clause must be a boolean expression",
            ));
        }
        self.forbidden.push(clause);
        Ok(())
    }

    /// The forbidden clauses, in insertion order.
    #[must_use]
    pub fn forbidden_clauses(&self) -> &[Expression] {
        &self.forbidden
    }

    /// Kahn's algorithm over condition dependencies, preferring insertion
    /// order among ready hyperparameters.
    fn toposort(&self) -> Result<Vec<usize>> {
        let n = self.context.len();
        let mut indegree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (index, condition) in self.conditions.iter().enumerate() {
            if let Some(condition) = condition {
                for parent in condition.variables() {
                    indegree[index] += 1;
                    dependents[parent].push(index);
                }
            }
        }
        let mut order = Vec::with_capacity(n);
        let mut placed = vec![false; n];
        while order.len() < n {
            let Some(next) = (0..n).find(|&i| !placed[i] && indegree[i] == 0) else {
                return Err(Error::InvalidGraph);
            };
            placed[next] = true;
            order.push(next);
            for &child in &dependents[next] {
                indegree[child] -= 1;
            }
        }
        Ok(order)
    }

    /// Whether the hyperparameter at `index` is active under `values`. A
    /// condition that fails on an inactive parent counts as false.
    fn is_active(&self, index: usize, values: &[Datum]) -> Result<bool> {
        match &self.conditions[index] {
            None => Ok(true),
            Some(condition) => match condition.eval_truthy(&self.context, values) {
                Ok(active) => Ok(active),
                Err(Error::InactiveHyperparameter(_)) => Ok(false),
                Err(err) => Err(err),
            },
        }
    }

    /// Whether any forbidden clause matches `values`. A clause that fails on
    /// an inactive hyperparameter counts as not triggered.
    pub(crate) fn is_forbidden(&self, values: &[Datum]) -> Result<bool> {
        for clause in &self.forbidden {
            match clause.eval_truthy(&self.context, values) {
                Ok(true) => return Ok(true),
                Ok(false) | Err(Error::InactiveHyperparameter(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    /// The default binding: every active hyperparameter takes its default
    /// value, resolved in dependency order.
    ///
    /// # Errors
    ///
    /// Propagates condition evaluation failures.
    pub fn default_values(&self) -> Result<Vec<Datum>> {
        let mut values = vec![Datum::Inactive; self.context.len()];
        for &index in &self.topo_order {
            if self.is_active(index, &values)? {
                values[index] = self.context.get(index)?.default();
            }
        }
        Ok(values)
    }

    /// Draws one binding: hyperparameters are resolved in dependency order,
    /// inactive slots take the inactive marker, and complete bindings are
    /// rejected while any forbidden clause matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SamplingUnsuccessful`] when the rejection budget is
    /// exhausted, and [`Error::UnsupportedOperation`] when the space holds a
    /// string hyperparameter.
    pub fn sample_values(&self) -> Result<Vec<Datum>> {
        let mut rng = self.rng.lock();
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let mut values = vec![Datum::Inactive; self.context.len()];
            for &index in &self.topo_order {
                if self.is_active(index, &values)? {
                    let distribution = self.distributions[index].as_ref().ok_or(
                        Error::UnsupportedOperation("string hyperparameters cannot be sampled"),
                    )?;
                    values[index] = self.context.get(index)?.sample(distribution, &mut rng)?;
                }
            }
            if !self.is_forbidden(&values)? {
                return Ok(values);
            }
        }
        trace_debug!(space = %self.name, "rejection sampling budget exhausted");
        Err(Error::SamplingUnsuccessful)
    }

    /// Draws `n` bindings, observably equivalent to `n` calls to
    /// [`ConfigurationSpace::sample_values`].
    ///
    /// # Errors
    ///
    /// Propagates the first sampling failure.
    pub fn samples_values(&self, n: usize) -> Result<Vec<Vec<Datum>>> {
        (0..n).map(|_| self.sample_values()).collect()
    }

    /// Validates a binding against the space: recomputes the expected
    /// activation, checks each active value against its domain, and checks
    /// the forbidden clauses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InactiveHyperparameter`] when a value is supplied
    /// for a hyperparameter the conditions deactivate, and
    /// [`Error::InvalidConfiguration`] for a wrong-length binding, a missing
    /// active value, an out-of-domain value, or a matched forbidden clause.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidConfiguration(
                "binding length does not match the space",
            ));
        }
        for &index in &self.topo_order {
            let hyperparameter = self.context.get(index)?;
            let value = &values[index];
            if self.is_active(index, values)? {
                if value.is_inactive() {
                    return Err(Error::InvalidConfiguration(
                        "missing value for an active hyperparameter",
                    ));
                }
                if !hyperparameter.check_value(value) {
                    return Err(Error::InvalidConfiguration(
                        "value lies outside its hyperparameter domain",
                    ));
                }
            } else if !value.is_inactive() {
                return Err(Error::InactiveHyperparameter(
                    hyperparameter.name().to_string(),
                ));
            }
        }
        if self.is_forbidden(values)? {
            return Err(Error::InvalidConfiguration(
                "binding matches a forbidden clause",
            ));
        }
        Ok(())
    }
}

/// Spaces compare by identity; two spaces are the same space only when they
/// are the same allocation.
pub(crate) fn same_space<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}
