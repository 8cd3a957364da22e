//! Configurations: value bindings over a shared configuration space.

use std::sync::Arc;

use crate::configuration_space::{same_space, ConfigurationSpace};
use crate::datum::Datum;
use crate::error::Result;

/// An immutable binding of one value per hyperparameter of a space.
#[derive(Clone, Debug)]
pub struct Configuration {
    space: Arc<ConfigurationSpace>,
    values: Vec<Datum>,
}

impl Configuration {
    /// Wraps explicit values after validating them against the space.
    ///
    /// # Errors
    ///
    /// Propagates the validation failures of
    /// [`ConfigurationSpace::check_values`].
    pub fn new(space: Arc<ConfigurationSpace>, values: Vec<Datum>) -> Result<Self> {
        space.check_values(&values)?;
        Ok(Self { space, values })
    }

    /// Draws one configuration from the space.
    ///
    /// # Errors
    ///
    /// Propagates the sampling failures of
    /// [`ConfigurationSpace::sample_values`].
    pub fn sample(space: &Arc<ConfigurationSpace>) -> Result<Self> {
        let values = space.sample_values()?;
        Ok(Self {
            space: Arc::clone(space),
            values,
        })
    }

    /// Draws `n` configurations from the space.
    ///
    /// # Errors
    ///
    /// Propagates the first sampling failure.
    pub fn samples(space: &Arc<ConfigurationSpace>, n: usize) -> Result<Vec<Self>> {
        (0..n).map(|_| Self::sample(space)).collect()
    }

    /// The default configuration of the space.
    ///
    /// # Errors
    ///
    /// Propagates condition evaluation failures.
    pub fn default_of(space: &Arc<ConfigurationSpace>) -> Result<Self> {
        let values = space.default_values()?;
        Ok(Self {
            space: Arc::clone(space),
            values,
        })
    }

    /// The space this configuration is bound to.
    #[must_use]
    pub fn space(&self) -> &Arc<ConfigurationSpace> {
        &self.space
    }

    /// All values, indexed like the space's hyperparameters.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// The value of the hyperparameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the index is past the space.
    pub fn value(&self, index: usize) -> Result<&Datum> {
        self.space.hyperparameter(index)?;
        Ok(&self.values[index])
    }

    /// The value of the hyperparameter named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownHyperparameter`] if no such name
    /// exists.
    pub fn value_by_name(&self, name: &str) -> Result<&Datum> {
        Ok(&self.values[self.space.index_of(name)?])
    }

    /// Revalidates the binding against its space.
    ///
    /// # Errors
    ///
    /// Propagates the validation failures of
    /// [`ConfigurationSpace::check_values`].
    pub fn check(&self) -> Result<()> {
        self.space.check_values(&self.values)
    }
}

/// Configurations are equal when they bind the same values over the same
/// space allocation.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        same_space(&self.space, &other.space) && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::expression::Expression;
    use crate::hyperparameter::Hyperparameter;

    fn space() -> Arc<ConfigurationSpace> {
        let mut space = ConfigurationSpace::with_seed("cs", 3);
        let a = space
            .add_hyperparameter(Hyperparameter::categorical(
                "a",
                vec![Datum::Bool(false), Datum::Bool(true)],
            )
            .unwrap())
            .unwrap();
        let b = space
            .add_hyperparameter(Hyperparameter::float("b", 0.0, 1.0).unwrap())
            .unwrap();
        space
            .set_condition(
                b,
                Expression::variable(a).equal(Expression::literal(true)),
            )
            .unwrap();
        Arc::new(space)
    }

    #[test]
    fn sampled_configurations_validate() {
        let space = space();
        for _ in 0..100 {
            let config = Configuration::sample(&space).unwrap();
            config.check().unwrap();
            assert!(same_space(config.space(), &space));
        }
    }

    #[test]
    fn explicit_values_are_validated() {
        let space = space();
        let config =
            Configuration::new(Arc::clone(&space), vec![Datum::Bool(true), Datum::Float(0.5)])
                .unwrap();
        assert_eq!(config.value_by_name("b").unwrap(), &Datum::Float(0.5));
        assert!(matches!(
            Configuration::new(Arc::clone(&space), vec![Datum::Bool(false), Datum::Float(0.5)]),
            Err(Error::InactiveHyperparameter(_))
        ));
    }

    #[test]
    fn equality_requires_the_same_space_allocation() {
        let values = vec![Datum::Bool(false), Datum::Inactive];
        let one = Configuration::new(space(), values.clone()).unwrap();
        let other_space = Configuration::new(space(), values.clone()).unwrap();
        let same = Configuration::new(Arc::clone(one.space()), values).unwrap();
        assert_eq!(one, same);
        assert_ne!(one, other_space);
    }

    #[test]
    fn default_configuration() {
        let config = Configuration::default_of(&space()).unwrap();
        assert_eq!(config.values(), &[Datum::Bool(false), Datum::Inactive]);
        config.check().unwrap();
    }
}
