//! Feature spaces: unconditioned contexts describing the tuning environment.
//!
//! Features describe the fixed circumstances of an evaluation, such as the
//! machine or dataset it ran on, so that results obtained under different
//! circumstances are never compared against each other.

use std::sync::Arc;

use crate::context::Context;
use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::hyperparameter::Hyperparameter;

/// A plain hyperparameter context, with no conditions or forbidden clauses.
#[derive(Clone, Debug, Default)]
pub struct FeaturesSpace {
    name: String,
    context: Context,
}

impl FeaturesSpace {
    /// Creates an empty features space.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Context::new(),
        }
    }

    /// The space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The number of feature variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// True when the space holds no feature variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Appends a feature variable and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHyperparameter`] if the name is taken.
    pub fn add_hyperparameter(&mut self, hyperparameter: Hyperparameter) -> Result<usize> {
        self.context.add(hyperparameter)
    }

    /// The index of the feature variable named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHyperparameter`] if no such name exists.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.context.index_of(name)
    }

    /// Validates one value per feature variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatures`] for a wrong-length binding or a
    /// value outside its variable's domain.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidFeatures(
                "binding length does not match the features space",
            ));
        }
        for (hyperparameter, value) in self.context.iter().zip(values) {
            if value.is_inactive() || !hyperparameter.check_value(value) {
                return Err(Error::InvalidFeatures(
                    "value lies outside its feature variable's domain",
                ));
            }
        }
        Ok(())
    }
}

/// An immutable binding of one value per feature variable.
#[derive(Clone, Debug)]
pub struct Features {
    space: Arc<FeaturesSpace>,
    values: Vec<Datum>,
}

impl Features {
    /// Wraps explicit values after validating them against the space.
    ///
    /// # Errors
    ///
    /// Propagates the validation failures of
    /// [`FeaturesSpace::check_values`].
    pub fn new(space: Arc<FeaturesSpace>, values: Vec<Datum>) -> Result<Self> {
        space.check_values(&values)?;
        Ok(Self { space, values })
    }

    /// The space these features are bound to.
    #[must_use]
    pub fn space(&self) -> &Arc<FeaturesSpace> {
        &self.space
    }

    /// All values, indexed like the space's feature variables.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// The value of the feature variable named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHyperparameter`] if no such name exists.
    pub fn value_by_name(&self, name: &str) -> Result<&Datum> {
        Ok(&self.values[self.space.index_of(name)?])
    }
}

/// Features compare structurally over their values, so that bindings built
/// independently for the same circumstances land in the same partition.
impl PartialEq for Features {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
