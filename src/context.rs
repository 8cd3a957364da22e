//! Ordered, name-indexed hyperparameter collections.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::hyperparameter::Hyperparameter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An insertion-ordered collection of hyperparameters with O(1) lookup by
/// name and by index. Indices are stable for the context's lifetime.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Context {
    hyperparameters: Vec<Hyperparameter>,
    indices: HashMap<String, usize>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hyperparameter and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHyperparameter`] if the name is taken.
    pub fn add(&mut self, hyperparameter: Hyperparameter) -> Result<usize> {
        let name = hyperparameter.name().to_string();
        if self.indices.contains_key(&name) {
            return Err(Error::DuplicateHyperparameter(name));
        }
        let index = self.hyperparameters.len();
        self.indices.insert(name, index);
        self.hyperparameters.push(hyperparameter);
        Ok(index)
    }

    /// The number of hyperparameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hyperparameters.len()
    }

    /// True when the context holds no hyperparameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hyperparameters.is_empty()
    }

    /// The hyperparameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the index is past the collection.
    pub fn get(&self, index: usize) -> Result<&Hyperparameter> {
        self.hyperparameters.get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.hyperparameters.len(),
        })
    }

    /// The index of the hyperparameter named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHyperparameter`] if no such name exists.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownHyperparameter(name.to_string()))
    }

    /// Iterates over the hyperparameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Hyperparameter> {
        self.hyperparameters.iter()
    }
}
