//! Core types shared across the crate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The direction of an objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Smaller objective values are better.
    Minimize,
    /// Larger objective values are better.
    Maximize,
}

impl Direction {
    /// Maps a raw `lhs` vs `rhs` ordering to a preference ordering where
    /// `Less` always means "lhs is better".
    pub(crate) fn prefer(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            Direction::Minimize => ordering,
            Direction::Maximize => ordering.reverse(),
        }
    }
}

/// The result of comparing two evaluations for Pareto dominance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    /// The first evaluation dominates the second.
    Better,
    /// The two evaluations have equal objective values.
    Equivalent,
    /// The second evaluation dominates the first.
    Worse,
    /// Neither evaluation dominates the other.
    NotComparable,
}
