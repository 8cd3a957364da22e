//! Tagged value types flowing through configuration and objective spaces.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The numeric kind a distribution or numerical hyperparameter produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericKind {
    /// 64-bit signed integers.
    Int,
    /// 64-bit floats.
    Float,
}

/// A raw numeric value used in sampling hot paths, where the expected kind
/// is already fixed by the producing distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Numeric {
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
}

impl Numeric {
    /// Returns the kind tag of this value.
    #[must_use]
    pub fn kind(self) -> NumericKind {
        match self {
            Numeric::Int(_) => NumericKind::Int,
            Numeric::Float(_) => NumericKind::Float,
        }
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Numeric::Int(i) => Some(i),
            Numeric::Float(_) => None,
        }
    }
}

impl From<Numeric> for Datum {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Int(i) => Datum::Int(i),
            Numeric::Float(f) => Datum::Float(f),
        }
    }
}

/// A tagged scalar value.
///
/// `Datum` is the unit of exchange for hyperparameter values, expression
/// results, and objective values. The `Inactive` marker denotes a slot that
/// the activation conditions have switched off; it is distinct from `None`,
/// which is an ordinary null value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Datum {
    /// The null value.
    None,
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A string value.
    Str(String),
    /// Marker for a hyperparameter deactivated by its condition.
    Inactive,
    /// An opaque handle to an externally managed object. Participates only
    /// in equality.
    Object(u64),
}

impl Datum {
    /// Returns `true` for the `Inactive` marker.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Datum::Inactive)
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(i) => Some(*i as f64),
            Datum::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is numeric.
    #[must_use]
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Datum::Int(i) => Some(Numeric::Int(*i)),
            Datum::Float(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    /// A short name for the tag, used in error reports.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::None => "none",
            Datum::Int(_) => "integer",
            Datum::Float(_) => "float",
            Datum::Bool(_) => "boolean",
            Datum::Str(_) => "string",
            Datum::Inactive => "inactive",
            Datum::Object(_) => "object",
        }
    }

    /// Orders two data when an order exists.
    ///
    /// Numeric values compare across kinds (integers widen to floats),
    /// strings compare lexicographically. All other pairings, NaN included,
    /// have no order and return `None`.
    #[must_use]
    pub fn try_cmp(&self, other: &Datum) -> Option<Ordering> {
        match (self, other) {
            (Datum::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
            (Datum::Str(a), Datum::Str(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b)
            }
        }
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Int(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Float(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Str(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_widening() {
        assert_eq!(Numeric::Int(3).as_f64(), 3.0);
        assert_eq!(Numeric::Int(3).kind(), NumericKind::Int);
        assert_eq!(Datum::from(Numeric::Float(0.5)), Datum::Float(0.5));
    }

    #[test]
    fn cross_kind_comparison() {
        assert_eq!(
            Datum::Int(2).try_cmp(&Datum::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Datum::Float(2.0).try_cmp(&Datum::Int(2)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn string_comparison() {
        assert_eq!(
            Datum::from("abc").try_cmp(&Datum::from("abd")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn incomparable_pairs() {
        assert_eq!(Datum::Bool(true).try_cmp(&Datum::Int(1)), None);
        assert_eq!(Datum::from("a").try_cmp(&Datum::Int(1)), None);
        assert_eq!(Datum::Float(f64::NAN).try_cmp(&Datum::Float(0.0)), None);
        assert_eq!(Datum::Inactive.try_cmp(&Datum::Inactive), None);
    }

    #[test]
    fn inactive_is_distinguishable() {
        assert_eq!(Datum::Inactive, Datum::Inactive);
        assert_ne!(Datum::Inactive, Datum::None);
        assert!(Datum::Inactive.is_inactive());
        assert!(!Datum::None.is_inactive());
    }
}
