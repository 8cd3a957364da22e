//! Hyperparameter definitions.
//!
//! A [`Hyperparameter`] is an immutable named variable with a typed domain:
//!
//! | Domain | Values | Ordered | Sampleable |
//! |---|---|---|---|
//! | Numerical | integers or floats in `[lower, upper]` | yes | yes |
//! | Categorical | a finite list of distinct data | no | yes |
//! | Ordinal | a finite list, ordered by position | yes | yes |
//! | Discrete | a finite list of distinct numerics | no | yes |
//! | String | any string | no | no |

use core::cmp::Ordering;

use crate::datum::{Datum, Numeric, NumericKind};
use crate::distribution::{Distribution, Interval};
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Retry budget for rejecting out-of-domain draws. A distribution is allowed
/// to put most of its mass outside the domain, so this is far larger than
/// the per-distribution truncation budget.
const MAX_REJECTION_ATTEMPTS: usize = 10_000;

/// The domain of a hyperparameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Domain {
    /// A bounded numeric range, optionally quantized on a grid anchored at
    /// the lower bound.
    Numerical {
        /// The numeric kind of the range.
        kind: NumericKind,
        /// Lower bound (inclusive).
        lower: Numeric,
        /// Upper bound (inclusive).
        upper: Numeric,
        /// Optional grid spacing; admitted values are `lower + k * q`.
        quantization: Option<f64>,
        /// The default value.
        default: Numeric,
    },
    /// An unordered list of distinct values.
    Categorical {
        /// The admitted values.
        values: Vec<Datum>,
        /// Index of the default value.
        default_index: usize,
    },
    /// A list of distinct values totally ordered by position.
    Ordinal {
        /// The admitted values, weakest first.
        values: Vec<Datum>,
        /// Index of the default value.
        default_index: usize,
    },
    /// An unordered list of distinct numeric values.
    Discrete {
        /// The admitted values.
        values: Vec<Numeric>,
        /// Index of the default value.
        default_index: usize,
    },
    /// Any string value. Not enumerable and not sampleable.
    String,
}

/// A named, immutable tuning variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hyperparameter {
    name: String,
    domain: Domain,
}

impl Hyperparameter {
    /// Creates a float hyperparameter over `[lower, upper]` with the lower
    /// bound as default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if the bounds are not finite or
    /// `lower >= upper`.
    pub fn float(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(Error::InvalidBounds { lower, upper });
        }
        Ok(Self {
            name: name.into(),
            domain: Domain::Numerical {
                kind: NumericKind::Float,
                lower: Numeric::Float(lower),
                upper: Numeric::Float(upper),
                quantization: None,
                default: Numeric::Float(lower),
            },
        })
    }

    /// Creates an integer hyperparameter over `[lower, upper]` with the
    /// lower bound as default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    #[allow(clippy::cast_precision_loss)]
    pub fn int(name: impl Into<String>, lower: i64, upper: i64) -> Result<Self> {
        if lower >= upper {
            return Err(Error::InvalidBounds {
                lower: lower as f64,
                upper: upper as f64,
            });
        }
        Ok(Self {
            name: name.into(),
            domain: Domain::Numerical {
                kind: NumericKind::Int,
                lower: Numeric::Int(lower),
                upper: Numeric::Int(upper),
                quantization: None,
                default: Numeric::Int(lower),
            },
        })
    }

    /// Creates a categorical hyperparameter with the first value as default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] if `values` is empty,
    /// contains duplicates, or contains the inactive marker.
    pub fn categorical(name: impl Into<String>, values: Vec<Datum>) -> Result<Self> {
        let name = name.into();
        check_listed_values(&name, &values)?;
        Ok(Self {
            name,
            domain: Domain::Categorical {
                values,
                default_index: 0,
            },
        })
    }

    /// Creates an ordinal hyperparameter ordered by list position, weakest
    /// first, with the first value as default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] if `values` is empty,
    /// contains duplicates, or contains the inactive marker.
    pub fn ordinal(name: impl Into<String>, values: Vec<Datum>) -> Result<Self> {
        let name = name.into();
        check_listed_values(&name, &values)?;
        Ok(Self {
            name,
            domain: Domain::Ordinal {
                values,
                default_index: 0,
            },
        })
    }

    /// Creates a discrete hyperparameter over distinct numeric values with
    /// the first value as default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] if `values` is empty or
    /// contains duplicates.
    pub fn discrete(name: impl Into<String>, values: Vec<Numeric>) -> Result<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(Error::InvalidHyperparameter {
                name,
                reason: "value list must not be empty",
            });
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(Error::InvalidHyperparameter {
                    name,
                    reason: "values must be distinct",
                });
            }
        }
        Ok(Self {
            name,
            domain: Domain::Discrete {
                values,
                default_index: 0,
            },
        })
    }

    /// Creates a string hyperparameter accepting any string value.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Domain::String,
        }
    }

    /// Sets the quantization of a numerical hyperparameter. Admitted values
    /// snap to the grid `lower + k * q`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuantization`] if `q` is not strictly
    /// positive, exceeds the bound span, or is fractional on an integer
    /// domain, and [`Error::UnsupportedOperation`] on non-numerical domains.
    #[allow(clippy::float_cmp)]
    pub fn quantization(mut self, q: f64) -> Result<Self> {
        match &mut self.domain {
            Domain::Numerical {
                kind,
                lower,
                upper,
                quantization,
                ..
            } => {
                if !q.is_finite() || q <= 0.0 || q > upper.as_f64() - lower.as_f64() {
                    return Err(Error::InvalidQuantization(q));
                }
                if *kind == NumericKind::Int && q.fract() != 0.0 {
                    return Err(Error::InvalidQuantization(q));
                }
                *quantization = Some(q);
                Ok(self)
            }
            _ => Err(Error::UnsupportedOperation(
                "only numerical hyperparameters support quantization",
            )),
        }
    }

    /// Sets the default of a numerical hyperparameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] if the value has the wrong
    /// kind or lies outside the domain, and [`Error::UnsupportedOperation`]
    /// on non-numerical domains (use [`Hyperparameter::default_index`]).
    pub fn default_value(mut self, value: Numeric) -> Result<Self> {
        if !matches!(self.domain, Domain::Numerical { .. }) {
            return Err(Error::UnsupportedOperation(
                "only numerical hyperparameters take a default value",
            ));
        }
        if !self.check_value(&value.into()) {
            return Err(Error::InvalidHyperparameter {
                name: self.name,
                reason: "default value lies outside the domain",
            });
        }
        if let Domain::Numerical { default, .. } = &mut self.domain {
            *default = value;
        }
        Ok(self)
    }

    /// Sets the default of an enumerated hyperparameter by index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the index is past the value list,
    /// and [`Error::UnsupportedOperation`] on non-enumerated domains.
    pub fn default_index(mut self, index: usize) -> Result<Self> {
        let (len, slot) = match &mut self.domain {
            Domain::Categorical {
                values,
                default_index,
            }
            | Domain::Ordinal {
                values,
                default_index,
            } => (values.len(), default_index),
            Domain::Discrete {
                values,
                default_index,
            } => (values.len(), default_index),
            _ => {
                return Err(Error::UnsupportedOperation(
                    "only enumerated hyperparameters take a default index",
                ));
            }
        };
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
        *slot = index;
        Ok(self)
    }

    /// The hyperparameter's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hyperparameter's domain.
    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// True for ordinal hyperparameters, whose values are totally ordered.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        matches!(self.domain, Domain::Ordinal { .. })
    }

    /// The default value of this hyperparameter.
    #[must_use]
    pub fn default(&self) -> Datum {
        match &self.domain {
            Domain::Numerical { default, .. } => (*default).into(),
            Domain::Categorical {
                values,
                default_index,
            }
            | Domain::Ordinal {
                values,
                default_index,
            } => values[*default_index].clone(),
            Domain::Discrete {
                values,
                default_index,
            } => values[*default_index].into(),
            Domain::String => Datum::Str(String::new()),
        }
    }

    /// Tests whether a value belongs to the domain. The inactive marker is
    /// always admitted; activation is checked at the configuration level.
    #[must_use]
    pub fn check_value(&self, value: &Datum) -> bool {
        if value.is_inactive() {
            return true;
        }
        match &self.domain {
            Domain::Numerical {
                kind,
                lower,
                upper,
                quantization,
                ..
            } => {
                let Some(v) = value.as_numeric() else {
                    return false;
                };
                if v.kind() != *kind {
                    return false;
                }
                let (v, lo, hi) = (v.as_f64(), lower.as_f64(), upper.as_f64());
                if v < lo || v > hi {
                    return false;
                }
                match quantization {
                    Some(q) => on_grid(v, lo, *q),
                    None => true,
                }
            }
            Domain::Categorical { values, .. } | Domain::Ordinal { values, .. } => {
                values.contains(value)
            }
            Domain::Discrete { values, .. } => value
                .as_numeric()
                .is_some_and(|v| values.contains(&v)),
            Domain::String => matches!(value, Datum::Str(_)),
        }
    }

    /// Orders two values of an ordinal hyperparameter by list position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if either value is not in the value
    /// list, and [`Error::UnsupportedOperation`] on non-ordinal domains.
    pub fn compare_values(&self, a: &Datum, b: &Datum) -> Result<Ordering> {
        let Domain::Ordinal { values, .. } = &self.domain else {
            return Err(Error::UnsupportedOperation(
                "only ordinal hyperparameters define an ordering",
            ));
        };
        let position = |v: &Datum| {
            values
                .iter()
                .position(|candidate| candidate == v)
                .ok_or(Error::InvalidValue("value is not in the ordinal list"))
        };
        Ok(position(a)?.cmp(&position(b)?))
    }

    /// The default sampling distribution: uniform over the numerical bounds
    /// (quantization included), or an equal-area roulette over the value
    /// list of an enumerated domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for string hyperparameters.
    pub fn default_distribution(&self) -> Result<Distribution> {
        match &self.domain {
            Domain::Numerical {
                lower,
                upper,
                quantization,
                ..
            } => {
                let dist = match (*lower, *upper) {
                    (Numeric::Int(lo), Numeric::Int(hi)) => Distribution::uniform_int(lo, hi)?,
                    (lo, hi) => Distribution::uniform_float(lo.as_f64(), hi.as_f64())?,
                };
                match quantization {
                    Some(q) => dist.quantization(*q),
                    None => Ok(dist),
                }
            }
            Domain::Categorical { values, .. } | Domain::Ordinal { values, .. } => {
                Distribution::roulette(vec![1.0; values.len()])
            }
            Domain::Discrete { values, .. } => Distribution::roulette(vec![1.0; values.len()]),
            Domain::String => Err(Error::UnsupportedOperation(
                "string hyperparameters cannot be sampled",
            )),
        }
    }

    /// The interval draws must land in: the numerical bounds, or the index
    /// range of an enumerated value list.
    pub(crate) fn sampling_interval(&self) -> Result<Interval> {
        match &self.domain {
            Domain::Numerical {
                kind, lower, upper, ..
            } => Ok(Interval {
                kind: *kind,
                lower: lower.as_f64(),
                upper: upper.as_f64(),
                lower_included: true,
                upper_included: true,
            }),
            Domain::Categorical { values, .. } | Domain::Ordinal { values, .. } => {
                Ok(index_interval(values.len()))
            }
            Domain::Discrete { values, .. } => Ok(index_interval(values.len())),
            Domain::String => Err(Error::UnsupportedOperation(
                "string hyperparameters cannot be sampled",
            )),
        }
    }

    /// Draws one value from the domain through `dist`.
    ///
    /// Numerical domains require a distribution of matching kind; draws are
    /// rejected until they fall inside the bounds when the distribution
    /// oversamples them, and snap onto the grid of a quantized domain.
    /// Enumerated domains map the draw to a list index by flooring and
    /// clamping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] on a kind mismatch,
    /// [`Error::SamplingUnsuccessful`] when rejection exhausts its retry
    /// budget, and [`Error::UnsupportedOperation`] for string domains.
    pub fn sample(&self, dist: &Distribution, rng: &mut fastrand::Rng) -> Result<Datum> {
        match &self.domain {
            Domain::Numerical {
                kind,
                lower,
                upper,
                quantization,
                ..
            } => {
                if dist.kind() != *kind {
                    return Err(Error::InvalidValue(
                        "distribution kind does not match the numerical domain",
                    ));
                }
                let interval = self.sampling_interval()?;
                let mut draw = if dist.oversamples(&interval) {
                    let mut accepted = None;
                    for _ in 0..MAX_REJECTION_ATTEMPTS {
                        let candidate = dist.sample(rng)?;
                        if interval.contains(candidate) {
                            accepted = Some(candidate);
                            break;
                        }
                    }
                    accepted.ok_or(Error::SamplingUnsuccessful)?
                } else {
                    dist.sample(rng)?
                };
                if let Some(q) = quantization {
                    draw = snap_to_grid(draw, lower.as_f64(), upper.as_f64(), *q);
                }
                Ok(draw.into())
            }
            Domain::Categorical { values, .. } | Domain::Ordinal { values, .. } => {
                let index = draw_index(dist, rng, values.len())?;
                Ok(values[index].clone())
            }
            Domain::Discrete { values, .. } => {
                let index = draw_index(dist, rng, values.len())?;
                Ok(values[index].into())
            }
            Domain::String => Err(Error::UnsupportedOperation(
                "string hyperparameters cannot be sampled",
            )),
        }
    }

    /// Draws `n` values, observably equivalent to `n` calls to
    /// [`Hyperparameter::sample`].
    ///
    /// # Errors
    ///
    /// Propagates the first sampling failure.
    pub fn samples(
        &self,
        dist: &Distribution,
        rng: &mut fastrand::Rng,
        n: usize,
    ) -> Result<Vec<Datum>> {
        (0..n).map(|_| self.sample(dist, rng)).collect()
    }
}

fn check_listed_values(name: &str, values: &[Datum]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidHyperparameter {
            name: name.to_string(),
            reason: "value list must not be empty",
        });
    }
    for (i, v) in values.iter().enumerate() {
        if v.is_inactive() {
            return Err(Error::InvalidHyperparameter {
                name: name.to_string(),
                reason: "values must not be the inactive marker",
            });
        }
        if values[..i].contains(v) {
            return Err(Error::InvalidHyperparameter {
                name: name.to_string(),
                reason: "values must be distinct",
            });
        }
    }
    Ok(())
}

/// Snaps an in-bounds draw onto the grid `lower + k * q`, with `k` clamped
/// so the result never leaves the bounds.
#[allow(clippy::cast_possible_truncation)]
fn snap_to_grid(draw: Numeric, lower: f64, upper: f64, q: f64) -> Numeric {
    let steps = ((upper - lower) / q).floor();
    let k = ((draw.as_f64() - lower) / q).round().clamp(0.0, steps);
    let v = lower + k * q;
    match draw {
        Numeric::Int(_) => Numeric::Int(v.round() as i64),
        Numeric::Float(_) => Numeric::Float(v),
    }
}

fn on_grid(v: f64, lower: f64, q: f64) -> bool {
    let steps = ((v - lower) / q).round();
    (lower + steps * q - v).abs() <= q * 1e-9
}

#[allow(clippy::cast_precision_loss)]
fn index_interval(len: usize) -> Interval {
    Interval {
        kind: NumericKind::Int,
        lower: 0.0,
        upper: len as f64,
        lower_included: true,
        upper_included: false,
    }
}

/// Maps a numeric draw onto a value-list index by flooring, clamped into
/// range so off-grid distributions still yield a valid index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_index(dist: &Distribution, rng: &mut fastrand::Rng, len: usize) -> Result<usize> {
    let draw = dist.sample(rng)?;
    let index = draw.as_f64().floor().clamp(0.0, (len - 1) as f64) as usize;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    #[test]
    fn float_domain_checks() {
        let hp = Hyperparameter::float("x", -1.0, 1.0).unwrap();
        assert!(hp.check_value(&Datum::Float(0.0)));
        assert!(hp.check_value(&Datum::Float(1.0)));
        assert!(!hp.check_value(&Datum::Float(1.5)));
        assert!(!hp.check_value(&Datum::Int(0)));
        assert!(hp.check_value(&Datum::Inactive));
    }

    #[test]
    fn int_quantization_grid() {
        let hp = Hyperparameter::int("n", 0, 10)
            .unwrap()
            .quantization(3.0)
            .unwrap();
        assert!(hp.check_value(&Datum::Int(9)));
        assert!(!hp.check_value(&Datum::Int(10)));
        assert!(!hp.check_value(&Datum::Int(2)));
        let dist = hp.default_distribution().unwrap();
        let mut rng = rng();
        for _ in 0..10_000 {
            let v = hp.sample(&dist, &mut rng).unwrap();
            let Datum::Int(v) = v else { panic!("kind") };
            assert!([0, 3, 6, 9].contains(&v), "unexpected {v}");
        }
    }

    #[test]
    fn rejects_bad_definitions() {
        assert!(Hyperparameter::float("x", 1.0, 1.0).is_err());
        assert!(Hyperparameter::int("n", 5, -5).is_err());
        assert!(Hyperparameter::float("x", 0.0, 1.0)
            .unwrap()
            .quantization(2.0)
            .is_err());
        assert!(Hyperparameter::categorical("c", vec![]).is_err());
        assert!(Hyperparameter::categorical(
            "c",
            vec![Datum::from("a"), Datum::from("a")]
        )
        .is_err());
        assert!(Hyperparameter::float("x", 0.0, 1.0)
            .unwrap()
            .default_value(Numeric::Float(2.0))
            .is_err());
    }

    #[test]
    fn categorical_sampling_covers_values() {
        let hp = Hyperparameter::categorical(
            "c",
            vec![Datum::from("a"), Datum::from("b"), Datum::from("c")],
        )
        .unwrap();
        let dist = hp.default_distribution().unwrap();
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let v = hp.sample(&dist, &mut rng).unwrap();
            assert!(hp.check_value(&v));
            if let Datum::Str(s) = v {
                seen.insert(s);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn ordinal_ordering() {
        let hp = Hyperparameter::ordinal(
            "size",
            vec![Datum::from("small"), Datum::from("medium"), Datum::from("large")],
        )
        .unwrap();
        assert!(hp.is_ordered());
        assert_eq!(
            hp.compare_values(&Datum::from("small"), &Datum::from("large"))
                .unwrap(),
            Ordering::Less
        );
        assert!(hp
            .compare_values(&Datum::from("tiny"), &Datum::from("large"))
            .is_err());
        let flat = Hyperparameter::categorical("c", vec![Datum::from("a")]).unwrap();
        assert!(flat
            .compare_values(&Datum::from("a"), &Datum::from("a"))
            .is_err());
    }

    #[test]
    fn discrete_values_are_kind_exact() {
        let hp =
            Hyperparameter::discrete("d", vec![Numeric::Int(1), Numeric::Int(4)]).unwrap();
        assert!(hp.check_value(&Datum::Int(4)));
        assert!(!hp.check_value(&Datum::Float(4.0)));
        assert!(!hp.check_value(&Datum::Int(2)));
    }

    #[test]
    fn string_domain() {
        let hp = Hyperparameter::string("s");
        assert!(hp.check_value(&Datum::from("anything")));
        assert!(!hp.check_value(&Datum::Int(1)));
        assert!(matches!(
            hp.default_distribution(),
            Err(Error::UnsupportedOperation(_))
        ));
        assert_eq!(hp.default(), Datum::Str(String::new()));
    }

    #[test]
    fn single_value_enumerations_sample() {
        let hp = Hyperparameter::categorical("c", vec![Datum::Int(7)]).unwrap();
        let dist = hp.default_distribution().unwrap();
        assert_eq!(hp.sample(&dist, &mut rng()).unwrap(), Datum::Int(7));
    }

    #[test]
    fn oversampling_distribution_is_rejected_into_bounds() {
        // Acceptance is a few percent per draw; the rejection budget must
        // absorb that without failing.
        let hp = Hyperparameter::float("x", -1.0, 1.0).unwrap();
        let wide = Distribution::normal_float(0.0, 10.0).unwrap();
        let mut rng = rng();
        for _ in 0..1000 {
            let v = hp.sample(&wide, &mut rng).unwrap();
            assert!(hp.check_value(&v));
        }
    }

    #[test]
    fn explicit_distribution_snaps_to_a_quantized_domain() {
        let hp = Hyperparameter::float("q", 0.0, 1.0)
            .unwrap()
            .quantization(0.5)
            .unwrap();
        let smooth = Distribution::uniform_float(0.0, 1.0).unwrap();
        let mut rng = rng();
        for _ in 0..1000 {
            let v = hp.sample(&smooth, &mut rng).unwrap();
            assert!(hp.check_value(&v), "off-grid draw {v:?}");
        }

        let hp = Hyperparameter::int("n", 0, 10)
            .unwrap()
            .quantization(3.0)
            .unwrap();
        let smooth = Distribution::uniform_int(0, 10).unwrap();
        for _ in 0..1000 {
            let Datum::Int(v) = hp.sample(&smooth, &mut rng).unwrap() else {
                panic!("kind")
            };
            assert!([0, 3, 6, 9].contains(&v), "off-grid draw {v}");
        }
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let hp = Hyperparameter::float("x", -1.0, 1.0).unwrap();
        let ints = Distribution::uniform_int(-1, 1).unwrap();
        assert!(matches!(
            hp.sample(&ints, &mut rng()),
            Err(Error::InvalidValue(_))
        ));
    }
}
