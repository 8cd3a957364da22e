//! Sampling distributions for hyperparameter values.
//!
//! Three families are provided:
//!
//! | Distribution | Support | Notes |
//! |---|---|---|
//! | [`Distribution::uniform_float`] / [`Distribution::uniform_int`] | bounded interval | optional log scale and quantization |
//! | [`Distribution::normal_float`] / [`Distribution::normal_int`] | unbounded (or truncated) | optional log scale, quantization, hard bounds |
//! | [`Distribution::roulette`] | `[0, len)` integer indices | probability proportional to area |
//!
//! Every distribution carries a [`NumericKind`] fixed at construction and
//! produces [`Numeric`] values of exactly that kind.

use crate::datum::{Numeric, NumericKind};
use crate::error::{Error, Result};
use crate::rng_util;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Retry budget for bounded rejection sampling.
pub(crate) const MAX_SAMPLING_ATTEMPTS: usize = 100;

/// How a distribution spreads its draws over its support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScaleType {
    /// Draws are spread linearly.
    Linear,
    /// Draws are spread uniformly in log space.
    Logarithmic,
}

/// A numeric interval with per-bound inclusivity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    /// The numeric kind of the interval's values.
    pub kind: NumericKind,
    /// Lower endpoint.
    pub lower: f64,
    /// Upper endpoint.
    pub upper: f64,
    /// Whether the lower endpoint belongs to the interval.
    pub lower_included: bool,
    /// Whether the upper endpoint belongs to the interval.
    pub upper_included: bool,
}

impl Interval {
    /// Tests whether a value lies within the interval.
    #[must_use]
    pub fn contains(&self, value: Numeric) -> bool {
        let v = value.as_f64();
        let above = if self.lower_included {
            v >= self.lower
        } else {
            v > self.lower
        };
        let below = if self.upper_included {
            v <= self.upper
        } else {
            v < self.upper
        };
        above && below
    }

    /// Tests whether `other` lies entirely within this interval.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn encloses(&self, other: &Interval) -> bool {
        let lower_ok = other.lower > self.lower
            || (other.lower == self.lower && (self.lower_included || !other.lower_included));
        let upper_ok = other.upper < self.upper
            || (other.upper == self.upper && (self.upper_included || !other.upper_included));
        lower_ok && upper_ok
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Uniform {
    kind: NumericKind,
    lower: Numeric,
    upper: Numeric,
    scale: ScaleType,
    quantization: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Normal {
    kind: NumericKind,
    mu: f64,
    sigma: f64,
    scale: ScaleType,
    quantization: Option<f64>,
    truncation: Option<(f64, f64)>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Roulette {
    areas: Vec<f64>,
    total: f64,
}

/// A sampling distribution over numeric values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Distribution {
    inner: Inner,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Inner {
    Uniform(Uniform),
    Normal(Normal),
    Roulette(Roulette),
}

impl Distribution {
    /// Creates a uniform distribution over floats in `[lower, upper)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if the bounds are not finite or
    /// `lower >= upper`.
    pub fn uniform_float(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(Error::InvalidBounds { lower, upper });
        }
        Ok(Self {
            inner: Inner::Uniform(Uniform {
                kind: NumericKind::Float,
                lower: Numeric::Float(lower),
                upper: Numeric::Float(upper),
                scale: ScaleType::Linear,
                quantization: None,
            }),
        })
    }

    /// Creates a uniform distribution over integers in `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    #[allow(clippy::cast_precision_loss)]
    pub fn uniform_int(lower: i64, upper: i64) -> Result<Self> {
        if lower >= upper {
            return Err(Error::InvalidBounds {
                lower: lower as f64,
                upper: upper as f64,
            });
        }
        Ok(Self {
            inner: Inner::Uniform(Uniform {
                kind: NumericKind::Int,
                lower: Numeric::Int(lower),
                upper: Numeric::Int(upper),
                scale: ScaleType::Linear,
                quantization: None,
            }),
        })
    }

    /// Creates a normal distribution over floats with mean `mu` and standard
    /// deviation `sigma`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `mu` is not finite or `sigma` is
    /// not strictly positive.
    pub fn normal_float(mu: f64, sigma: f64) -> Result<Self> {
        Self::normal(NumericKind::Float, mu, sigma)
    }

    /// Creates a normal distribution over integers, rounding each draw to the
    /// nearest integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `mu` is not finite or `sigma` is
    /// not strictly positive.
    pub fn normal_int(mu: f64, sigma: f64) -> Result<Self> {
        Self::normal(NumericKind::Int, mu, sigma)
    }

    fn normal(kind: NumericKind, mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() {
            return Err(Error::InvalidValue("normal mean must be finite"));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::InvalidValue(
                "normal standard deviation must be strictly positive",
            ));
        }
        Ok(Self {
            inner: Inner::Normal(Normal {
                kind,
                mu,
                sigma,
                scale: ScaleType::Linear,
                quantization: None,
                truncation: None,
            }),
        })
    }

    /// Creates a roulette distribution over indices `0..areas.len()`, each
    /// drawn with probability proportional to its area.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `areas` is empty, contains a
    /// negative or non-finite area, or sums to zero.
    pub fn roulette(areas: Vec<f64>) -> Result<Self> {
        if areas.is_empty() {
            return Err(Error::InvalidDistribution(
                "roulette requires at least one area",
            ));
        }
        if areas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(Error::InvalidDistribution(
                "roulette areas must be finite and non-negative",
            ));
        }
        let total: f64 = areas.iter().sum();
        if total <= 0.0 {
            return Err(Error::InvalidDistribution(
                "roulette areas must not all be zero",
            ));
        }
        Ok(Self {
            inner: Inner::Roulette(Roulette { areas, total }),
        })
    }

    /// Sets the scale of a uniform or normal distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] when a logarithmic scale is requested
    /// for a uniform distribution whose lower bound is not strictly positive,
    /// and [`Error::UnsupportedOperation`] for roulette distributions.
    pub fn scale(mut self, scale: ScaleType) -> Result<Self> {
        match &mut self.inner {
            Inner::Uniform(u) => {
                if scale == ScaleType::Logarithmic && u.lower.as_f64() <= 0.0 {
                    return Err(Error::InvalidScale);
                }
                u.scale = scale;
            }
            Inner::Normal(n) => n.scale = scale,
            Inner::Roulette(_) => {
                return Err(Error::UnsupportedOperation(
                    "roulette distributions have no scale",
                ));
            }
        }
        Ok(self)
    }

    /// Sets the quantization of a uniform or normal distribution. Uniform
    /// draws snap to the grid `lower + k * q`; normal draws round to the
    /// nearest multiple of `q`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuantization`] if `q` is not strictly positive,
    /// exceeds a uniform distribution's span, or is not a whole number for an
    /// integer-kinded distribution, and [`Error::UnsupportedOperation`] for
    /// roulette distributions.
    #[allow(clippy::float_cmp)]
    pub fn quantization(mut self, q: f64) -> Result<Self> {
        if !q.is_finite() || q <= 0.0 {
            return Err(Error::InvalidQuantization(q));
        }
        match &mut self.inner {
            Inner::Uniform(u) => {
                if u.kind == NumericKind::Int && q.fract() != 0.0 {
                    return Err(Error::InvalidQuantization(q));
                }
                if q > u.upper.as_f64() - u.lower.as_f64() {
                    return Err(Error::InvalidQuantization(q));
                }
                u.quantization = Some(q);
            }
            Inner::Normal(n) => {
                if n.kind == NumericKind::Int && q.fract() != 0.0 {
                    return Err(Error::InvalidQuantization(q));
                }
                n.quantization = Some(q);
            }
            Inner::Roulette(_) => {
                return Err(Error::UnsupportedOperation(
                    "roulette distributions have no quantization",
                ));
            }
        }
        Ok(self)
    }

    /// Restricts a normal distribution to `[lower, upper]` by rejection.
    /// Draws outside the bounds are retried; an exhausted retry budget makes
    /// [`Distribution::sample`] fail with [`Error::SamplingUnsuccessful`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if the bounds are not finite or
    /// `lower >= upper`, and [`Error::UnsupportedOperation`] for non-normal
    /// distributions.
    pub fn truncate(mut self, lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(Error::InvalidBounds { lower, upper });
        }
        match &mut self.inner {
            Inner::Normal(n) => {
                n.truncation = Some((lower, upper));
                Ok(self)
            }
            _ => Err(Error::UnsupportedOperation(
                "only normal distributions support truncation",
            )),
        }
    }

    /// The numeric kind this distribution produces.
    #[must_use]
    pub fn kind(&self) -> NumericKind {
        match &self.inner {
            Inner::Uniform(u) => u.kind,
            Inner::Normal(n) => n.kind,
            Inner::Roulette(_) => NumericKind::Int,
        }
    }

    /// The native bounds of this distribution's draws.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Interval {
        match &self.inner {
            Inner::Uniform(u) => Interval {
                kind: u.kind,
                lower: u.lower.as_f64(),
                upper: u.upper.as_f64(),
                lower_included: true,
                upper_included: u.kind == NumericKind::Int,
            },
            Inner::Normal(n) => {
                let (lower, upper) = n
                    .truncation
                    .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
                let lower = if n.scale == ScaleType::Logarithmic {
                    lower.max(0.0)
                } else {
                    lower
                };
                Interval {
                    kind: n.kind,
                    lower,
                    upper,
                    lower_included: n.truncation.is_some(),
                    upper_included: n.truncation.is_some(),
                }
            }
            Inner::Roulette(r) => Interval {
                kind: NumericKind::Int,
                lower: 0.0,
                upper: r.areas.len() as f64,
                lower_included: true,
                upper_included: false,
            },
        }
    }

    /// Reports whether this distribution's native bounds extend beyond the
    /// target interval, so that draws may need rejection to stay inside it.
    #[must_use]
    pub fn oversamples(&self, target: &Interval) -> bool {
        !target.encloses(&self.bounds())
    }

    /// Draws one value of the declared kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SamplingUnsuccessful`] when a truncated normal
    /// distribution exhausts its rejection retry budget.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Result<Numeric> {
        match &self.inner {
            Inner::Uniform(u) => Ok(sample_uniform(u, rng)),
            Inner::Normal(n) => sample_normal(n, rng),
            Inner::Roulette(r) => Ok(sample_roulette(r, rng)),
        }
    }

    /// Draws `n` values, observably equivalent to `n` calls to
    /// [`Distribution::sample`].
    ///
    /// # Errors
    ///
    /// Propagates the first sampling failure.
    pub fn samples(&self, rng: &mut fastrand::Rng, n: usize) -> Result<Vec<Numeric>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn sample_uniform(u: &Uniform, rng: &mut fastrand::Rng) -> Numeric {
    match (u.lower, u.upper) {
        (Numeric::Int(lower), Numeric::Int(upper)) => {
            let value = match u.scale {
                ScaleType::Linear => {
                    if let Some(q) = u.quantization {
                        let q = q as i64;
                        let n_steps = (upper - lower) / q;
                        lower + rng.i64(0..=n_steps) * q
                    } else {
                        rng.i64(lower..=upper)
                    }
                }
                ScaleType::Logarithmic => {
                    let draw = rng_util::f64_range(
                        rng,
                        (lower as f64).ln(),
                        (upper as f64 + 1.0).ln(),
                    )
                    .exp()
                    .floor() as i64;
                    let draw = draw.clamp(lower, upper);
                    if let Some(q) = u.quantization {
                        let q = q as i64;
                        lower + (draw - lower) / q * q
                    } else {
                        draw
                    }
                }
            };
            Numeric::Int(value)
        }
        (lower, upper) => {
            let (lower, upper) = (lower.as_f64(), upper.as_f64());
            let value = match u.scale {
                ScaleType::Linear => {
                    if let Some(q) = u.quantization {
                        let n_steps = ((upper - lower) / q).floor() as i64;
                        lower + rng.i64(0..=n_steps) as f64 * q
                    } else {
                        rng_util::f64_range(rng, lower, upper)
                    }
                }
                ScaleType::Logarithmic => {
                    let draw = rng_util::f64_range(rng, lower.ln(), upper.ln()).exp();
                    if let Some(q) = u.quantization {
                        lower + ((draw - lower) / q).floor() * q
                    } else {
                        draw
                    }
                }
            };
            Numeric::Float(value)
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn sample_normal(n: &Normal, rng: &mut fastrand::Rng) -> Result<Numeric> {
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let mut x = n.mu + n.sigma * rng_util::gaussian(rng);
        if n.scale == ScaleType::Logarithmic {
            x = x.exp();
        }
        if let Some(q) = n.quantization {
            x = (x / q).round() * q;
        }
        let value = match n.kind {
            NumericKind::Float => Numeric::Float(x),
            NumericKind::Int => Numeric::Int(x.round() as i64),
        };
        match n.truncation {
            Some((lower, upper)) => {
                let v = value.as_f64();
                if v >= lower && v <= upper {
                    return Ok(value);
                }
            }
            None => return Ok(value),
        }
    }
    Err(Error::SamplingUnsuccessful)
}

#[allow(clippy::cast_possible_wrap)]
fn sample_roulette(r: &Roulette, rng: &mut fastrand::Rng) -> Numeric {
    let mut draw = rng.f64() * r.total;
    for (index, area) in r.areas.iter().enumerate() {
        draw -= area;
        if draw < 0.0 {
            return Numeric::Int(index as i64);
        }
    }
    // Rounding can push the draw past the last area; fall back to the last
    // index that actually carries mass.
    let fallback = r.areas.iter().rposition(|a| *a > 0.0).unwrap_or(0);
    Numeric::Int(fallback as i64)
}
