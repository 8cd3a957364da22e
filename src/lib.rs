#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Typed, conditional configuration spaces with an ask/tell tuning engine.
//!
//! Define hyperparameters with typed domains, gate them behind activation
//! conditions, rule out bad combinations with forbidden clauses, and drive
//! black-box tuning through an ask/tell protocol that tracks the
//! Pareto-optimal evaluations — including a features-partitioned variant for
//! results obtained under different circumstances.
//!
//! # Getting Started
//!
//! ```
//! use std::sync::Arc;
//! use tunespace::prelude::*;
//!
//! # fn main() -> tunespace::Result<()> {
//! let mut cs = ConfigurationSpace::with_seed("demo", 42);
//! let x = cs.add_hyperparameter(Hyperparameter::float("x", -5.0, 5.0)?)?;
//! let cs = Arc::new(cs);
//!
//! let mut os = ObjectiveSpace::new("demo");
//! os.add_hyperparameter(Hyperparameter::float("y", -1e6, 1e6)?)?;
//! os.add_objective(Expression::variable(0), Direction::Minimize)?;
//! let os = Arc::new(os);
//!
//! let mut tuner = RandomTuner::new("random", Arc::clone(&cs), Arc::clone(&os));
//! for config in tuner.ask(20)? {
//!     let Some(v) = config.value(x)?.as_f64() else { unreachable!() };
//!     let y = (v - 3.0).powi(2);
//!     let evaluation = Evaluation::new(Arc::clone(&os), config, vec![Datum::Float(y)])?;
//!     tuner.tell(vec![evaluation])?;
//! }
//! assert_eq!(tuner.optimums().len(), 1);
//! let next = tuner.suggest()?;
//! # let _ = next;
//! # Ok(()) }
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Hyperparameter`] | A named, typed tuning variable — numerical, categorical, ordinal, discrete, or string. |
//! | [`Distribution`] | How values are drawn — uniform, normal, or roulette, with scale and quantization. |
//! | [`Expression`] | Conditions, forbidden clauses, and objectives over hyperparameter values. |
//! | [`ConfigurationSpace`] | Hyperparameters plus the condition DAG and forbidden clauses; draws [`Configuration`]s. |
//! | [`ObjectiveSpace`] | Result variables and the directed objectives computed from them. |
//! | [`Evaluation`] | One configuration's results, compared by Pareto dominance. |
//! | [`Tuner`] / [`FeaturesTuner`] | The ask/tell protocol, with [`RandomTuner`] and [`RandomFeaturesTuner`] baselines. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on plain data types (values, distributions, hyperparameters, expressions) | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at tell and sampling time | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod configuration;
mod configuration_space;
mod context;
mod datum;
mod distribution;
mod error;
mod evaluation;
mod expression;
mod features;
mod features_tuner;
mod hyperparameter;
mod objective_space;
mod rng_util;
mod tuner;
mod types;

pub use configuration::Configuration;
pub use configuration_space::ConfigurationSpace;
pub use context::Context;
pub use datum::{Datum, Numeric, NumericKind};
pub use distribution::{Distribution, Interval, ScaleType};
pub use error::{Error, Result};
pub use evaluation::{Evaluation, FeaturesEvaluation};
pub use expression::{BinaryOp, Expression, UnaryOp};
pub use features::{Features, FeaturesSpace};
pub use features_tuner::{
    FeaturesTuner, FeaturesTunerStrategy, RandomFeaturesTuner, UserDefinedFeaturesTuner,
};
pub use hyperparameter::{Domain, Hyperparameter};
pub use objective_space::{Objective, ObjectiveSpace};
pub use tuner::{RandomTuner, Tuner, TunerStrategy, UserDefinedTuner};
pub use types::{Comparison, Direction};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use tunespace::prelude::*;
/// ```
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::configuration_space::ConfigurationSpace;
    pub use crate::datum::{Datum, Numeric, NumericKind};
    pub use crate::distribution::{Distribution, Interval, ScaleType};
    pub use crate::error::{Error, Result};
    pub use crate::evaluation::{Evaluation, FeaturesEvaluation};
    pub use crate::expression::{BinaryOp, Expression, UnaryOp};
    pub use crate::features::{Features, FeaturesSpace};
    pub use crate::features_tuner::{
        FeaturesTuner, FeaturesTunerStrategy, RandomFeaturesTuner, UserDefinedFeaturesTuner,
    };
    pub use crate::hyperparameter::{Domain, Hyperparameter};
    pub use crate::objective_space::{Objective, ObjectiveSpace};
    pub use crate::tuner::{RandomTuner, Tuner, TunerStrategy, UserDefinedTuner};
    pub use crate::types::{Comparison, Direction};
}
