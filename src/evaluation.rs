//! Evaluations: configuration results and their Pareto comparison.
//!
//! An [`Evaluation`] binds a configuration to the result-variable values an
//! external evaluator produced, or to an error message when the evaluator
//! failed. Objective values are computed once at construction and cached.
//!
//! [`Evaluation::compare`] defines the dominance order used by tuners:
//! errored evaluations sit in a total order below every success (two errors
//! are equivalent), and successes compare objective by objective under each
//! objective's direction.

use std::sync::Arc;

use crate::configuration::Configuration;
use crate::configuration_space::same_space;
use crate::datum::Datum;
use crate::error::Result;
use crate::features::Features;
use crate::objective_space::ObjectiveSpace;
use crate::types::Comparison;

/// The result of evaluating one configuration.
#[derive(Clone, Debug)]
pub struct Evaluation {
    objective_space: Arc<ObjectiveSpace>,
    configuration: Configuration,
    values: Vec<Datum>,
    error: Option<String>,
    objective_values: Vec<Datum>,
}

impl Evaluation {
    /// Wraps a successful result, validating the result-variable values and
    /// caching the objective values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvaluation`] for values the objective space
    /// rejects, and propagates objective expression failures.
    pub fn new(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        values: Vec<Datum>,
    ) -> Result<Self> {
        objective_space.check_values(&values)?;
        let objective_values = objective_space.evaluate(&values)?;
        Ok(Self {
            objective_space,
            configuration,
            values,
            error: None,
            objective_values,
        })
    }

    /// Wraps a failed evaluation carrying the evaluator's error message.
    #[must_use]
    pub fn failed(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            objective_space,
            configuration,
            values: Vec::new(),
            error: Some(message.into()),
            objective_values: Vec::new(),
        }
    }

    /// The objective space this evaluation was produced for.
    #[must_use]
    pub fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    /// The evaluated configuration.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// The raw result-variable values; empty for failed evaluations.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// The evaluator's error message, if the evaluation failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True for failed evaluations.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The cached objective values; empty for failed evaluations.
    #[must_use]
    pub fn objective_values(&self) -> &[Datum] {
        &self.objective_values
    }

    /// Compares two evaluations for dominance.
    ///
    /// Evaluations from different objective space allocations are
    /// [`Comparison::NotComparable`]. An errored evaluation is
    /// [`Comparison::Worse`] than any success and
    /// [`Comparison::Equivalent`] to any other error. Successes compare
    /// objective by objective: better on some and worse on none dominates;
    /// equal everywhere is equivalent; better somewhere and worse elsewhere,
    /// or any unordered objective pair, is not comparable.
    #[must_use]
    pub fn compare(&self, other: &Evaluation) -> Comparison {
        if !same_space(&self.objective_space, &other.objective_space) {
            return Comparison::NotComparable;
        }
        match (self.is_error(), other.is_error()) {
            (true, true) => return Comparison::Equivalent,
            (true, false) => return Comparison::Worse,
            (false, true) => return Comparison::Better,
            (false, false) => {}
        }
        let mut better = false;
        let mut worse = false;
        for (objective, (a, b)) in self
            .objective_space
            .objectives()
            .iter()
            .zip(self.objective_values.iter().zip(&other.objective_values))
        {
            let Some(ordering) = a.try_cmp(b) else {
                return Comparison::NotComparable;
            };
            match objective.direction().prefer(ordering) {
                core::cmp::Ordering::Less => better = true,
                core::cmp::Ordering::Greater => worse = true,
                core::cmp::Ordering::Equal => {}
            }
        }
        match (better, worse) {
            (true, true) => Comparison::NotComparable,
            (true, false) => Comparison::Better,
            (false, true) => Comparison::Worse,
            (false, false) => Comparison::Equivalent,
        }
    }
}

/// An evaluation obtained under specific features.
#[derive(Clone, Debug)]
pub struct FeaturesEvaluation {
    evaluation: Evaluation,
    features: Features,
}

impl FeaturesEvaluation {
    /// Wraps a successful result obtained under `features`.
    ///
    /// # Errors
    ///
    /// Propagates the validation failures of [`Evaluation::new`].
    pub fn new(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        features: Features,
        values: Vec<Datum>,
    ) -> Result<Self> {
        Ok(Self {
            evaluation: Evaluation::new(objective_space, configuration, values)?,
            features,
        })
    }

    /// Wraps a failed evaluation obtained under `features`.
    #[must_use]
    pub fn failed(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        features: Features,
        message: impl Into<String>,
    ) -> Self {
        Self {
            evaluation: Evaluation::failed(objective_space, configuration, message),
            features,
        }
    }

    /// The underlying evaluation.
    #[must_use]
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// The features the evaluation was obtained under.
    #[must_use]
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Compares two featured evaluations: results obtained under different
    /// features are never comparable, otherwise the underlying evaluations
    /// compare as usual.
    #[must_use]
    pub fn compare(&self, other: &FeaturesEvaluation) -> Comparison {
        if self.features != other.features {
            return Comparison::NotComparable;
        }
        self.evaluation.compare(&other.evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration_space::ConfigurationSpace;
    use crate::error::Error;
    use crate::expression::Expression;
    use crate::features::FeaturesSpace;
    use crate::hyperparameter::Hyperparameter;
    use crate::types::Direction;

    fn spaces() -> (Arc<ConfigurationSpace>, Arc<ObjectiveSpace>) {
        let mut cs = ConfigurationSpace::with_seed("cs", 11);
        cs.add_hyperparameter(Hyperparameter::float("x", -5.0, 5.0).unwrap())
            .unwrap();
        let mut os = ObjectiveSpace::new("os");
        os.add_hyperparameter(Hyperparameter::float("y1", -1e6, 1e6).unwrap())
            .unwrap();
        os.add_hyperparameter(Hyperparameter::float("y2", -1e6, 1e6).unwrap())
            .unwrap();
        os.add_objective(Expression::variable(0), Direction::Minimize)
            .unwrap();
        os.add_objective(Expression::variable(1), Direction::Maximize)
            .unwrap();
        (Arc::new(cs), Arc::new(os))
    }

    fn eval(
        cs: &Arc<ConfigurationSpace>,
        os: &Arc<ObjectiveSpace>,
        y1: f64,
        y2: f64,
    ) -> Evaluation {
        let config = Configuration::sample(cs).unwrap();
        Evaluation::new(
            Arc::clone(os),
            config,
            vec![Datum::Float(y1), Datum::Float(y2)],
        )
        .unwrap()
    }

    #[test]
    fn dominance_respects_directions() {
        let (cs, os) = spaces();
        let a = eval(&cs, &os, 0.0, 10.0);
        let b = eval(&cs, &os, 1.0, 5.0);
        assert_eq!(a.compare(&b), Comparison::Better);
        assert_eq!(b.compare(&a), Comparison::Worse);

        let c = eval(&cs, &os, 0.0, 10.0);
        assert_eq!(a.compare(&c), Comparison::Equivalent);

        // Better on one objective, worse on the other.
        let d = eval(&cs, &os, -1.0, 5.0);
        assert_eq!(a.compare(&d), Comparison::NotComparable);
    }

    #[test]
    fn errors_sort_below_every_success() {
        let (cs, os) = spaces();
        let ok = eval(&cs, &os, 0.0, 0.0);
        let failed = Evaluation::failed(
            Arc::clone(&os),
            Configuration::sample(&cs).unwrap(),
            "oom",
        );
        let failed_too = Evaluation::failed(
            Arc::clone(&os),
            Configuration::sample(&cs).unwrap(),
            "timeout",
        );
        assert_eq!(failed.compare(&ok), Comparison::Worse);
        assert_eq!(ok.compare(&failed), Comparison::Better);
        assert_eq!(failed.compare(&failed_too), Comparison::Equivalent);
        assert_eq!(failed.error(), Some("oom"));
    }

    #[test]
    fn foreign_objective_spaces_are_not_comparable() {
        let (cs, os) = spaces();
        let (_, other_os) = spaces();
        let a = eval(&cs, &os, 0.0, 0.0);
        let b = eval(&cs, &other_os, 1.0, 1.0);
        assert_eq!(a.compare(&b), Comparison::NotComparable);
    }

    #[test]
    fn invalid_result_values_are_rejected() {
        let (cs, os) = spaces();
        let config = Configuration::sample(&cs).unwrap();
        assert!(matches!(
            Evaluation::new(Arc::clone(&os), config, vec![Datum::Float(0.0)]),
            Err(Error::InvalidEvaluation(_))
        ));
    }

    #[test]
    fn differing_features_partition_comparisons() {
        let (cs, os) = spaces();
        let mut fs = FeaturesSpace::new("fs");
        fs.add_hyperparameter(Hyperparameter::int("node", 0, 10).unwrap())
            .unwrap();
        let fs = Arc::new(fs);
        let here = Features::new(Arc::clone(&fs), vec![Datum::Int(1)]).unwrap();
        let there = Features::new(Arc::clone(&fs), vec![Datum::Int(2)]).unwrap();

        let make = |features: &Features, y1: f64| {
            FeaturesEvaluation::new(
                Arc::clone(&os),
                Configuration::sample(&cs).unwrap(),
                features.clone(),
                vec![Datum::Float(y1), Datum::Float(0.0)],
            )
            .unwrap()
        };
        let a = make(&here, 0.0);
        let b = make(&here, 1.0);
        let c = make(&there, 1.0);
        assert_eq!(a.compare(&b), Comparison::Better);
        assert_eq!(a.compare(&c), Comparison::NotComparable);
        assert_eq!(c.compare(&a), Comparison::NotComparable);
    }
}
