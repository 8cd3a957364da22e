//! Ask/tell tuners over a configuration space and an objective space.
//!
//! A tuner hands out configurations to evaluate (`ask`), receives finished
//! evaluations (`tell`), records every evaluation in an append-only history,
//! and maintains the set of non-dominated evaluations incrementally. The
//! [`RandomTuner`] baseline samples its space uniformly; [`UserDefinedTuner`]
//! wraps an arbitrary [`TunerStrategy`] while enforcing the ask/tell
//! contract on its behalf.

use std::sync::Arc;

use crate::configuration::Configuration;
use crate::configuration_space::{same_space, ConfigurationSpace};
use crate::error::{Error, Result};
use crate::evaluation::Evaluation;
use crate::objective_space::ObjectiveSpace;
use crate::types::Comparison;

/// The ask/tell protocol.
pub trait Tuner {
    /// The tuner's name.
    fn name(&self) -> &str;

    /// The configuration space being tuned.
    fn configuration_space(&self) -> &Arc<ConfigurationSpace>;

    /// The objective space evaluations are produced for.
    fn objective_space(&self) -> &Arc<ObjectiveSpace>;

    /// Returns up to `count` configurations to evaluate.
    ///
    /// # Errors
    ///
    /// Propagates sampling failures.
    fn ask(&mut self, count: usize) -> Result<Vec<Configuration>>;

    /// Records finished evaluations: all are appended to the history in
    /// order, errored ones included, and the optimal set is updated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvaluation`] when an evaluation does not
    /// belong to the tuner's spaces; nothing is recorded in that case.
    fn tell(&mut self, evaluations: Vec<Evaluation>) -> Result<()>;

    /// Every evaluation told so far, in arrival order.
    fn history(&self) -> Vec<Evaluation>;

    /// The non-dominated evaluations among the history.
    fn optimums(&self) -> Vec<Evaluation>;

    /// A configuration worth running: one of the optimal configurations, or
    /// a fresh sample while none exist.
    ///
    /// # Errors
    ///
    /// Propagates sampling failures.
    fn suggest(&mut self) -> Result<Configuration>;
}

/// Folds a candidate into a non-dominated set.
///
/// The candidate is discarded as soon as a member is better than or
/// equivalent to it, so the first-told of two equivalent evaluations stays.
/// Members the candidate dominates are dropped; surviving candidates are
/// appended.
pub(crate) fn update_optimums<E>(
    optimums: &mut Vec<E>,
    candidate: E,
    compare: impl Fn(&E, &E) -> Comparison,
) {
    let mut discard = false;
    optimums.retain(|member| match compare(&candidate, member) {
        Comparison::Worse | Comparison::Equivalent => {
            discard = true;
            true
        }
        Comparison::Better => false,
        Comparison::NotComparable => true,
    });
    if !discard {
        optimums.push(candidate);
    }
}

/// Picks one optimal configuration at random, if any exist.
pub(crate) fn suggest_among<E>(
    optimums: &[E],
    configuration: impl Fn(&E) -> &Configuration,
) -> Option<Configuration> {
    if optimums.is_empty() {
        None
    } else {
        Some(configuration(&optimums[fastrand::usize(..optimums.len())]).clone())
    }
}

pub(crate) fn check_ownership(
    configuration_space: &Arc<ConfigurationSpace>,
    objective_space: &Arc<ObjectiveSpace>,
    evaluation: &Evaluation,
) -> Result<()> {
    if !same_space(evaluation.objective_space(), objective_space) {
        return Err(Error::InvalidEvaluation(
            "evaluation belongs to a foreign objective space",
        ));
    }
    if !same_space(evaluation.configuration().space(), configuration_space) {
        return Err(Error::InvalidEvaluation(
            "evaluation's configuration belongs to a foreign space",
        ));
    }
    Ok(())
}

/// The uniform-random baseline tuner.
pub struct RandomTuner {
    name: String,
    configuration_space: Arc<ConfigurationSpace>,
    objective_space: Arc<ObjectiveSpace>,
    history: Vec<Evaluation>,
    optimums: Vec<Evaluation>,
}

impl RandomTuner {
    /// Creates a tuner over the given spaces.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        configuration_space: Arc<ConfigurationSpace>,
        objective_space: Arc<ObjectiveSpace>,
    ) -> Self {
        Self {
            name: name.into(),
            configuration_space,
            objective_space,
            history: Vec::new(),
            optimums: Vec::new(),
        }
    }
}

impl Tuner for RandomTuner {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration_space(&self) -> &Arc<ConfigurationSpace> {
        &self.configuration_space
    }

    fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    fn ask(&mut self, count: usize) -> Result<Vec<Configuration>> {
        Configuration::samples(&self.configuration_space, count)
    }

    fn tell(&mut self, evaluations: Vec<Evaluation>) -> Result<()> {
        for evaluation in &evaluations {
            check_ownership(&self.configuration_space, &self.objective_space, evaluation)?;
        }
        for evaluation in evaluations {
            self.history.push(evaluation.clone());
            update_optimums(&mut self.optimums, evaluation, Evaluation::compare);
        }
        trace_info!(
            tuner = %self.name,
            history = self.history.len(),
            optimums = self.optimums.len(),
            "recorded evaluations"
        );
        Ok(())
    }

    fn history(&self) -> Vec<Evaluation> {
        self.history.clone()
    }

    fn optimums(&self) -> Vec<Evaluation> {
        self.optimums.clone()
    }

    fn suggest(&mut self) -> Result<Configuration> {
        match suggest_among(&self.optimums, Evaluation::configuration) {
            Some(configuration) => Ok(configuration),
            None => Configuration::sample(&self.configuration_space),
        }
    }
}

/// The callbacks a user-defined tuner supplies. The wrapping
/// [`UserDefinedTuner`] enforces the ask/tell contract, so strategies only
/// implement policy.
pub trait TunerStrategy {
    /// Produces up to `count` configurations to evaluate.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures.
    fn ask(&mut self, count: usize) -> Result<Vec<Configuration>>;

    /// Records evaluations already validated to belong to the tuner's
    /// spaces.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures.
    fn tell(&mut self, evaluations: Vec<Evaluation>) -> Result<()>;

    /// Every evaluation told so far, in arrival order.
    fn history(&self) -> Vec<Evaluation>;

    /// The non-dominated evaluations among the history.
    fn optimums(&self) -> Vec<Evaluation>;

    /// An optional suggestion policy; `None` delegates to the default
    /// policy of picking among the optimums.
    fn suggest(&mut self) -> Option<Result<Configuration>> {
        None
    }
}

/// A tuner driven by a [`TunerStrategy`].
pub struct UserDefinedTuner {
    name: String,
    configuration_space: Arc<ConfigurationSpace>,
    objective_space: Arc<ObjectiveSpace>,
    strategy: Box<dyn TunerStrategy>,
}

impl UserDefinedTuner {
    /// Creates a tuner delegating policy to `strategy`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        configuration_space: Arc<ConfigurationSpace>,
        objective_space: Arc<ObjectiveSpace>,
        strategy: Box<dyn TunerStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            configuration_space,
            objective_space,
            strategy,
        }
    }

    fn check_asked(&self, configurations: &[Configuration], count: usize) -> Result<()> {
        if configurations.len() > count {
            return Err(Error::InvalidTuner(
                "strategy returned more configurations than requested",
            ));
        }
        for configuration in configurations {
            if !same_space(configuration.space(), &self.configuration_space) {
                return Err(Error::InvalidTuner(
                    "strategy returned a configuration from a foreign space",
                ));
            }
        }
        Ok(())
    }
}

impl Tuner for UserDefinedTuner {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration_space(&self) -> &Arc<ConfigurationSpace> {
        &self.configuration_space
    }

    fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    fn ask(&mut self, count: usize) -> Result<Vec<Configuration>> {
        let configurations = self.strategy.ask(count)?;
        self.check_asked(&configurations, count)?;
        Ok(configurations)
    }

    fn tell(&mut self, evaluations: Vec<Evaluation>) -> Result<()> {
        for evaluation in &evaluations {
            check_ownership(&self.configuration_space, &self.objective_space, evaluation)?;
        }
        self.strategy.tell(evaluations)
    }

    fn history(&self) -> Vec<Evaluation> {
        self.strategy.history()
    }

    fn optimums(&self) -> Vec<Evaluation> {
        self.strategy.optimums()
    }

    fn suggest(&mut self) -> Result<Configuration> {
        if let Some(suggestion) = self.strategy.suggest() {
            let configuration = suggestion?;
            if !same_space(configuration.space(), &self.configuration_space) {
                return Err(Error::InvalidTuner(
                    "strategy suggested a configuration from a foreign space",
                ));
            }
            return Ok(configuration);
        }
        match suggest_among(&self.strategy.optimums(), Evaluation::configuration) {
            Some(configuration) => Ok(configuration),
            None => self.ask(1)?.pop().ok_or(Error::SamplingUnsuccessful),
        }
    }
}
