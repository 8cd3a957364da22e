//! Ask/tell tuners partitioned by features.
//!
//! A features tuner runs the ask/tell protocol per features binding: asking
//! and suggesting take the features the evaluation will run under, and
//! results obtained under different features never compete. The partition
//! isolation needs no bookkeeping beyond the dominance order itself, since
//! evaluations with differing features are never comparable.

use std::sync::Arc;

use crate::configuration::Configuration;
use crate::configuration_space::{same_space, ConfigurationSpace};
use crate::error::{Error, Result};
use crate::evaluation::FeaturesEvaluation;
use crate::features::{Features, FeaturesSpace};
use crate::objective_space::ObjectiveSpace;
use crate::tuner::{check_ownership, suggest_among, update_optimums};

/// The ask/tell protocol with a features dimension.
pub trait FeaturesTuner {
    /// The tuner's name.
    fn name(&self) -> &str;

    /// The configuration space being tuned.
    fn configuration_space(&self) -> &Arc<ConfigurationSpace>;

    /// The objective space evaluations are produced for.
    fn objective_space(&self) -> &Arc<ObjectiveSpace>;

    /// The features space evaluations are obtained under.
    fn features_space(&self) -> &Arc<FeaturesSpace>;

    /// Returns up to `count` configurations to evaluate under `features`.
    ///
    /// # Errors
    ///
    /// Propagates sampling failures.
    fn ask(&mut self, features: &Features, count: usize) -> Result<Vec<Configuration>>;

    /// Records finished evaluations, appending all of them to the history
    /// and updating the optimal sets of their partitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvaluation`] when an evaluation does not
    /// belong to the tuner's spaces, and [`Error::InvalidFeatures`] when its
    /// features do; nothing is recorded in either case.
    fn tell(&mut self, evaluations: Vec<FeaturesEvaluation>) -> Result<()>;

    /// The evaluations told so far, optionally restricted to one features
    /// binding.
    fn history(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation>;

    /// The non-dominated evaluations, optionally restricted to one features
    /// binding. Without a filter, the union over every partition.
    fn optimums(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation>;

    /// A configuration worth running under `features`: one of the
    /// partition's optimal configurations, or a fresh sample while none
    /// exist.
    ///
    /// # Errors
    ///
    /// Propagates sampling failures.
    fn suggest(&mut self, features: &Features) -> Result<Configuration>;
}

fn check_features(space: &Arc<FeaturesSpace>, features: &Features) -> Result<()> {
    if !same_space(features.space(), space) {
        return Err(Error::InvalidFeatures(
            "features belong to a foreign features space",
        ));
    }
    Ok(())
}

/// The uniform-random baseline features tuner.
pub struct RandomFeaturesTuner {
    name: String,
    configuration_space: Arc<ConfigurationSpace>,
    objective_space: Arc<ObjectiveSpace>,
    features_space: Arc<FeaturesSpace>,
    history: Vec<FeaturesEvaluation>,
    optimums: Vec<FeaturesEvaluation>,
}

impl RandomFeaturesTuner {
    /// Creates a tuner over the given spaces.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        configuration_space: Arc<ConfigurationSpace>,
        objective_space: Arc<ObjectiveSpace>,
        features_space: Arc<FeaturesSpace>,
    ) -> Self {
        Self {
            name: name.into(),
            configuration_space,
            objective_space,
            features_space,
            history: Vec::new(),
            optimums: Vec::new(),
        }
    }
}

fn filtered(
    evaluations: &[FeaturesEvaluation],
    features: Option<&Features>,
) -> Vec<FeaturesEvaluation> {
    match features {
        None => evaluations.to_vec(),
        Some(features) => evaluations
            .iter()
            .filter(|evaluation| evaluation.features() == features)
            .cloned()
            .collect(),
    }
}

impl FeaturesTuner for RandomFeaturesTuner {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration_space(&self) -> &Arc<ConfigurationSpace> {
        &self.configuration_space
    }

    fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    fn features_space(&self) -> &Arc<FeaturesSpace> {
        &self.features_space
    }

    fn ask(&mut self, features: &Features, count: usize) -> Result<Vec<Configuration>> {
        check_features(&self.features_space, features)?;
        Configuration::samples(&self.configuration_space, count)
    }

    fn tell(&mut self, evaluations: Vec<FeaturesEvaluation>) -> Result<()> {
        for evaluation in &evaluations {
            check_ownership(
                &self.configuration_space,
                &self.objective_space,
                evaluation.evaluation(),
            )?;
            check_features(&self.features_space, evaluation.features())?;
        }
        for evaluation in evaluations {
            self.history.push(evaluation.clone());
            // Differing features compare as not comparable, which keeps
            // every partition's front intact within one list.
            update_optimums(&mut self.optimums, evaluation, FeaturesEvaluation::compare);
        }
        trace_info!(
            tuner = %self.name,
            history = self.history.len(),
            optimums = self.optimums.len(),
            "recorded evaluations"
        );
        Ok(())
    }

    fn history(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
        filtered(&self.history, features)
    }

    fn optimums(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
        filtered(&self.optimums, features)
    }

    fn suggest(&mut self, features: &Features) -> Result<Configuration> {
        check_features(&self.features_space, features)?;
        let partition = self.optimums(Some(features));
        match suggest_among(&partition, |evaluation| {
            evaluation.evaluation().configuration()
        }) {
            Some(configuration) => Ok(configuration),
            None => Configuration::sample(&self.configuration_space),
        }
    }
}

/// The callbacks a user-defined features tuner supplies. The wrapping
/// [`UserDefinedFeaturesTuner`] enforces the ask/tell contract.
pub trait FeaturesTunerStrategy {
    /// Produces up to `count` configurations to evaluate under `features`.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures.
    fn ask(&mut self, features: &Features, count: usize) -> Result<Vec<Configuration>>;

    /// Records evaluations already validated to belong to the tuner's
    /// spaces.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures.
    fn tell(&mut self, evaluations: Vec<FeaturesEvaluation>) -> Result<()>;

    /// The evaluations told so far, optionally restricted to one features
    /// binding.
    fn history(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation>;

    /// The non-dominated evaluations, optionally restricted to one features
    /// binding.
    fn optimums(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation>;

    /// An optional suggestion policy; `None` delegates to the default
    /// policy of picking among the partition's optimums.
    fn suggest(&mut self, features: &Features) -> Option<Result<Configuration>> {
        let _ = features;
        None
    }
}

/// A features tuner driven by a [`FeaturesTunerStrategy`].
pub struct UserDefinedFeaturesTuner {
    name: String,
    configuration_space: Arc<ConfigurationSpace>,
    objective_space: Arc<ObjectiveSpace>,
    features_space: Arc<FeaturesSpace>,
    strategy: Box<dyn FeaturesTunerStrategy>,
}

impl UserDefinedFeaturesTuner {
    /// Creates a tuner delegating policy to `strategy`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        configuration_space: Arc<ConfigurationSpace>,
        objective_space: Arc<ObjectiveSpace>,
        features_space: Arc<FeaturesSpace>,
        strategy: Box<dyn FeaturesTunerStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            configuration_space,
            objective_space,
            features_space,
            strategy,
        }
    }
}

impl FeaturesTuner for UserDefinedFeaturesTuner {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration_space(&self) -> &Arc<ConfigurationSpace> {
        &self.configuration_space
    }

    fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    fn features_space(&self) -> &Arc<FeaturesSpace> {
        &self.features_space
    }

    fn ask(&mut self, features: &Features, count: usize) -> Result<Vec<Configuration>> {
        check_features(&self.features_space, features)?;
        let configurations = self.strategy.ask(features, count)?;
        if configurations.len() > count {
            return Err(Error::InvalidTuner(
                "strategy returned more configurations than requested",
            ));
        }
        for configuration in &configurations {
            if !same_space(configuration.space(), &self.configuration_space) {
                return Err(Error::InvalidTuner(
                    "strategy returned a configuration from a foreign space",
                ));
            }
        }
        Ok(configurations)
    }

    fn tell(&mut self, evaluations: Vec<FeaturesEvaluation>) -> Result<()> {
        for evaluation in &evaluations {
            check_ownership(
                &self.configuration_space,
                &self.objective_space,
                evaluation.evaluation(),
            )?;
            check_features(&self.features_space, evaluation.features())?;
        }
        self.strategy.tell(evaluations)
    }

    fn history(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
        self.strategy.history(features)
    }

    fn optimums(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
        self.strategy.optimums(features)
    }

    fn suggest(&mut self, features: &Features) -> Result<Configuration> {
        check_features(&self.features_space, features)?;
        if let Some(suggestion) = self.strategy.suggest(features) {
            let configuration = suggestion?;
            if !same_space(configuration.space(), &self.configuration_space) {
                return Err(Error::InvalidTuner(
                    "strategy suggested a configuration from a foreign space",
                ));
            }
            return Ok(configuration);
        }
        let partition = self.strategy.optimums(Some(features));
        match suggest_among(&partition, |evaluation| {
            evaluation.evaluation().configuration()
        }) {
            Some(configuration) => Ok(configuration),
            None => self
                .ask(features, 1)?
                .pop()
                .ok_or(Error::SamplingUnsuccessful),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Datum;
    use crate::evaluation::Evaluation;
    use crate::expression::Expression;
    use crate::hyperparameter::Hyperparameter;
    use crate::types::Direction;

    fn spaces() -> (
        Arc<ConfigurationSpace>,
        Arc<ObjectiveSpace>,
        Arc<FeaturesSpace>,
    ) {
        let mut cs = ConfigurationSpace::with_seed("cs", 17);
        cs.add_hyperparameter(Hyperparameter::float("x", -5.0, 5.0).unwrap())
            .unwrap();
        let mut os = ObjectiveSpace::new("os");
        os.add_hyperparameter(Hyperparameter::float("y", -1e6, 1e6).unwrap())
            .unwrap();
        os.add_objective(Expression::variable(0), Direction::Minimize)
            .unwrap();
        let mut fs = FeaturesSpace::new("fs");
        fs.add_hyperparameter(Hyperparameter::int("node", 0, 4).unwrap())
            .unwrap();
        (Arc::new(cs), Arc::new(os), Arc::new(fs))
    }

    fn evaluate(
        os: &Arc<ObjectiveSpace>,
        configuration: Configuration,
        features: Features,
        offset: f64,
    ) -> FeaturesEvaluation {
        let Datum::Float(x) = configuration.values()[0].clone() else {
            panic!("float hyperparameter");
        };
        FeaturesEvaluation::new(
            Arc::clone(os),
            configuration,
            features,
            vec![Datum::Float((x - offset).powi(2))],
        )
        .unwrap()
    }

    #[test]
    fn partitions_keep_independent_optimums() {
        let (cs, os, fs) = spaces();
        let node0 = Features::new(Arc::clone(&fs), vec![Datum::Int(0)]).unwrap();
        let node1 = Features::new(Arc::clone(&fs), vec![Datum::Int(1)]).unwrap();
        let mut tuner = RandomFeaturesTuner::new(
            "random",
            Arc::clone(&cs),
            Arc::clone(&os),
            Arc::clone(&fs),
        );

        for features in [&node0, &node1] {
            let evaluations: Vec<_> = tuner
                .ask(features, 20)
                .unwrap()
                .into_iter()
                .map(|c| evaluate(&os, c, features.clone(), 0.0))
                .collect();
            tuner.tell(evaluations).unwrap();
        }

        assert_eq!(tuner.history(None).len(), 40);
        assert_eq!(tuner.history(Some(&node0)).len(), 20);
        // One minimized objective per partition: one optimum each.
        assert_eq!(tuner.optimums(Some(&node0)).len(), 1);
        assert_eq!(tuner.optimums(Some(&node1)).len(), 1);
        assert_eq!(tuner.optimums(None).len(), 2);

        let suggested = tuner.suggest(&node0).unwrap();
        assert_eq!(
            &suggested,
            tuner.optimums(Some(&node0))[0].evaluation().configuration()
        );
    }

    #[test]
    fn foreign_features_are_rejected() {
        let (cs, os, fs) = spaces();
        let (_, _, foreign_fs) = spaces();
        let mut tuner =
            RandomFeaturesTuner::new("random", Arc::clone(&cs), Arc::clone(&os), fs);
        let foreign = Features::new(foreign_fs, vec![Datum::Int(0)]).unwrap();
        assert!(matches!(
            tuner.ask(&foreign, 1),
            Err(Error::InvalidFeatures(_))
        ));
        let evaluation = evaluate(
            &os,
            Configuration::sample(&cs).unwrap(),
            foreign.clone(),
            0.0,
        );
        assert!(matches!(
            tuner.tell(vec![evaluation]),
            Err(Error::InvalidFeatures(_))
        ));
        assert!(tuner.history(None).is_empty());
    }

    #[test]
    fn suggest_samples_for_untold_partitions() {
        let (cs, os, fs) = spaces();
        let mut tuner = RandomFeaturesTuner::new("random", cs, os, Arc::clone(&fs));
        let features = Features::new(fs, vec![Datum::Int(3)]).unwrap();
        tuner.suggest(&features).unwrap().check().unwrap();
    }

    struct RecordingStrategy {
        configuration_space: Arc<ConfigurationSpace>,
        history: Vec<FeaturesEvaluation>,
        optimums: Vec<FeaturesEvaluation>,
    }

    impl FeaturesTunerStrategy for RecordingStrategy {
        fn ask(&mut self, _features: &Features, count: usize) -> Result<Vec<Configuration>> {
            Configuration::samples(&self.configuration_space, count)
        }

        fn tell(&mut self, evaluations: Vec<FeaturesEvaluation>) -> Result<()> {
            for evaluation in evaluations {
                self.history.push(evaluation.clone());
                update_optimums(&mut self.optimums, evaluation, FeaturesEvaluation::compare);
            }
            Ok(())
        }

        fn history(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
            filtered(&self.history, features)
        }

        fn optimums(&self, features: Option<&Features>) -> Vec<FeaturesEvaluation> {
            filtered(&self.optimums, features)
        }
    }

    #[test]
    fn user_defined_features_tuner_round_trip() {
        let (cs, os, fs) = spaces();
        let strategy = RecordingStrategy {
            configuration_space: Arc::clone(&cs),
            history: Vec::new(),
            optimums: Vec::new(),
        };
        let mut tuner = UserDefinedFeaturesTuner::new(
            "recording",
            Arc::clone(&cs),
            Arc::clone(&os),
            Arc::clone(&fs),
            Box::new(strategy),
        );
        let features = Features::new(Arc::clone(&fs), vec![Datum::Int(2)]).unwrap();
        let evaluations: Vec<_> = tuner
            .ask(&features, 10)
            .unwrap()
            .into_iter()
            .map(|c| evaluate(&os, c, features.clone(), 1.0))
            .collect();
        tuner.tell(evaluations).unwrap();
        assert_eq!(tuner.history(Some(&features)).len(), 10);
        assert_eq!(tuner.optimums(Some(&features)).len(), 1);
        tuner.suggest(&features).unwrap().check().unwrap();
    }
}
