//! Sampling tests: every hyperparameter variant draws values its own
//! domain accepts.

use tunespace::{Datum, Distribution, Hyperparameter, Numeric, ScaleType};

const DRAWS: usize = 10_000;

fn assert_draws_check(hp: &Hyperparameter, seed: u64) {
    let dist = hp.default_distribution().unwrap();
    let mut rng = fastrand::Rng::with_seed(seed);
    for _ in 0..DRAWS {
        let value = hp.sample(&dist, &mut rng).unwrap();
        assert!(
            hp.check_value(&value),
            "{} rejected its own draw {value:?}",
            hp.name()
        );
    }
}

#[test]
fn float_draws_satisfy_check() {
    assert_draws_check(&Hyperparameter::float("x", -3.5, 7.25).unwrap(), 1);
}

#[test]
fn int_draws_satisfy_check() {
    assert_draws_check(&Hyperparameter::int("n", -20, 20).unwrap(), 2);
}

#[test]
fn quantized_draws_satisfy_check() {
    assert_draws_check(
        &Hyperparameter::float("q", 0.0, 1.0).unwrap().quantization(0.125).unwrap(),
        3,
    );
}

#[test]
fn categorical_draws_satisfy_check() {
    assert_draws_check(
        &Hyperparameter::categorical(
            "c",
            vec![Datum::from("relu"), Datum::from("tanh"), Datum::Bool(true), Datum::Int(4)],
        )
        .unwrap(),
        4,
    );
}

#[test]
fn ordinal_draws_satisfy_check() {
    assert_draws_check(
        &Hyperparameter::ordinal(
            "o",
            vec![Datum::from("low"), Datum::from("mid"), Datum::from("high")],
        )
        .unwrap(),
        5,
    );
}

#[test]
fn discrete_draws_satisfy_check() {
    assert_draws_check(
        &Hyperparameter::discrete(
            "d",
            vec![Numeric::Int(1), Numeric::Int(2), Numeric::Int(4), Numeric::Int(8)],
        )
        .unwrap(),
        6,
    );
}

#[test]
fn quantized_int_draws_stay_on_the_grid() {
    let hp = Hyperparameter::int("n", 0, 10).unwrap().quantization(3.0).unwrap();
    let dist = hp.default_distribution().unwrap();
    let mut rng = fastrand::Rng::with_seed(7);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..DRAWS {
        let Datum::Int(v) = hp.sample(&dist, &mut rng).unwrap() else {
            panic!("integer domain drew a non-integer");
        };
        assert!([0, 3, 6, 9].contains(&v), "off-grid draw {v}");
        seen.insert(v);
    }
    assert_eq!(seen.len(), 4, "all grid points should eventually appear");
}

#[test]
fn explicit_distributions_respect_the_domain() {
    // A normal distribution much wider than the domain accepts only a few
    // percent of its draws here; rejection must still deliver every value.
    let hp = Hyperparameter::float("x", 0.0, 1.0).unwrap();
    let wide = Distribution::normal_float(0.5, 10.0).unwrap();
    let mut rng = fastrand::Rng::with_seed(8);
    for _ in 0..DRAWS {
        let value = hp.sample(&wide, &mut rng).unwrap();
        assert!(hp.check_value(&value));
    }
}

#[test]
fn quantized_domain_with_explicit_distribution_stays_on_grid() {
    use std::sync::Arc;
    use tunespace::{Configuration, ConfigurationSpace};

    // The distribution knows nothing about the grid; the domain snaps its
    // draws, so sampled configurations always pass their own check.
    let mut space = ConfigurationSpace::with_seed("quantized", 10);
    space
        .add_hyperparameter_with_distribution(
            Hyperparameter::float("q", 0.0, 1.0).unwrap().quantization(0.5).unwrap(),
            Distribution::uniform_float(0.0, 1.0).unwrap(),
        )
        .unwrap();
    let space = Arc::new(space);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        let config = Configuration::sample(&space).unwrap();
        config.check().unwrap();
        let Datum::Float(v) = config.values()[0] else {
            panic!("float domain drew a non-float");
        };
        assert!(
            [0.0, 0.5, 1.0].contains(&v),
            "off-grid draw {v}"
        );
        seen.insert(v.to_bits());
    }
    assert_eq!(seen.len(), 3, "all grid points should eventually appear");
}

#[test]
fn log_scale_draws_stay_in_bounds() {
    let hp = Hyperparameter::float("lr", 1e-5, 1e-1).unwrap();
    let dist = Distribution::uniform_float(1e-5, 1e-1)
        .unwrap()
        .scale(ScaleType::Logarithmic)
        .unwrap();
    let mut rng = fastrand::Rng::with_seed(9);
    let mut below_mid = 0usize;
    for _ in 0..DRAWS {
        let value = hp.sample(&dist, &mut rng).unwrap();
        assert!(hp.check_value(&value));
        if value.as_f64().unwrap() < 1e-3 {
            below_mid += 1;
        }
    }
    // Log-uniform mass is split at the geometric midpoint, not the
    // arithmetic one.
    assert!(below_mid > DRAWS / 3, "only {below_mid} draws below 1e-3");
}
