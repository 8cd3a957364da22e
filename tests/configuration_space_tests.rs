//! Conditional activation and forbidden clause tests over whole spaces.

use std::sync::Arc;

use tunespace::{
    Configuration, ConfigurationSpace, Datum, Error, Expression, Hyperparameter,
};

/// A space where `b` is only active when `a` is true.
fn gated_space(seed: u64) -> Arc<ConfigurationSpace> {
    let mut space = ConfigurationSpace::with_seed("gated", seed);
    let a = space
        .add_hyperparameter(
            Hyperparameter::categorical("a", vec![Datum::Bool(false), Datum::Bool(true)]).unwrap(),
        )
        .unwrap();
    let b = space
        .add_hyperparameter(Hyperparameter::float("b", 0.0, 1.0).unwrap())
        .unwrap();
    space
        .set_condition(b, Expression::variable(a).equal(Expression::literal(true)))
        .unwrap();
    Arc::new(space)
}

#[test]
fn inactive_when_the_gate_is_closed() {
    let space = gated_space(21);
    for _ in 0..1000 {
        let config = Configuration::sample(&space).unwrap();
        match config.value_by_name("a").unwrap() {
            Datum::Bool(false) => {
                assert!(config.value_by_name("b").unwrap().is_inactive());
            }
            Datum::Bool(true) => {
                assert!(matches!(config.value_by_name("b").unwrap(), Datum::Float(_)));
            }
            other => panic!("unexpected gate value {other:?}"),
        }
    }
}

#[test]
fn hand_built_config_cannot_set_an_inactive_value() {
    let space = gated_space(22);
    let err = Configuration::new(
        Arc::clone(&space),
        vec![Datum::Bool(false), Datum::Float(0.5)],
    )
    .unwrap_err();
    assert!(matches!(err, Error::InactiveHyperparameter(name) if name == "b"));

    // The matching valid bindings pass.
    Configuration::new(
        Arc::clone(&space),
        vec![Datum::Bool(false), Datum::Inactive],
    )
    .unwrap();
    Configuration::new(space, vec![Datum::Bool(true), Datum::Float(0.5)]).unwrap();
}

#[test]
fn transitive_gating() {
    // c depends on b, which depends on a.
    let mut space = ConfigurationSpace::with_seed("chain", 23);
    let a = space
        .add_hyperparameter(Hyperparameter::int("a", 0, 1).unwrap())
        .unwrap();
    let b = space
        .add_hyperparameter(Hyperparameter::int("b", 0, 1).unwrap())
        .unwrap();
    let c = space
        .add_hyperparameter(Hyperparameter::int("c", 0, 1).unwrap())
        .unwrap();
    space
        .set_condition(b, Expression::variable(a).equal(Expression::literal(1i64)))
        .unwrap();
    space
        .set_condition(c, Expression::variable(b).equal(Expression::literal(1i64)))
        .unwrap();
    let space = Arc::new(space);
    for _ in 0..1000 {
        let config = Configuration::sample(&space).unwrap();
        let values = config.values();
        if values[0] != Datum::Int(1) {
            assert!(values[1].is_inactive());
            // The condition on c sees an inactive b, so c is inactive too.
            assert!(values[2].is_inactive());
        } else if values[1] != Datum::Int(1) {
            assert!(values[2].is_inactive());
        }
        config.check().unwrap();
    }
}

#[test]
fn forbidden_pairs_are_never_sampled() {
    let mut space = ConfigurationSpace::with_seed("forbidden", 24);
    let a = space
        .add_hyperparameter(Hyperparameter::int("a", 0, 4).unwrap())
        .unwrap();
    let b = space
        .add_hyperparameter(Hyperparameter::int("b", 0, 4).unwrap())
        .unwrap();
    space
        .add_forbidden_clause(Expression::variable(a).equal(Expression::variable(b)))
        .unwrap();
    let space = Arc::new(space);
    for _ in 0..10_000 {
        let config = Configuration::sample(&space).unwrap();
        assert_ne!(config.values()[0], config.values()[1]);
    }
    assert!(matches!(
        Configuration::new(space, vec![Datum::Int(3), Datum::Int(3)]),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn forbidden_clause_over_an_inactive_slot_does_not_trigger() {
    let mut space = ConfigurationSpace::with_seed("gated-forbidden", 25);
    let a = space
        .add_hyperparameter(
            Hyperparameter::categorical("a", vec![Datum::Bool(false), Datum::Bool(true)]).unwrap(),
        )
        .unwrap();
    let b = space
        .add_hyperparameter(Hyperparameter::int("b", 0, 4).unwrap())
        .unwrap();
    space
        .set_condition(b, Expression::variable(a).equal(Expression::literal(true)))
        .unwrap();
    // Arithmetic over b fails when b is inactive; the clause counts as not
    // triggered in that case.
    space
        .add_forbidden_clause(
            Expression::variable(b)
                .add(Expression::literal(0i64))
                .greater(Expression::literal(2i64)),
        )
        .unwrap();
    let space = Arc::new(space);
    for _ in 0..1000 {
        let config = Configuration::sample(&space).unwrap();
        if let Datum::Int(v) = config.values()[1] {
            assert!(v <= 2);
        }
    }
    Configuration::new(space, vec![Datum::Bool(false), Datum::Inactive]).unwrap();
}

#[test]
fn string_hyperparameters_validate_but_do_not_sample() {
    let mut space = ConfigurationSpace::new("strings");
    space
        .add_hyperparameter(Hyperparameter::int("n", 0, 4).unwrap())
        .unwrap();
    space
        .add_hyperparameter(Hyperparameter::string("tag"))
        .unwrap();
    let space = Arc::new(space);
    assert!(matches!(
        Configuration::sample(&space),
        Err(Error::UnsupportedOperation(_))
    ));
    Configuration::new(space, vec![Datum::Int(2), Datum::from("baseline")]).unwrap();
}
