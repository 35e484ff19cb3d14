use crate::api::*;
use crate::config::SessionConfig;
use crate::fixed::{Quad, Wide};

#[test]
fn test_contractive_session_tracks_reference() {
    let config = SessionConfig::default().with_learning_rates(Quad::new(
        Wide::from_raw(128),
        Wide::from_raw(128),
        Wide::from_raw(64),
        Wide::from_raw(32),
    ));
    let cmp = compare_with_reference(&config, Quad::new(0, 0, 0, 0)).unwrap();
    assert!(cmp.within_tolerance(), "{cmp:?}");
    assert_eq!(cmp.fixed.outputs.optimal, cmp.reference.best_params);
    assert_eq!(cmp.fixed.outputs.iterations, cmp.reference.iterations);
    assert!(cmp.objective_deviation < 1.0 / 256.0);
}

#[test]
fn test_default_session_tracks_reference() {
    let cmp = compare_with_reference(&SessionConfig::default(), Quad::new(0, 0, 0, 0)).unwrap();
    assert!(cmp.within_tolerance(), "{cmp:?}");
    assert_eq!(cmp.fixed.outputs.min_value, Wide::from_int(-5));
    assert_eq!(cmp.fixed.outputs.optimal, Quad::new(2, 0, -2, 0));
    assert_eq!(cmp.reference.best_params, Quad::new(2, 0, -2, 0));
}

#[test]
fn test_unit_rate_on_a_oscillates_in_both_models() {
    let config = SessionConfig::default().with_learning_rates(Quad::new(
        Wide::from_raw(256),
        Wide::from_raw(128),
        Wide::from_raw(64),
        Wide::from_raw(32),
    ));
    let cmp = compare_with_reference(&config, Quad::new(0, 0, 0, 0)).unwrap();
    assert!(cmp.within_tolerance());
    assert_eq!(cmp.fixed.outputs.min_value, Wide::from_int(-1));
    assert_eq!(cmp.max_param_deviation(), 0.0);
    assert_eq!(cmp.reference.final_params[0], 4.0);
}

#[test]
fn test_saturating_session_leaves_tolerance() {
    let config = SessionConfig::default()
        .with_learning_rates(Quad::new(
            Wide::from_raw(1024),
            Wide::from_raw(128),
            Wide::from_raw(64),
            Wide::from_raw(32),
        ))
        .with_max_iterations(10)
        .unwrap();
    let cmp = compare_with_reference(&config, Quad::new(0, 0, 0, 0)).unwrap();
    assert!(cmp.fixed.outputs.overflow);
    assert!(!cmp.within_tolerance());
}
