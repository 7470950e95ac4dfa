use std::time::Duration;

use mip_lp::{
    constraint, variable, Expression, MipGapError, Model, SolveConfig, SolveStatus,
    TimeLimitError,
};

#[test]
fn mipgap_set() {
    let mut config = SolveConfig::default();
    assert_eq!(config.mip_gap(), None);

    config = config.with_mip_gap(0.0).unwrap();
    assert_eq!(config.mip_gap(), Some(0.0));

    config = config.with_mip_gap(0.5).unwrap();
    assert_eq!(config.mip_gap(), Some(0.5));

    let config_err = config.clone().with_mip_gap(-0.0);
    assert_eq!(config_err, Err(MipGapError::Negative));
    assert_eq!(
        config.with_mip_gap(f32::INFINITY),
        Err(MipGapError::Infinite)
    );
}

#[test]
fn time_limits_set() {
    let config = SolveConfig::default();
    assert_eq!(config.time_suffice(), None);
    assert_eq!(config.time_abort(), None);
    let config = config
        .with_time_limits(Duration::from_secs(1), Duration::from_secs(2))
        .unwrap();
    assert_eq!(config.time_suffice(), Some(Duration::from_secs(1)));
    assert_eq!(config.time_abort(), Some(Duration::from_secs(2)));
    assert!(matches!(
        config.with_time_limits(Duration::from_secs(3), Duration::from_secs(2)),
        Err(TimeLimitError::AbortBeforeSufficiency { .. })
    ));
}

#[test]
fn gap_bounds_the_returned_objective() {
    let mut model = Model::new();
    let items = model.add_vector("item", variable().binary(), 4).unwrap();
    let weight: Expression = items.iter().zip([5., 4., 3., 2.]).map(|(&x, w)| w * x).sum();
    let value: Expression = items.iter().zip([10., 7., 5., 3.]).map(|(&x, v)| v * x).sum();
    model.add_constraint(constraint!(weight <= 10)).unwrap();
    model.set_objective(value);
    for gap in [0.0, 0.1, 0.3, 1.0] {
        let config = SolveConfig::default().with_mip_gap(gap).unwrap();
        let result = model.maximise(&config);
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert!(
            result.objective() * (1. + f64::from(gap)) >= 18. - 1e-9,
            "gap {} gave {}",
            gap,
            result.objective()
        );
    }
}
