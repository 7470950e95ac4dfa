use float_eq::assert_float_eq;
use mip_lp::{constraint, variable, Expression, Model, Solution, SolveConfig, SolveStatus};

const BIG_NUM: usize = 200; // <- Set this higher to test how the simplex scales

#[test]
fn solve_large_problem() {
    let mut model = Model::new();
    let min = -((BIG_NUM / 2) as f64);
    let max = (BIG_NUM / 2 - 1) as f64;
    let v = model
        .add_vector("v", variable().min(min).max(max), BIG_NUM)
        .unwrap();
    let objective: Expression = v.iter().sum();
    model.set_objective(objective);
    for vs in v.windows(2) {
        model.add_constraint(constraint!(vs[0] + 1 <= vs[1])).unwrap();
    }
    let sol = model.maximise(&SolveConfig::default());
    assert_eq!(sol.status(), SolveStatus::Optimal);
    for (i, var) in v.iter().enumerate() {
        assert_float_eq!(sol.value(*var), min + i as f64, abs <= 1e-7);
    }
}

#[test]
fn add_10_000_constraints() {
    let mut model = Model::new();
    let v = model.add_vector("v", variable(), 10_000).unwrap();
    model.set_objective(v[0]);
    for vs in v.windows(2) {
        model.add_constraint(constraint!(vs[0] + 1 <= vs[1])).unwrap();
    }
    assert_eq!(model.num_constraints(), 9_999);
    assert_eq!(model.name(v[9_999]), "v9999");
}

#[test]
fn sum_binaries() {
    let mut model = Model::new();
    let team1_bools = model.add_vector("t", variable().binary(), BIG_NUM).unwrap();
    let team1_score: Expression = team1_bools.iter().sum();
    model.add_constraint(constraint!(team1_score == 5)).unwrap();
    model.set_objective(team1_bools[0]);
    let sol = model.minimise(&SolveConfig::default());
    assert_eq!(sol.status(), SolveStatus::Optimal);
    assert_float_eq!(sol.value(team1_bools[0]), 0., abs <= 1e-9);
    assert_float_eq!(sol.values().iter().sum::<f64>(), 5., abs <= 1e-7);
}
