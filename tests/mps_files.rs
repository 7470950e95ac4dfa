use std::path::PathBuf;

use float_eq::assert_float_eq;
use mip_lp::mps::{read_mps_file, MpsError, MpsFormat};
use mip_lp::{ObjectiveDirection, SolveConfig, SolveStatus, ToleranceContext};

fn data(file: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data", file]
        .iter()
        .collect()
}

#[test]
fn small_mip() {
    let mut parsed = read_mps_file(data("small_mip.mps"), MpsFormat::Free).unwrap();
    assert_eq!(parsed.name, "SMALLMIP");
    assert_eq!(parsed.objective_name, "profit");
    assert_eq!(parsed.direction, ObjectiveDirection::Maximisation);
    assert_eq!(parsed.model.len(), 2);
    assert_eq!(parsed.model.num_constraints(), 2);
    assert!(parsed.model.has_integer_variables());

    let relaxed = parsed
        .model
        .solve(parsed.direction, &SolveConfig::default().relaxed());
    assert_float_eq!(relaxed.objective(), 41.25, abs <= 1e-9);

    let result = parsed.optimise(&SolveConfig::default());
    assert_eq!(result.status(), SolveStatus::Optimal);
    assert_float_eq!(result.objective(), 40., abs <= 1e-9);
    assert_eq!(result.value_of("x"), Some(5.));
    assert_eq!(result.value_of("y"), Some(0.));
    assert!(parsed.model.validate(&ToleranceContext::new(7, 6)));
}

#[test]
fn validate_a_known_solution() {
    let mut parsed = read_mps_file(data("small_mip.mps"), MpsFormat::Free).unwrap();
    let context = ToleranceContext::new(7, 6);
    assert!(parsed.model.set_value("x", 5.));
    assert!(parsed.model.set_value("y", 0.));
    assert!(parsed.model.validate(&context));

    // the budget row is tight: nudging x breaks it
    parsed.model.set_value("x", 5. + 1e-3);
    let report = parsed.model.validation_report(&context, true);
    assert!(!report.is_valid());
    assert_eq!(report.violations().len(), 2, "{}", report);
    assert!(!parsed.model.set_value("z", 1.));
}

#[test]
fn fixed_format_lp() {
    let mut parsed = read_mps_file(data("chvatal_fixed.mps"), MpsFormat::Fixed).unwrap();
    assert_eq!(parsed.name, "CHVATAL");
    assert_eq!(parsed.direction, ObjectiveDirection::Minimisation);
    assert!(parsed.model.variable("x 2").is_some());
    assert!(parsed.model.constraint_by_name("res 3").is_some());
    let result = parsed.optimise(&SolveConfig::default());
    assert_eq!(result.status(), SolveStatus::Optimal);
    assert_float_eq!(result.objective(), -13., abs <= 1e-9);
    assert_float_eq!(result.value_of("x 1").unwrap(), 2., abs <= 1e-9);
    assert_float_eq!(result.value_of("x 2").unwrap(), 0., abs <= 1e-9);
    assert_float_eq!(result.value_of("x 3").unwrap(), 1., abs <= 1e-9);
    assert!(parsed.model.validate(&ToleranceContext::new(7, 6)));
}

#[test]
fn fixed_file_read_as_free() {
    // names containing spaces make no sense in the free format
    let error = read_mps_file(data("chvatal_fixed.mps"), MpsFormat::Free).unwrap_err();
    assert!(matches!(error, MpsError::Format { .. }), "{}", error);
}

#[test]
fn missing_file() {
    let error = read_mps_file(data("does_not_exist.mps"), MpsFormat::Free).unwrap_err();
    assert!(matches!(error, MpsError::Io(_)));
    assert!(std::error::Error::source(&error).is_some());
}
