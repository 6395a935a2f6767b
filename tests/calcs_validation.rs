use vizlegend::legend::calcs::{StandardCalc, is_known_calc, validate_calcs};
use vizlegend::{LegendDisplayMode, LegendError, LegendPlacement, VizLegendOptions};

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn standard_ids_resolve() {
    for c in StandardCalc::ALL {
        assert_eq!(StandardCalc::from_id(c.id()), Some(c));
        assert!(is_known_calc(c.id()));
    }
    assert_eq!(StandardCalc::from_id("stdDev"), Some(StandardCalc::StdDev));
    assert_eq!(StandardCalc::from_id("stddev"), None);
}

#[test]
fn percentiles_are_known() {
    assert!(is_known_calc("p50"));
    assert!(is_known_calc("p99"));
    assert!(!is_known_calc("p100"));
}

#[test]
fn unknown_ids_reported_in_input_order() {
    let err = validate_calcs(&ids(&["max", "avg", "mean", "p0", "total"])).unwrap_err();
    match err {
        LegendError::UnknownCalcs(unknown) => assert_eq!(unknown, ["avg", "p0", "total"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicates_are_rejected() {
    let err = validate_calcs(&ids(&["max", "min", "max"])).unwrap_err();
    assert!(matches!(err, LegendError::DuplicateCalc(ref c) if c == "max"));
}

#[test]
fn options_validate_forwards_to_registry() {
    let ok = VizLegendOptions::new(["mean", "p95"], LegendDisplayMode::List, LegendPlacement::Bottom);
    assert!(ok.validate().is_ok());
    let bad = VizLegendOptions::new(["average"], LegendDisplayMode::List, LegendPlacement::Bottom);
    assert!(bad.validate().is_err());
}
