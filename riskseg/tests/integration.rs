//! Integration tests for riskseg
//!
//! These tests verify the end-to-end behavior of segment testing, from raw
//! records to rendered reports.

use clap::Parser;
use riskseg::{
    BatteryConfig, Dataset, Interpretation, OutcomeStatus, Scenario, Schema, SegmentTester,
    TestError, TestKind, Value, columns, generate_json_report, interpret,
};
use riskseg_cli::{Cli, RisksegConfig, analyze_dataset, run_with_cli};

fn policy(province: &str, code: &str, gender: &str, premium: f64) -> Vec<(&'static str, Value)> {
    vec![
        (columns::PROVINCE, Value::from(province)),
        (columns::POSTAL_CODE, Value::from(code)),
        (columns::GENDER, Value::from(gender)),
        (columns::TOTAL_PREMIUM, Value::from(premium)),
        (columns::TOTAL_CLAIMS, Value::from(premium / 10.0)),
    ]
}

fn premiums(values: &[f64]) -> Dataset {
    Dataset::from_records(
        Schema::insurance(),
        values
            .iter()
            .map(|p| vec![(columns::TOTAL_PREMIUM, Value::from(*p))]),
    )
    .unwrap()
}

/// Six policies, two per province and postal code, alternating gender
fn sample() -> Dataset {
    Dataset::from_records(
        Schema::insurance(),
        vec![
            policy("A", "123", "Male", 1000.0),
            policy("A", "123", "Female", 1500.0),
            policy("B", "456", "Male", 2000.0),
            policy("B", "456", "Female", 2500.0),
            policy("C", "789", "Male", 3000.0),
            policy("C", "789", "Female", 3500.0),
        ],
    )
    .unwrap()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("riskseg-{}-{}", std::process::id(), name))
}

/// Segments compose exclusion and equality without touching the dataset
#[test]
fn test_segment_exclusion_then_value() {
    let data = Dataset::from_records(
        Schema::insurance(),
        vec![
            policy("A", "1", "Male", 1.0),
            policy("A", "1", "Not Specified", 2.0),
            policy("B", "2", "Female", 3.0),
            policy("B", "2", "Male", 4.0),
        ],
    )
    .unwrap();
    let tester = SegmentTester::new(&data);

    let known = tester
        .segment(columns::GENDER, None, &["Not Specified".into()])
        .unwrap();
    assert_eq!(known.len(), 3);

    let male = tester
        .segment(columns::GENDER, Some(&"Male".into()), &["Not Specified".into()])
        .unwrap();
    assert_eq!(male.row_indices(), &[0, 3]);
    assert_eq!(data.len(), 4);
}

/// A metric with one distinct value is constant; two values are not
#[test]
fn test_constant_metric_detection() {
    let constant = premiums(&[5.0, 5.0, 5.0]);
    let varying = premiums(&[5.0, 5.0, 6.0]);

    assert!(SegmentTester::new(&constant)
        .has_constant_metric(columns::TOTAL_PREMIUM)
        .unwrap());
    assert!(!SegmentTester::new(&varying)
        .has_constant_metric(columns::TOTAL_PREMIUM)
        .unwrap());
}

/// Decision boundaries at the default alpha
#[test]
fn test_interpretation_boundaries() {
    assert_eq!(interpret(Some(0.01), 0.05), Interpretation::Reject);
    assert_eq!(interpret(Some(0.10), 0.05), Interpretation::FailToReject);
    assert_eq!(interpret(Some(0.05), 0.05), Interpretation::FailToReject);
    assert_eq!(interpret(Some(f64::NAN), 0.05), Interpretation::FailToReject);
    assert_eq!(interpret(None, 0.05), Interpretation::Skipped);
    assert_eq!(
        interpret(None, 0.05).to_string(),
        "Test skipped due to identical values."
    );
}

/// A 2x2 table [[10, 10], [20, 0]] gives chi2 = 10.8 with Yates' correction
#[test]
fn test_chi_squared_two_by_two() {
    let mut records = Vec::new();
    records.extend((0..10).map(|_| policy("X", "1", "Male", 1.0)));
    records.extend((0..10).map(|_| policy("X", "1", "Female", 1.0)));
    records.extend((0..20).map(|_| policy("Y", "1", "Male", 1.0)));
    let data = Dataset::from_records(Schema::insurance(), records).unwrap();

    let result = SegmentTester::new(&data)
        .categorical_association_test(columns::PROVINCE, columns::GENDER)
        .unwrap();

    assert_eq!(result.kind, TestKind::ChiSquared);
    assert_eq!(result.degrees_of_freedom, Some(1.0));
    assert!((result.statistic.unwrap() - 10.8).abs() < 1e-9);
    let p = result.p_value.unwrap();
    assert!((p - 0.001_015_1).abs() < 1e-5, "p = {}", p);
    assert_eq!(result.interpretation, Interpretation::Reject);
}

/// Unknown columns are reported, not panicked on
#[test]
fn test_unknown_feature_column() {
    let data = sample();
    let result = SegmentTester::new(&data).categorical_association_test("Region", columns::TOTAL_PREMIUM);
    assert_eq!(
        result,
        Err(TestError::ColumnNotFound {
            column: "Region".to_string()
        })
    );
}

/// Both groups above 30 observations switch the margin scenario to a z-test
#[test]
fn test_large_groups_use_z_test() {
    let mut records = Vec::new();
    for i in 0..40 {
        let gender = if i % 2 == 0 { "Male" } else { "Female" };
        records.push(policy("A", "1000", gender, 100.0 + i as f64));
        records.push(policy("B", "2000", gender, 150.0 + i as f64));
    }
    let data = Dataset::from_records(Schema::insurance(), records).unwrap();
    let battery = SegmentTester::new(&data).run_battery(&BatteryConfig::default());

    let margin = battery.outcome(Scenario::PostalCodeMargin).unwrap();
    let result = margin.result.as_ref().unwrap();
    assert_eq!(result.kind, TestKind::ZTest);
    assert!(margin.text.starts_with("Z-test on TotalPremium: Z-statistic = -"));
    assert_eq!(result.interpretation, Interpretation::Reject);
}

/// A dataset with a single gender cannot run the gender scenario
#[test]
fn test_battery_with_single_gender() {
    let data = Dataset::from_records(
        Schema::insurance(),
        vec![
            policy("A", "1", "Female", 10.0),
            policy("B", "2", "Female", 20.0),
            policy("B", "2", "Female", 25.0),
        ],
    )
    .unwrap();
    let battery = SegmentTester::new(&data).run_battery(&BatteryConfig::default());

    assert_eq!(battery.outcomes.len(), 4);
    let gender = battery.outcome(Scenario::GenderRisk).unwrap();
    assert_eq!(gender.status, OutcomeStatus::Unavailable);
    assert!(gender.text.contains("Test cannot be performed"));
}

/// A NaN premium is treated as missing, not tested as a number
#[test]
fn test_nan_premium_is_ignored_by_gender_test() {
    let row = |gender: &str, premium: f64| {
        vec![
            Value::from("A"),
            Value::from("1"),
            Value::from(gender),
            Value::Number(premium),
            Value::Missing,
        ]
    };
    let data = Dataset::new(
        Schema::insurance(),
        vec![
            row("Male", 1000.0),
            row("Male", f64::NAN),
            row("Male", 3000.0),
            row("Female", 1500.0),
            row("Female", 2500.0),
            row("Female", 3500.0),
        ],
    )
    .unwrap();

    assert!(data
        .missing_summary()
        .iter()
        .any(|m| m.column == columns::TOTAL_PREMIUM && m.missing_count == 1));

    let battery = SegmentTester::new(&data).run_battery(&BatteryConfig::default());
    let gender = battery.outcome(Scenario::GenderRisk).unwrap();
    let result = gender.result.as_ref().unwrap();
    assert_eq!(gender.status, OutcomeStatus::Completed);
    assert!(result.statistic.unwrap().is_finite());
    assert!(result.p_value.unwrap().is_finite());
}

/// Running the battery twice yields the same results
#[test]
fn test_battery_is_idempotent() {
    let data = sample();
    let tester = SegmentTester::new(&data);

    let first = tester.run_battery(&BatteryConfig::default());
    let second = tester.run_battery(&BatteryConfig::default());
    assert_eq!(first, second);
    assert_eq!(first.to_map().len(), 4);
    assert_eq!(data.len(), 6);
}

/// Missing-value summary over a JSON dataset
#[test]
fn test_missing_summary_from_json() {
    let json = r#"[
        {"Province": "Gauteng", "PostalCode": 2000, "Gender": "Male", "TotalPremium": 21.9, "TotalClaims": 0},
        {"Province": "Gauteng", "PostalCode": 2000, "Gender": null, "TotalPremium": 0.0},
        {"Province": null, "PostalCode": 122, "Gender": null, "TotalPremium": 5.5, "TotalClaims": 0}
    ]"#;
    let data = Dataset::from_json_str(Schema::insurance(), json).unwrap();
    let missing = data.missing_summary();

    let names: Vec<&str> = missing.iter().map(|m| m.column.as_str()).collect();
    assert_eq!(names, vec!["Gender", "Province", "TotalClaims"]);
    assert_eq!(missing[0].missing_count, 2);
    assert!((missing[1].percentage - 100.0 / 3.0).abs() < 1e-9);
}

/// The analysis report serializes every scenario to JSON
#[test]
fn test_report_json() {
    let data = sample();
    let report = analyze_dataset(&data, &RisksegConfig::default());
    let json = generate_json_report(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let scenarios = parsed["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 4);
    assert_eq!(scenarios[0]["title"], "Risk Differences Across Provinces");
    assert_eq!(scenarios[3]["test"], "t-test");
    assert_eq!(parsed["meta"]["rows"], 6);
}

/// CLI run from a dataset file to a JSON report file
#[test]
fn test_cli_end_to_end() {
    let input = temp_path("input.json");
    let output = temp_path("report.json");
    std::fs::write(
        &input,
        r#"[
            {"Province": "A", "PostalCode": "123", "Gender": "Male", "TotalPremium": 1000},
            {"Province": "A", "PostalCode": "123", "Gender": "Female", "TotalPremium": 1500},
            {"Province": "B", "PostalCode": "456", "Gender": "Male", "TotalPremium": 2000},
            {"Province": "B", "PostalCode": "456", "Gender": "Female", "TotalPremium": 2500}
        ]"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "riskseg",
        "run",
        input.to_str().unwrap(),
        "--format",
        "json",
        "--output",
        output.to_str().unwrap(),
        "--alpha",
        "0.1",
    ])
    .unwrap();
    run_with_cli(cli).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["meta"]["alpha"], 0.1);
    assert_eq!(report["scenarios"].as_array().unwrap().len(), 4);

    std::fs::remove_file(&input).ok();
    std::fs::remove_file(&output).ok();
}

/// A missing input file is an error, not a panic
#[test]
fn test_cli_missing_input() {
    let cli = Cli::try_parse_from(["riskseg", "run", "/nonexistent/riskseg/input.json"]).unwrap();
    let err = run_with_cli(cli).unwrap_err();
    assert!(err.to_string().contains("Failed to open dataset"));
}
