//! Tests for verification oracles and document reports.

use brick_types::{ColorCode, Element, Model, PartPlacement, Vec3};
use file_format::serialize_model;
use test_harness::assertions::{assert_all_pass, assert_placement_count};
use test_harness::helpers::{small_car, stacked_model};
use test_harness::oracle::*;
use test_harness::{DocumentReport, HarnessError};

// ── Document Oracle Tests ───────────────────────────────────────────────

#[test]
fn serialized_car_passes_every_check() {
    let verdicts = run_model_checks(small_car().model());
    for v in &verdicts {
        assert!(v.passed, "{} failed: {}", v.oracle_name, v.detail);
    }
    assert_eq!(verdicts.len(), 6);
}

#[test]
fn missing_trailing_step_is_caught() {
    let text = "0 T\n1 4 0 0 0 1 0 0 0 1 0 0 0 1 3001.dat\n";
    assert!(!check_trailing_step(text).passed);
    assert!(!check_trailing_step("").passed);
}

#[test]
fn doubled_steps_are_caught() {
    let text = "1 4 0 0 0 1 0 0 0 1 0 0 0 1 3001.dat\n0 STEP\n0 STEP\n";
    let verdict = check_step_spacing(text);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("2 step lines"));
}

#[test]
fn short_placement_fails_strict_parse() {
    let verdict = check_strict_parse("1 4 0 0\n0 STEP\n");
    assert!(!verdict.passed);
}

#[test]
fn colored_wheel_is_caught() {
    let text = "1 4 0 0 0 1 0 0 0 1 0 0 0 1 3641.dat\n0 STEP\n";
    let verdict = check_part_color(text, "3641.dat", ColorCode::BLACK);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("[0]"));
}

#[test]
fn round_trip_holds_for_large_stacks() {
    let model = stacked_model(200);
    assert!(check_round_trip(&model).passed);
    assert!(check_idempotent(&model).passed);
}

#[test]
fn round_trip_reports_mismatch_for_nan() {
    let mut model = Model::new("NaN", "me");
    model.elements.push(Element::Part(PartPlacement::new(
        "3001",
        ColorCode(4),
        Vec3::new(f64::NAN, 0.0, 0.0),
    )));
    // NaN never equals itself, so the placement cannot compare equal.
    assert!(!check_round_trip(&model).passed);
}

// ── Assertion Tests ─────────────────────────────────────────────────────

#[test]
fn placement_count_assertion_includes_report() {
    let text = serialize_model(small_car().model());
    assert!(assert_placement_count(&text, 4, "car").is_ok());
    match assert_placement_count(&text, 5, "car") {
        Err(HarnessError::AssertionFailed { detail }) => {
            assert!(detail.contains("[car] expected 5 placements, got 4"));
            assert!(detail.contains("Brickyard Document Report"));
        }
        other => panic!("expected AssertionFailed, got {other:?}"),
    }
}

#[test]
fn all_pass_reports_first_failure() {
    let verdicts = run_document_checks("1 4 0 0 0 1 0 0 0 1 0 0 0 1 3001.dat\n");
    match assert_all_pass(&verdicts) {
        Err(HarnessError::OracleFailure { oracle, .. }) => assert_eq!(oracle, "trailing_step"),
        other => panic!("expected OracleFailure, got {other:?}"),
    }
}

// ── Report Tests ────────────────────────────────────────────────────────

#[test]
fn report_summarizes_the_car() {
    let text = serialize_model(small_car().model());
    let report = DocumentReport::from_document(&text);
    assert_eq!(report.title.as_deref(), Some("Small Red Car"));
    assert_eq!(report.placement_count, 4);
    assert_eq!(report.step_count, 2);
    assert_eq!(report.colors.get(&0), Some(&2));
    assert_eq!(report.colors.get(&4), Some(&2));
    assert_eq!(report.parts.get("3641.dat"), Some(&2));
    assert_eq!(
        report.bounding_box,
        Some(([-30.0, -32.0, 0.0], [30.0, 0.0, 20.0]))
    );

    let rendered = report.with_oracles(run_document_checks(&text)).to_text();
    assert!(rendered.contains("Placements: 4 in 2 steps"));
    assert!(rendered.contains("4 (Red): 2"));
    assert!(rendered.contains("[PASS] trailing_step"));
}

#[test]
fn report_of_empty_text_is_blank() {
    let report = DocumentReport::from_document("");
    assert_eq!(report.placement_count, 0);
    assert!(report.bounding_box.is_none());
    assert!(report.to_text().contains("Title: (none)"));
}

#[test]
fn report_serializes_without_oracles() {
    let text = serialize_model(small_car().model());
    let report = DocumentReport::from_document(&text).with_oracles(run_document_checks(&text));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["placement_count"], 4);
    assert!(json.get("oracle_results").is_none());
}
