use std::time::{Duration, Instant};

use brick_types::ErrorKind;
use file_format::{parse_document, parse_placements};
use script_sandbox::validate::scan;
use script_sandbox::{
    validate_source, Completion, ExecutionRun, ExecutionState, Sandbox, SandboxConfig,
    SandboxError, ThreatCategory,
};

const CAR: &str = r#"
let b = Builder("Small Red Car", "brickyard");
b.set_active_color(COLORS.RED);
b.brick("3001", 0, -24, 0)
 .plate("3020", 0, -32, 0)
 .step()
 .wheel("3641", 30, 0, 20)
 .wheel("3641", 4, -30, 0, 20);
b.save();
"#;

fn sandbox() -> Sandbox {
    Sandbox::new(SandboxConfig::default())
}

// ── Successful runs ──────────────────────────────────────────────────────

#[test]
fn saved_document_is_returned() {
    let sb = sandbox();
    let out = sb.execute(CAR, 2_000).unwrap();
    assert_eq!(out.completion, Completion::Saved);
    assert_eq!(out.placements, 4);

    let doc = parse_document(&out.document);
    assert_eq!(doc.header.title.as_deref(), Some("Small Red Car"));
    let placements: Vec<_> = doc.placements().collect();
    assert_eq!(placements[0].color.value(), 4);
    assert_eq!(placements[0].part.as_str(), "3001.dat");
    // Both wheels are black, whatever color was passed.
    assert_eq!(placements[2].color.value(), 0);
    assert_eq!(placements[3].color.value(), 0);
}

#[test]
fn returned_string_completes_the_run() {
    let src = r#"
        let b = Builder("Returned");
        b.place_part("3001", 1, 0, 0, 0);
        b.to_document()
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    assert_eq!(out.completion, Completion::Returned);
    assert_eq!(out.placements, 1);
}

#[test]
fn returned_builder_is_not_a_document() {
    let src = r#"
        let b = Builder();
        b.brick("3001", 0, 0, 0);
        b
    "#;
    let err = sandbox().execute(src, 1_000).unwrap_err();
    assert!(matches!(err, SandboxError::NoOutput));

    let src = r#"
        let b = Builder();
        b.brick("3001", 0, 0, 0);
        b.to_document()
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    assert_eq!(out.completion, Completion::Returned);
    assert!(out.document.starts_with("0 Untitled\n"));
}

#[test]
fn trailing_mutator_without_save_is_no_output() {
    // The last statement evaluates to the builder; that is not a return.
    for tail in ["b.step();", "b.set_active_color(2);", "b.brick(\"3001\", 0, -24, 0)"] {
        let src = format!("let b = Builder(\"Tail\"); b.brick(\"3001\", 0, 0, 0); {tail}");
        let err = sandbox().execute(&src, 1_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoOutput, "tail {tail:?}");
    }
}

#[test]
fn save_wins_over_return_value() {
    let src = r#"
        let saved = Builder("Saved");
        saved.brick("3001", 0, 0, 0);
        saved.save();
        let other = Builder("Other");
        other.brick("3001", 0, 0, 0).brick("3001", 0, -24, 0);
        other.to_document()
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    assert_eq!(out.completion, Completion::Saved);
    assert!(out.document.starts_with("0 Saved\n"));
}

#[test]
fn last_save_wins() {
    let src = r#"
        let b = Builder("Twice");
        b.brick("3001", 0, 0, 0);
        b.save();
        b.brick("3001", 0, -24, 0);
        b.save();
    "#;
    let mut sink: Vec<String> = Vec::new();
    let out = sandbox().execute_with_sink(src, 1_000, &mut sink).unwrap();
    assert_eq!(out.placements, 2);
    assert_eq!(sink, vec![out.document.clone()]);
}

#[test]
fn chaining_mutates_one_builder() {
    let src = r#"
        let b = Builder("Chain");
        let c = b.brick("3001", 0, 0, 0);
        c.brick("3001", 0, -24, 0);
        b.count_parts()
    "#;
    // An integer result is not a document.
    let err = sandbox().execute(src, 1_000).unwrap_err();
    assert!(matches!(err, SandboxError::NoOutput));

    let src = r#"
        let b = Builder("Chain");
        let c = b.brick("3001", 0, 0, 0);
        c.brick("3001", 0, -24, 0);
        b.to_document()
    "#;
    assert_eq!(sandbox().execute(src, 1_000).unwrap().placements, 2);
}

#[test]
fn fractional_and_integer_coordinates_mix() {
    let src = r#"
        let b = Builder("Mixed");
        b.place_part("3001", 4, 0.5, -8, 20);
        b.to_document()
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    let placements = parse_placements(&out.document);
    assert_eq!(placements[0].position.x, 0.5);
    assert_eq!(placements[0].position.y, -8.0);
}

#[test]
fn allowlisted_import_is_usable() {
    let src = r#"
        import "brickyard" as bricks;
        let b = bricks::Builder("Imported", "me");
        b.brick("3001", bricks::COLORS.BLUE, 0, 0, 0);
        b.save();
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    assert_eq!(parse_placements(&out.document)[0].color.value(), 1);
}

#[test]
fn print_output_is_captured() {
    let src = r#"
        print("building");
        let b = Builder("Logged");
        b.brick("3001", 0, 0, 0);
        b.to_document()
    "#;
    let out = sandbox().execute(src, 1_000).unwrap();
    assert_eq!(out.log, vec!["building".to_string()]);
}

// ── Validation ───────────────────────────────────────────────────────────

#[test]
fn environment_access_is_rejected_before_running() {
    let sb = sandbox();
    let err = sb
        .execute(r#"let home = env("HOME"); Builder(home)"#, 1_000)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        SandboxError::Validation { violations, .. } => {
            assert_eq!(violations[0].category, ThreatCategory::Environment);
            assert_eq!(violations[0].line, 1);
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    let stats = sb.stats();
    assert_eq!(stats.runs_started, 0);
    assert_eq!(stats.rejected, 1);
}

#[test]
fn each_category_is_detected() {
    let cases = [
        ("process.exit(1)", ThreatCategory::Environment),
        ("fs.readFileSync('/etc/passwd')", ThreatCategory::Filesystem),
        ("eval(\"1 + 1\")", ThreatCategory::DynamicCode),
        ("let f = Function(\"return 1\");", ThreatCategory::DynamicCode),
        ("require(\"os\")", ThreatCategory::ModuleLoading),
        ("import \"other\" as o;", ThreatCategory::ModuleLoading),
        ("spawn(\"sh\")", ThreatCategory::ProcessSpawn),
        ("fetch(\"http://example.com\")", ThreatCategory::Network),
    ];
    for (src, category) in cases {
        let hits = scan(src);
        assert!(
            hits.iter().any(|v| v.category == category),
            "{src:?} should hit {category:?}, got {hits:?}"
        );
    }
}

#[test]
fn violations_report_their_line() {
    let hits = scan("let b = Builder();\n\n// eval is banned even here\n");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 3);
}

#[test]
fn only_the_brickyard_import_is_allowed() {
    assert!(scan("import \"brickyard\" as b;\nlet x = b::Builder();").is_empty());
    assert!(!scan("import \"brickyard\" as b;\nimport \"fs\" as f;").is_empty());
}

#[test]
fn zero_deadline_is_a_validation_error() {
    let err = validate_source(CAR, 0, &SandboxConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn oversized_source_is_rejected() {
    let config = SandboxConfig {
        max_source_bytes: 16,
        ..SandboxConfig::default()
    };
    let err = validate_source(CAR, 1_000, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ── Failures ─────────────────────────────────────────────────────────────

#[test]
fn infinite_loop_times_out_near_deadline() {
    let sb = sandbox();
    let started = Instant::now();
    let err = sb.execute("let b = Builder(); loop { b.count_parts(); }", 50).unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err, SandboxError::Timeout { deadline_ms: 50, .. }));
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert_eq!(sb.stats().timed_out, 1);
}

#[test]
fn timeout_cannot_be_caught_by_the_script() {
    let src = r#"
        try { loop { let x = 1; } } catch (e) { }
        Builder("escaped")
    "#;
    let err = sandbox().execute(src, 30).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn thrown_error_is_a_script_error() {
    let err = sandbox().execute(r#"throw "boom";"#, 1_000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Script);
    assert!(err.to_string().contains("boom"));
}

#[test]
fn syntax_error_is_a_script_error() {
    let err = sandbox().execute("let b = Builder(;", 1_000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Script);
}

#[test]
fn bad_argument_is_a_script_error() {
    let src = r#"let b = Builder(); b.brick("3001", "left", 0, 0); b"#;
    let err = sandbox().execute(src, 1_000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Script);
}

#[test]
fn no_save_and_no_return_is_no_output() {
    let sb = sandbox();
    let err = sb
        .execute(r#"let b = Builder("Nothing"); b.brick("3001", 0, 0, 0);"#, 1_000)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoOutput);
    assert_eq!(sb.stats().errored, 1);
}

#[test]
fn empty_returned_string_is_no_output() {
    let err = sandbox().execute(r#"let s = "  "; s"#, 1_000).unwrap_err();
    assert!(matches!(err, SandboxError::NoOutput));
}

#[test]
fn operation_cap_is_a_script_error() {
    let sb = Sandbox::new(SandboxConfig {
        max_operations: Some(1_000),
        ..SandboxConfig::default()
    });
    let err = sb.execute("let x = 0; loop { x += 1; }", 5_000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Script);
}

// ── State machine ────────────────────────────────────────────────────────

#[test]
fn run_follows_the_lifecycle() {
    let mut run = ExecutionRun::new();
    assert_eq!(run.state(), ExecutionState::Idle);
    run.advance(ExecutionState::Validating).unwrap();
    run.advance(ExecutionState::Running).unwrap();
    run.advance(ExecutionState::Completed).unwrap();
    assert!(run.state().is_terminal());
    assert_eq!(run.history().len(), 4);
}

#[test]
fn illegal_transitions_are_refused() {
    let mut run = ExecutionRun::new();
    assert!(run.advance(ExecutionState::Running).is_err());
    run.advance(ExecutionState::Validating).unwrap();
    run.advance(ExecutionState::Rejected).unwrap();
    assert!(run.advance(ExecutionState::Running).is_err());
    assert_eq!(run.state(), ExecutionState::Rejected);
}

#[test]
fn stats_count_each_outcome() {
    let sb = sandbox();
    sb.execute(CAR, 1_000).unwrap();
    sb.execute("eval(\"x\")", 1_000).unwrap_err();
    sb.execute("throw 1;", 1_000).unwrap_err();
    let stats = sb.stats();
    assert_eq!(stats.runs_started, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.errored, 1);
}

#[test]
fn config_round_trips_through_json() {
    let json = serde_json::to_string(&SandboxConfig::strict()).unwrap();
    let back: SandboxConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, SandboxConfig::strict());
    let partial: SandboxConfig = serde_json::from_str(r#"{"max_log_lines": 3}"#).unwrap();
    assert_eq!(partial.max_log_lines, 3);
    assert_eq!(partial.default_deadline_ms, 5_000);
}
