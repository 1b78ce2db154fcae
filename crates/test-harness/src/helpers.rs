//! Helper functions: error type, sample scripts, fixture models.

use brick_types::Model;
use model_builder::Builder;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("format error: {0}")]
    Format(#[from] file_format::FormatError),
}

// ── Sample Scripts ──────────────────────────────────────────────────────────

/// A four-part car that hands its document over with `save()`.
pub const CAR_SCRIPT: &str = r#"
let b = Builder("Small Red Car", "brickyard");
b.set_active_color(COLORS.RED);
b.brick("3001", 0, -24, 0);
b.plate("3020", 0, -32, 0);
b.step();
b.wheel("3641", 30, 0, 20);
b.wheel("3641", -30, 0, 20);
b.save();
"#;

/// A stack of bricks built in a loop and returned rather than saved.
pub const TOWER_SCRIPT: &str = r#"
let b = Builder("Tower", "brickyard");
for i in 0..6 {
    b.place_part("3001", i % 4 + 1, 0, -24 * i, 0);
    if i % 2 == 1 { b.step(); }
}
b.to_document()
"#;

/// Never finishes.
pub const SPIN_SCRIPT: &str = "let n = 0; loop { n += 1; }";

/// Tries to read the host environment.
pub const ENV_PROBE_SCRIPT: &str = r#"let home = env("HOME"); Builder(home)"#;

/// Fails at runtime.
pub const THROWING_SCRIPT: &str = r#"let b = Builder("Broken"); throw "no wheels";"#;

/// Runs to completion but produces nothing.
pub const SILENT_SCRIPT: &str = r#"let b = Builder("Quiet"); b.brick("3001", 0, 0, 0);"#;

/// A one-brick script titled `title`.
pub fn titled_script(title: &str) -> String {
    format!("let b = Builder(\"{title}\"); b.brick(\"3001\", 0, 0, 0); b.to_document()")
}

// ── Fixture Models ──────────────────────────────────────────────────────────

/// The car from [`CAR_SCRIPT`], built natively.
pub fn small_car() -> Builder {
    let mut b = Builder::new("Small Red Car", "brickyard");
    b.set_active_color(4)
        .brick("3001", 0.0, -24.0, 0.0)
        .plate("3020", 0.0, -32.0, 0.0)
        .step()
        .wheel("3641", 30.0, 0.0, 20.0)
        .wheel("3641", -30.0, 0.0, 20.0);
    b
}

/// A one-brick document titled `title`.
pub fn titled_document(title: &str) -> String {
    let mut b = Builder::new(title, "fixture");
    b.brick("3001", 0.0, 0.0, 0.0);
    b.to_document()
}

/// A model with `n` bricks stacked along -Y.
pub fn stacked_model(n: usize) -> Model {
    let mut b = Builder::new("Stack", "fixture");
    for i in 0..n {
        b.place_part("3001", (i % 16) as u32, 0.0, -24.0 * i as f64, 0.0);
    }
    b.into_model()
}
