//! Assertion helpers with diagnostic output.
//!
//! Failures carry the expected and actual values plus a report of the
//! document involved.

use load_coordinator::Coordinator;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;
use crate::report::DocumentReport;

/// Assert the document has exactly `expected` placements.
pub fn assert_placement_count(text: &str, expected: usize, ctx: &str) -> Result<(), HarnessError> {
    let report = DocumentReport::from_document(text);
    if report.placement_count == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {} placements, got {}\n{}",
                ctx, expected, report.placement_count, report,
            ),
        })
    }
}

/// Assert the coordinator is showing a model titled `title`.
pub fn assert_displayed_title(
    coordinator: &Coordinator,
    title: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    match coordinator.displayed() {
        Some(model) if model.title.as_deref() == Some(title) => Ok(()),
        Some(model) => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {:?} on display, found {:?} (generation {})\n{}",
                ctx,
                title,
                model.title,
                model.generation,
                DocumentReport::from_document(&model.document),
            ),
        }),
        None => Err(HarnessError::AssertionFailed {
            detail: format!("[{}] expected {:?} on display, nothing shown", ctx, title),
        }),
    }
}

/// Assert that every verdict passed, reporting the first failure.
pub fn assert_all_pass(verdicts: &[OracleVerdict]) -> Result<(), HarnessError> {
    match verdicts.iter().find(|v| !v.passed) {
        None => Ok(()),
        Some(v) => Err(HarnessError::OracleFailure {
            oracle: v.oracle_name.clone(),
            detail: v.detail.clone(),
        }),
    }
}
