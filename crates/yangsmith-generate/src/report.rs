//! Fills the pattern length bounds of a complexity report using the
//! synthesis engine's structural analysis.

use tracing::warn;
use yangsmith_core::ComplexityReport;

use crate::xeger;

/// Annotate every pattern row with its theoretical match length bounds.
/// An empty pattern row stands for unconstrained strings and gets
/// `(0, unbounded)`. Unparsable patterns are logged and left blank.
pub fn annotate_pattern_bounds(report: &mut ComplexityReport) {
    for entry in &mut report.patterns {
        if entry.pattern.is_empty() {
            entry.min_length = Some(0);
            entry.max_length = None;
            continue;
        }
        match xeger::match_length_bounds(&entry.pattern) {
            Ok((min, max)) => {
                entry.min_length = Some(min);
                entry.max_length = max;
            }
            Err(err) => {
                warn!(pattern = %entry.pattern, error = %err, "cannot compute pattern bounds");
            }
        }
    }
}
