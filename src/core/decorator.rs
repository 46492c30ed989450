//! Outcome decoration.
//!
//! Layers email-processing warnings and errors onto an already-built trail.
//! Annotations are set-once per status, so decorating twice is a no-op.

use crate::domain::{OutcomeIndex, TramStop};

/// Apply outcome annotations to a trail, returning a new trail.
///
/// Per stop, keyed by status:
/// - an error message sets `error` and clears `warning`
/// - a warning message sets `warning` unless the stop is already an error
/// - computed errors are never downgraded
pub fn decorate_tramline_with_email_processing_outcomes(
    tramline: &[TramStop],
    outcomes: Option<&OutcomeIndex>,
) -> Vec<TramStop> {
    let Some(outcomes) = outcomes.filter(|o| !o.is_empty()) else {
        return tramline.to_vec();
    };

    tramline
        .iter()
        .map(|stop| {
            let mut decorated = stop.clone();
            if outcomes.has_error(&stop.status) {
                decorated.error = true;
                decorated.warning = false;
            } else if outcomes.has_warning(&stop.status) && !stop.error {
                decorated.warning = true;
            }
            decorated
        })
        .collect()
}
