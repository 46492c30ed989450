//! Contradiction filtering for activity logs.
//!
//! A critical-path state and its alternates are mutually exclusive: an
//! entity is either `CONFIRMED` or `REJECTED`, never both. When the log
//! records both, events were delivered twice or out of order, and
//! everything from the first contradiction onwards is untrustworthy.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{ActivityRecord, AlternatesMap, CriticalPath};

/// Drop everything from the first contradicting event onwards.
///
/// Relative order is preserved. If the most recent event for
/// `current_status` was dropped, it is re-appended so the live status is
/// never lost.
pub fn filter_contradictions(
    activities: &[ActivityRecord],
    current_status: Option<&str>,
    critical_path: &CriticalPath,
    alternates: &AlternatesMap,
) -> Vec<ActivityRecord> {
    let reverse = alternates.reverse_lookup();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept: Vec<ActivityRecord> = Vec::with_capacity(activities.len());

    for (idx, activity) in activities.iter().enumerate() {
        let status = activity.status.as_str();

        let contradicts_alternate = critical_path.contains(status)
            && alternates
                .alternates_of(status)
                .iter()
                .any(|alt| seen.contains(alt.as_str()));

        let contradicts_owner = reverse
            .get(status)
            .map_or(false, |owners| owners.iter().any(|owner| seen.contains(owner)));

        if contradicts_alternate || contradicts_owner {
            debug!(
                status,
                position = idx,
                dropped = activities.len() - idx,
                "Contradicting activity, truncating log"
            );
            break;
        }

        seen.insert(status);
        kept.push(activity.clone());
    }

    if let Some(current) = current_status {
        let already_kept = kept.iter().any(|a| a.status == current);
        if !already_kept {
            if let Some(latest) = activities.iter().rev().find(|a| a.status == current) {
                debug!(status = current, "Re-appending dropped current-status activity");
                kept.push(latest.clone());
            }
        }
    }

    kept
}
