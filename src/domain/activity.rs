//! Activity log records.
//!
//! An activity is one recorded status change for an entity. The log is
//! supplied oldest first and may contain duplicates or contradictions.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single recorded status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Workflow state the entity moved to
    pub status: String,

    /// When the change happened (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Warnings raised while processing the change
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ActivityRecord {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            date: None,
            warnings: Vec::new(),
        }
    }

    /// Attach an occurrence date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Attach a processing warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Parsed occurrence time, if the date is present and RFC 3339
    pub fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
    }
}

/// Most recent record for `status`
pub fn latest_for<'a>(activities: &'a [ActivityRecord], status: &str) -> Option<&'a ActivityRecord> {
    activities.iter().rev().find(|a| a.status == status)
}

/// Check that parseable dates never go backwards.
///
/// Records without a parseable date are skipped. Returns the index of the
/// first record that is older than its predecessor.
pub fn first_out_of_order(activities: &[ActivityRecord]) -> Option<usize> {
    let mut previous: Option<DateTime<FixedOffset>> = None;

    for (idx, activity) in activities.iter().enumerate() {
        if let Some(at) = activity.occurred_at() {
            if previous.map_or(false, |p| at < p) {
                return Some(idx);
            }
            previous = Some(at);
        }
    }

    None
}
