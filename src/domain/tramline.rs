//! Tramline output types.

use serde::{Deserialize, Serialize};

/// One milestone on the progress trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TramStop {
    /// Label shown for the stop
    pub title: String,

    /// Workflow state the stop represents
    pub status: String,

    /// Whether the entity has reached this stop
    pub completed: bool,

    /// Whether the stop represents a failure
    pub error: bool,

    /// Whether the stop needs attention
    pub warning: bool,

    /// Date the stop was reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl TramStop {
    /// Synthetic stop for a status the workflow knows nothing about
    pub fn unknown(status: &str) -> Self {
        Self {
            title: format!("Unknown Status: {}", status),
            status: status.to_string(),
            completed: true,
            error: true,
            warning: false,
            subtitle: None,
        }
    }
}

/// A built trail plus whether the entity has reached a terminal state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tramline {
    pub stops: Vec<TramStop>,
    pub ended: bool,
}

impl Tramline {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Index of the last completed stop
    pub fn last_completed(&self) -> Option<usize> {
        self.stops.iter().rposition(|s| s.completed)
    }
}
