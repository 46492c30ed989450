//! Critical-path resolution.
//!
//! Maps the entity's live status onto the critical path. The result is a
//! single `ResolutionMode` that the builder matches on exhaustively.

use serde::Serialize;
use tracing::debug;

use crate::domain::{ActivityRecord, AlternatesMap, CriticalPath, StateTag, Workflow};

/// Where the live status sits relative to the critical path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ResolutionMode {
    /// No live status; nothing is completed
    AllIncomplete,

    /// The live status is a critical-path state
    OnPath { index: usize },

    /// The live status is an alternate of the critical-path state at `index`
    Alternate { index: usize },

    /// Modeled failure: replaces the stop at `index`
    ErrorReplace { index: usize },

    /// Unmodeled failure: a new stop is inserted before `index`
    ErrorInsert { index: usize },

    /// Terminal detour off the path: a new stop is inserted before `index`
    EndInsert { index: usize },

    /// The workflow knows nothing useful about the live status
    Unknown,
}

impl ResolutionMode {
    /// Resolved position, if the mode has one
    pub fn index(&self) -> Option<usize> {
        match *self {
            ResolutionMode::OnPath { index }
            | ResolutionMode::Alternate { index }
            | ResolutionMode::ErrorReplace { index }
            | ResolutionMode::ErrorInsert { index }
            | ResolutionMode::EndInsert { index } => Some(index),
            ResolutionMode::AllIncomplete | ResolutionMode::Unknown => None,
        }
    }

    /// Whether the mode splices a synthetic stop into the trail
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            ResolutionMode::ErrorInsert { .. } | ResolutionMode::EndInsert { .. }
        )
    }

    /// Whether the critical-path stop at `i` counts as reached
    pub fn reaches(&self, i: usize) -> bool {
        match *self {
            ResolutionMode::AllIncomplete | ResolutionMode::Unknown => false,
            ResolutionMode::ErrorInsert { index } | ResolutionMode::EndInsert { index } => i < index,
            ResolutionMode::OnPath { index }
            | ResolutionMode::Alternate { index }
            | ResolutionMode::ErrorReplace { index } => i <= index,
        }
    }
}

/// Inputs shared by the resolver and the builder
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub workflow: &'a Workflow,
    pub critical_path: &'a CriticalPath,
    pub alternates: &'a AlternatesMap,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        workflow: &'a Workflow,
        critical_path: &'a CriticalPath,
        alternates: &'a AlternatesMap,
    ) -> Self {
        Self {
            workflow,
            critical_path,
            alternates,
        }
    }

    /// Critical-path indices with an explicit transition to `status`, ascending
    pub fn sources_of(&self, status: &str) -> Vec<usize> {
        self.critical_path
            .iter()
            .enumerate()
            .filter(|&(_, state)| self.workflow.has_explicit_transition(state, status))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Highest critical-path index with an explicit transition to `status`
    pub fn highest_source_of(&self, status: &str) -> Option<usize> {
        self.sources_of(status).last().copied()
    }

    /// Resolve the live status against the critical path
    pub fn resolve(
        &self,
        current_status: Option<&str>,
        activities: &[ActivityRecord],
    ) -> ResolutionMode {
        let Some(current) = current_status else {
            return ResolutionMode::AllIncomplete;
        };

        let is_error = self.workflow.has_tag(current, StateTag::Error);

        if let Some(own) = self.critical_path.index_of(current) {
            // A failure reached from an earlier stop replaces that stop
            let earlier_source = if is_error {
                self.sources_of(current)
                    .into_iter()
                    .filter(|&source| source < own)
                    .last()
            } else {
                None
            };
            return match earlier_source {
                Some(index) => ResolutionMode::ErrorReplace { index },
                None => ResolutionMode::OnPath { index: own },
            };
        }

        let alternate_of = self
            .alternates
            .owners_of(current)
            .filter_map(|owner| self.critical_path.index_of(owner))
            .max();
        if let Some(index) = alternate_of {
            return ResolutionMode::Alternate { index };
        }

        let insertion_index = || {
            last_evidenced_index(activities, self.critical_path, self.alternates)
                .map_or(0, |idx| idx + 1)
        };

        if is_error {
            return match self.highest_source_of(current) {
                Some(index) => ResolutionMode::ErrorReplace { index },
                None => {
                    debug!(status = current, "Error state has no modeled transition from the path");
                    ResolutionMode::ErrorInsert {
                        index: insertion_index(),
                    }
                }
            };
        }

        if self.workflow.has_tag(current, StateTag::End) {
            return ResolutionMode::EndInsert {
                index: insertion_index(),
            };
        }

        ResolutionMode::Unknown
    }
}

/// Highest critical-path index for which the state, or any of its
/// alternates, appears in `activities`.
///
/// Scans the whole path: evidence for a later stop counts even when an
/// earlier stop has none.
pub fn last_evidenced_index(
    activities: &[ActivityRecord],
    critical_path: &CriticalPath,
    alternates: &AlternatesMap,
) -> Option<usize> {
    let evidenced = |status: &str| activities.iter().any(|a| a.status == status);

    critical_path
        .iter()
        .enumerate()
        .filter(|&(_, state)| {
            evidenced(state)
                || alternates
                    .alternates_of(state)
                    .iter()
                    .any(|alt| evidenced(alt.as_str()))
        })
        .map(|(idx, _)| idx)
        .last()
}
