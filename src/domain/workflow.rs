//! Workflow definitions: states, reserved tags, and transitions.
//!
//! A workflow is owned by the execution engine; the tramline only reads it
//! to look up labels, tags, and which transitions are modeled.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Tags the tramline reacts to.
///
/// Any other tag string in a definition deserializes to `Other` so that
/// domain-specific tags do not break loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    /// The state represents a failure
    Error,

    /// The state deserves attention but is not a failure
    Warning,

    /// The state is terminal
    End,

    /// Tag with no meaning to the tramline
    #[serde(other)]
    Other,
}

/// A single state in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// State name (filled from the map key when loaded)
    #[serde(default)]
    pub name: String,

    /// Human-readable label shown on the tramline
    pub label: String,

    /// Tags attached to this state
    #[serde(default)]
    pub tags: BTreeSet<StateTag>,
}

impl WorkflowState {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Builder-style tag attachment
    pub fn with_tag(mut self, tag: StateTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn has_tag(&self, tag: StateTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// A modeled transition. A `None` source means "from any state".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default, alias = "sourceStateName")]
    pub source_state_name: Option<String>,

    #[serde(alias = "targetStateName")]
    pub target_state_name: String,
}

impl Transition {
    pub fn new(source: Option<&str>, target: &str) -> Self {
        Self {
            source_state_name: source.map(str::to_string),
            target_state_name: target.to_string(),
        }
    }
}

/// States keyed by name plus the transitions between them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub states: BTreeMap<String, WorkflowState>,

    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state, keyed by its name
    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.states.insert(state.name.clone(), state);
        self
    }

    /// Add a transition
    pub fn with_transition(mut self, source: Option<&str>, target: &str) -> Self {
        self.transitions.push(Transition::new(source, target));
        self
    }

    /// Copy map keys into each state's `name` field.
    ///
    /// Definitions written as `states: { PENDING: { label: ... } }` leave
    /// the name empty after deserialization.
    pub fn normalize_names(&mut self) {
        for (name, state) in self.states.iter_mut() {
            if state.name != *name {
                state.name = name.clone();
            }
        }
    }

    pub fn state(&self, name: &str) -> Option<&WorkflowState> {
        self.states.get(name)
    }

    /// Label for a state, falling back to the raw name for unmodeled states
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.states
            .get(name)
            .map(|s| s.label.as_str())
            .unwrap_or(name)
    }

    pub fn has_tag(&self, name: &str, tag: StateTag) -> bool {
        self.states
            .get(name)
            .map(|s| s.has_tag(tag))
            .unwrap_or(false)
    }

    /// Whether `to` is reachable from `from` through any modeled transition,
    /// wildcard sources included
    pub fn can_transition(&self, from: &str, to: &str) -> bool {
        self.transitions.iter().any(|t| {
            t.target_state_name == to
                && t.source_state_name
                    .as_deref()
                    .map_or(true, |source| source == from)
        })
    }

    /// Whether a transition with `from` as its explicit source targets `to`
    pub fn has_explicit_transition(&self, from: &str, to: &str) -> bool {
        self.transitions.iter().any(|t| {
            t.target_state_name == to && t.source_state_name.as_deref() == Some(from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Workflow {
        Workflow::new()
            .with_state(WorkflowState::new("PENDING", "Pending"))
            .with_state(WorkflowState::new("CONFIRMED", "Confirmed").with_tag(StateTag::End))
            .with_state(
                WorkflowState::new("REJECTED", "Rejected")
                    .with_tag(StateTag::Error)
                    .with_tag(StateTag::End),
            )
            .with_transition(Some("PENDING"), "CONFIRMED")
            .with_transition(None, "REJECTED")
    }

    #[test]
    fn test_tag_lookup() {
        let workflow = sample();

        assert!(workflow.has_tag("CONFIRMED", StateTag::End));
        assert!(workflow.has_tag("REJECTED", StateTag::Error));
        assert!(!workflow.has_tag("PENDING", StateTag::Error));
        assert!(!workflow.has_tag("MISSING", StateTag::End));
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let workflow = sample();
        assert_eq!(workflow.label_for("PENDING"), "Pending");
        assert_eq!(workflow.label_for("MISSING"), "MISSING");
    }

    #[test]
    fn test_wildcard_transitions() {
        let workflow = sample();

        assert!(workflow.can_transition("PENDING", "CONFIRMED"));
        assert!(!workflow.can_transition("CONFIRMED", "PENDING"));
        assert!(workflow.can_transition("CONFIRMED", "REJECTED"));

        assert!(workflow.has_explicit_transition("PENDING", "CONFIRMED"));
        assert!(!workflow.has_explicit_transition("PENDING", "REJECTED"));
    }

    #[test]
    fn test_unknown_tags_deserialize_as_other() {
        let yaml = r#"
states:
  PENDING:
    label: Pending
    tags: [initial, warning]
transitions:
  - sourceStateName: null
    targetStateName: PENDING
"#;
        let mut workflow: Workflow = serde_yaml::from_str(yaml).unwrap();
        workflow.normalize_names();

        let state = workflow.state("PENDING").unwrap();
        assert_eq!(state.name, "PENDING");
        assert!(state.has_tag(StateTag::Warning));
        assert!(state.has_tag(StateTag::Other));
        assert_eq!(workflow.transitions[0].source_state_name, None);
    }
}
