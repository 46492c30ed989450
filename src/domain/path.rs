//! Critical path and alternate states.
//!
//! The critical path is the ordered "happy path" of a workflow. Each of its
//! states may have alternates: states that stand in for it when the entity
//! took a different branch (e.g. `REJECTED` instead of `CONFIRMED`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Ordered sequence of distinct state names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriticalPath(Vec<String>);

impl CriticalPath {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(states.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, state: &str) -> Option<usize> {
        self.0.iter().position(|s| s == state)
    }

    pub fn contains(&self, state: &str) -> bool {
        self.index_of(state).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Alternates for one critical-path state
///
/// Supports both YAML/JSON shapes:
/// - Legacy: `CONFIRMED: REJECTED`
/// - List: `CONFIRMED: [REJECTED, WITHDRAWN]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AlternateSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl AlternateSpec {
    /// Normalize to a list of distinct names, keeping declaration order
    pub fn into_vec(self) -> Vec<String> {
        match self {
            AlternateSpec::Single(s) => vec![s],
            AlternateSpec::Multiple(v) => {
                let mut out: Vec<String> = Vec::with_capacity(v.len());
                for name in v {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
                out
            }
        }
    }
}

/// Critical-path state name -> alternates, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, AlternateSpec>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct AlternatesMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl From<BTreeMap<String, AlternateSpec>> for AlternatesMap {
    fn from(raw: BTreeMap<String, AlternateSpec>) -> Self {
        Self {
            entries: raw
                .into_iter()
                .map(|(state, spec)| (state, spec.into_vec()))
                .collect(),
        }
    }
}

impl From<AlternatesMap> for BTreeMap<String, Vec<String>> {
    fn from(map: AlternatesMap) -> Self {
        map.entries
    }
}

impl AlternatesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register alternates for a critical-path state
    pub fn with_alternates<I, S>(mut self, state: &str, alternates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.entries.entry(state.to_string()).or_default();
        for alt in alternates {
            let alt = alt.into();
            if !list.contains(&alt) {
                list.push(alt);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alternates registered for a critical-path state
    pub fn alternates_of(&self, state: &str) -> &[String] {
        self.entries.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `candidate` is a registered alternate of `state`
    pub fn is_alternate_of(&self, state: &str, candidate: &str) -> bool {
        self.alternates_of(state).iter().any(|a| a == candidate)
    }

    /// Critical-path states that list `alternate`
    pub fn owners_of<'a>(&'a self, alternate: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, alts)| alts.iter().any(|a| a == alternate))
            .map(|(state, _)| state.as_str())
    }

    /// Reverse lookup: alternate -> every critical-path state listing it
    pub fn reverse_lookup(&self) -> HashMap<&str, Vec<&str>> {
        let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();
        for (state, alts) in &self.entries {
            for alt in alts {
                reverse.entry(alt.as_str()).or_default().push(state.as_str());
            }
        }
        reverse
    }
}
