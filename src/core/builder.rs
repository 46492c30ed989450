//! Tramline construction.
//!
//! Turns a resolved position into the per-stop trail: one stop per
//! critical-path state, with alternates substituted where the history says
//! the entity took a different branch, and a synthetic stop spliced in for
//! failures and terminal detours the critical path does not model.

use crate::domain::activity::latest_for;
use crate::domain::{ActivityRecord, StateTag, TramStop, Tramline};

use super::resolver::{ResolutionMode, ResolveContext};

/// Builds a trail for one entity
#[derive(Debug, Clone, Copy)]
pub struct TramlineBuilder<'a> {
    ctx: ResolveContext<'a>,
    current_status: Option<&'a str>,
    activities: &'a [ActivityRecord],
    fallback_timestamp: Option<&'a str>,
}

impl<'a> TramlineBuilder<'a> {
    /// `activities` must already be contradiction-filtered
    pub fn new(
        ctx: ResolveContext<'a>,
        current_status: Option<&'a str>,
        activities: &'a [ActivityRecord],
        fallback_timestamp: Option<&'a str>,
    ) -> Self {
        Self {
            ctx,
            current_status,
            activities,
            fallback_timestamp,
        }
    }

    /// Materialize the trail for a resolved mode
    pub fn build(&self, mode: ResolutionMode) -> Tramline {
        if self.ctx.critical_path.is_empty() {
            return Tramline::default();
        }

        // Every mode but AllIncomplete was resolved from a live status
        let current = self.current_status.unwrap_or_default();

        if mode == ResolutionMode::Unknown {
            return Tramline {
                stops: vec![TramStop::unknown(current)],
                ended: true,
            };
        }

        let mut stops: Vec<TramStop> = self
            .ctx
            .critical_path
            .iter()
            .enumerate()
            .map(|(i, state)| self.stop_at(i, state, current, mode))
            .collect();

        match mode {
            ResolutionMode::ErrorInsert { index } | ResolutionMode::EndInsert { index } => {
                let at = index.min(stops.len());
                for stop in &mut stops[at..] {
                    stop.completed = false;
                }
                let is_error = matches!(mode, ResolutionMode::ErrorInsert { .. });
                stops.insert(at, self.synthetic_stop(current, is_error));
            }
            ResolutionMode::ErrorReplace { index } if index >= stops.len() => {
                stops.push(self.synthetic_stop(current, true));
            }
            _ => {}
        }

        let ended = match mode {
            ResolutionMode::AllIncomplete => false,
            ResolutionMode::OnPath { index } => stops
                .get(index)
                .map_or(false, |stop| self.ctx.workflow.has_tag(&stop.status, StateTag::End)),
            _ => self.ctx.workflow.has_tag(current, StateTag::End),
        };

        Tramline { stops, ended }
    }

    fn stop_at(&self, i: usize, state: &str, current: &str, mode: ResolutionMode) -> TramStop {
        let workflow = self.ctx.workflow;
        let alternates = self.ctx.alternates;

        let reached = mode.reaches(i);
        let mut completed = reached;
        let mut error_override = false;
        let mut display: &str = state;
        let mut activity: Option<&ActivityRecord> = None;

        let is_current_alternate = matches!(mode, ResolutionMode::Alternate { index } if index == i)
            && alternates.is_alternate_of(state, current);

        if is_current_alternate {
            display = current;
            activity = latest_for(self.activities, current);
        } else if reached {
            // The critical-path state's own record always beats an alternate's
            if let Some(own) = latest_for(self.activities, state) {
                activity = Some(own);
            } else if let Some((alt, record)) = alternates
                .alternates_of(state)
                .iter()
                .find_map(|alt| latest_for(self.activities, alt).map(|record| (alt, record)))
            {
                display = alt.as_str();
                activity = Some(record);
            }
        }

        match mode {
            ResolutionMode::ErrorReplace { index } if index == i => {
                display = current;
                activity = latest_for(self.activities, current);
                completed = true;
                error_override = true;
            }
            ResolutionMode::OnPath { index } if index == i => {
                if let Some(failure) = self.recorded_failure_from(i) {
                    display = failure.status.as_str();
                    activity = Some(failure);
                    completed = true;
                    error_override = true;
                }
            }
            _ => {}
        }

        let is_current_stop = !mode.is_insertion() && mode.index() == Some(i);
        let subtitle = activity
            .and_then(|a| a.date.clone())
            .or_else(|| {
                is_current_stop
                    .then(|| self.fallback_timestamp.map(str::to_string))
                    .flatten()
            });

        TramStop {
            title: workflow.label_for(display).to_string(),
            status: display.to_string(),
            completed,
            error: error_override || workflow.has_tag(display, StateTag::Error),
            warning: workflow.has_tag(display, StateTag::Warning),
            subtitle,
        }
    }

    /// Most recent error-tagged activity whose modeled origin on the path
    /// is the stop at `index`
    fn recorded_failure_from(&self, index: usize) -> Option<&'a ActivityRecord> {
        self.activities.iter().rev().find(|a| {
            self.ctx.workflow.has_tag(&a.status, StateTag::Error)
                && self.ctx.highest_source_of(&a.status) == Some(index)
        })
    }

    fn synthetic_stop(&self, current: &str, is_error: bool) -> TramStop {
        let workflow = self.ctx.workflow;
        let subtitle = latest_for(self.activities, current)
            .and_then(|a| a.date.clone())
            .or_else(|| self.fallback_timestamp.map(str::to_string));

        TramStop {
            title: workflow.label_for(current).to_string(),
            status: current.to_string(),
            completed: true,
            error: is_error,
            warning: workflow.has_tag(current, StateTag::Warning),
            subtitle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlternatesMap, CriticalPath, Workflow, WorkflowState};

    fn workflow() -> Workflow {
        Workflow::new()
            .with_state(WorkflowState::new("A", "Alpha"))
            .with_state(WorkflowState::new("B", "Bravo").with_tag(StateTag::Warning))
            .with_state(WorkflowState::new("C", "Charlie").with_tag(StateTag::End))
            .with_state(WorkflowState::new("C_ALT", "Charlie (alt)").with_tag(StateTag::End))
            .with_state(WorkflowState::new("OOPS", "Oops").with_tag(StateTag::Error))
    }

    fn path() -> CriticalPath {
        CriticalPath::new(["A", "B", "C"])
    }

    fn alternates() -> AlternatesMap {
        AlternatesMap::new().with_alternates("C", ["C_ALT"])
    }

    #[test]
    fn test_empty_path_builds_nothing() {
        let workflow = workflow();
        let path = CriticalPath::default();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);

        let tramline = TramlineBuilder::new(ctx, Some("A"), &[], None).build(ResolutionMode::Unknown);
        assert!(tramline.is_empty());
        assert!(!tramline.ended);
    }

    #[test]
    fn test_alternate_mode_displays_current_status() {
        let workflow = workflow();
        let path = path();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);
        let activities = vec![ActivityRecord::new("C_ALT").with_date("2024-02-01")];

        let tramline = TramlineBuilder::new(ctx, Some("C_ALT"), &activities, None)
            .build(ResolutionMode::Alternate { index: 2 });

        assert_eq!(tramline.stops[2].status, "C_ALT");
        assert_eq!(tramline.stops[2].title, "Charlie (alt)");
        assert_eq!(tramline.stops[2].subtitle.as_deref(), Some("2024-02-01"));
        assert!(tramline.stops.iter().all(|s| s.completed));
        assert!(tramline.ended);
    }

    #[test]
    fn test_tag_derived_flags() {
        let workflow = workflow();
        let path = path();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);

        let tramline = TramlineBuilder::new(ctx, Some("B"), &[], Some("2024-03-01"))
            .build(ResolutionMode::OnPath { index: 1 });

        assert!(tramline.stops[1].warning);
        assert!(!tramline.stops[1].error);
        assert_eq!(tramline.stops[1].subtitle.as_deref(), Some("2024-03-01"));
        assert_eq!(tramline.stops[0].subtitle, None);
        assert!(!tramline.ended);
    }

    #[test]
    fn test_insertion_is_last_completed_stop() {
        let workflow = workflow();
        let path = path();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);
        let activities = vec![ActivityRecord::new("A"), ActivityRecord::new("OOPS")];

        let tramline = TramlineBuilder::new(ctx, Some("OOPS"), &activities, None)
            .build(ResolutionMode::ErrorInsert { index: 1 });

        assert_eq!(tramline.len(), 4);
        assert_eq!(tramline.last_completed(), Some(1));
        assert_eq!(tramline.stops[1].status, "OOPS");
        assert!(!tramline.stops[2].completed && !tramline.stops[3].completed);
    }

    #[test]
    fn test_nothing_completed_without_status() {
        let workflow = workflow();
        let path = path();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);

        let tramline = TramlineBuilder::new(ctx, None, &[], None).build(ResolutionMode::AllIncomplete);

        assert_eq!(tramline.last_completed(), None);
    }

    #[test]
    fn test_out_of_range_replace_appends() {
        let workflow = workflow();
        let path = path();
        let alternates = alternates();
        let ctx = ResolveContext::new(&workflow, &path, &alternates);

        let tramline = TramlineBuilder::new(ctx, Some("OOPS"), &[], None)
            .build(ResolutionMode::ErrorReplace { index: 7 });

        assert_eq!(tramline.len(), 4);
        let last = &tramline.stops[3];
        assert_eq!(last.status, "OOPS");
        assert!(last.error && last.completed);
    }
}
