//! Tramline engine: composes filtering, resolution, building, and
//! decoration into one call.

use tracing::{debug, instrument};

use crate::domain::{ActivityRecord, AlternatesMap, CriticalPath, OutcomeIndex, Tramline, Workflow};

use super::builder::TramlineBuilder;
use super::contradictions::filter_contradictions;
use super::decorator::decorate_tramline_with_email_processing_outcomes;
use super::resolver::{ResolutionMode, ResolveContext};

/// Per-entity inputs for one build
#[derive(Debug, Clone, Copy, Default)]
pub struct TramlineRequest<'a> {
    /// Authoritative live status
    pub current_status: Option<&'a str>,

    /// Activity log, oldest first
    pub activities: &'a [ActivityRecord],

    /// Date shown on the current stop when its activity has none
    pub fallback_timestamp: Option<&'a str>,
}

impl<'a> TramlineRequest<'a> {
    pub fn new(current_status: Option<&'a str>, activities: &'a [ActivityRecord]) -> Self {
        Self {
            current_status,
            activities,
            fallback_timestamp: None,
        }
    }

    pub fn with_fallback(mut self, timestamp: &'a str) -> Self {
        self.fallback_timestamp = Some(timestamp);
        self
    }
}

/// Stateless engine bound to one workflow and its critical path
#[derive(Debug, Clone, Copy)]
pub struct TramlineEngine<'a> {
    ctx: ResolveContext<'a>,
}

impl<'a> TramlineEngine<'a> {
    pub fn new(
        workflow: &'a Workflow,
        critical_path: &'a CriticalPath,
        alternates: &'a AlternatesMap,
    ) -> Self {
        Self {
            ctx: ResolveContext::new(workflow, critical_path, alternates),
        }
    }

    /// Contradiction-filtered activity log
    pub fn filter(&self, request: &TramlineRequest<'_>) -> Vec<ActivityRecord> {
        filter_contradictions(
            request.activities,
            request.current_status,
            self.ctx.critical_path,
            self.ctx.alternates,
        )
    }

    /// Resolution mode for a request, after filtering
    pub fn resolve(&self, request: &TramlineRequest<'_>) -> ResolutionMode {
        let filtered = self.filter(request);
        self.ctx.resolve(request.current_status, &filtered)
    }

    /// Filter, resolve, and build the trail
    #[instrument(skip_all, fields(current_status = ?request.current_status))]
    pub fn build(&self, request: &TramlineRequest<'_>) -> Tramline {
        let filtered = self.filter(request);
        let mode = self.ctx.resolve(request.current_status, &filtered);
        debug!(?mode, activities = filtered.len(), "Resolved current status");

        let tramline = TramlineBuilder::new(
            self.ctx,
            request.current_status,
            &filtered,
            request.fallback_timestamp,
        )
        .build(mode);

        debug!(stops = tramline.len(), ended = tramline.ended, "Built tramline");
        tramline
    }

    /// Build the trail and apply outcome annotations
    pub fn build_decorated(
        &self,
        request: &TramlineRequest<'_>,
        outcomes: Option<&OutcomeIndex>,
    ) -> Tramline {
        let built = self.build(request);
        Tramline {
            stops: decorate_tramline_with_email_processing_outcomes(&built.stops, outcomes),
            ended: built.ended,
        }
    }
}
