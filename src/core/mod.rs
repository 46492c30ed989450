//! Core reconciliation logic.
//!
//! This module contains:
//! - Contradictions: Pruning mutually exclusive events from the log
//! - Resolver: Mapping the live status onto the critical path
//! - Builder: Materializing the stops
//! - Decorator: Applying email-processing outcomes
//! - Engine: The composed pipeline
//! - Registry: Loading workflow definitions

pub mod builder;
pub mod contradictions;
pub mod decorator;
pub mod engine;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use builder::TramlineBuilder;
pub use contradictions::filter_contradictions;
pub use decorator::decorate_tramline_with_email_processing_outcomes;
pub use engine::{TramlineEngine, TramlineRequest};
pub use registry::{RegistryError, TramlineLayout, WorkflowDefinition, WorkflowRegistry};
pub use resolver::{last_evidenced_index, ResolutionMode, ResolveContext};
