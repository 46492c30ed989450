//! Domain types for the tramline engine.
//!
//! This module contains the core data structures:
//! - Workflow: States, tags, and transitions
//! - Activity: Recorded status changes
//! - Path: Critical path and alternate states
//! - Tramline: Output stops
//! - Outcome: Email-processing annotations

pub mod activity;
pub mod outcome;
pub mod path;
pub mod tramline;
pub mod workflow;

// Re-export commonly used types
pub use activity::ActivityRecord;
pub use outcome::{EmailProcessingMessage, MessageType, OutcomeIndex};
pub use path::{AlternateSpec, AlternatesMap, CriticalPath};
pub use tramline::{TramStop, Tramline};
pub use workflow::{StateTag, Transition, Workflow, WorkflowState};
