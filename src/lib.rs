//! tramline - Workflow tramline reconciliation engine
//!
//! Turns a workflow definition, an entity's live status, and its
//! (possibly inconsistent) activity log into an ordered progress trail
//! of stops for a status visualization.
//!
//! # Architecture
//!
//! Each stage is pure and synchronous:
//! 1. Contradiction filter: drops mutually exclusive events from the log
//! 2. Resolver: maps the live status onto the critical path
//! 3. Builder: materializes the stops
//! 4. Decorator: applies email-processing warnings and errors
//!
//! # Modules
//!
//! - `domain`: Data structures (Workflow, ActivityRecord, TramStop)
//! - `core`: Reconciliation stages, engine, and workflow registry
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build the trail for an entity
//! tramline trail deposit --status DEPOSITED --activities activity.json
//!
//! # Show the resolution mode
//! tramline resolve deposit --status REJECTED
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{
    decorate_tramline_with_email_processing_outcomes, ResolutionMode, TramlineEngine,
    TramlineRequest, WorkflowDefinition, WorkflowRegistry,
};
pub use crate::domain::{
    ActivityRecord, AlternatesMap, CriticalPath, EmailProcessingMessage, MessageType,
    OutcomeIndex, StateTag, TramStop, Tramline, Workflow, WorkflowState,
};
