//! Command-line interface for tramline.
//!
//! Provides commands for building a trail from an activity log, inspecting
//! the contradiction filter and resolution mode, and listing registered
//! workflows.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::core::{ResolutionMode, TramlineRequest, WorkflowDefinition, WorkflowRegistry};
use crate::domain::activity::first_out_of_order;
use crate::domain::{ActivityRecord, OutcomeIndex, Tramline};

/// tramline - Workflow progress trail reconciliation
#[derive(Parser, Debug)]
#[command(name = "tramline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Workflow definitions directory (overrides configuration)
    #[arg(long, global = true)]
    pub workflows: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the progress trail for an entity
    Trail {
        /// Workflow name (looks for <workflows>/<name>.yaml)
        workflow: String,

        /// Live status of the entity
        #[arg(short, long)]
        status: Option<String>,

        /// Activity log (JSON array, oldest first)
        #[arg(short, long)]
        activities: Option<PathBuf>,

        /// Metadata document carrying email-processing messages
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Date for the current stop when its activity has none
        #[arg(long)]
        fallback: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the contradiction-filtered activity log
    Filter {
        /// Workflow name
        workflow: String,

        /// Live status of the entity
        #[arg(short, long)]
        status: Option<String>,

        /// Activity log (JSON array, oldest first)
        #[arg(short, long)]
        activities: PathBuf,
    },

    /// Show where the live status sits on the critical path
    Resolve {
        /// Workflow name
        workflow: String,

        /// Live status of the entity
        #[arg(short, long)]
        status: Option<String>,

        /// Activity log (JSON array, oldest first)
        #[arg(short, long)]
        activities: Option<PathBuf>,

        /// Print JSON instead of a description
        #[arg(long)]
        json: bool,
    },

    /// List registered workflows
    Workflows,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let registry = match self.workflows {
            Some(dir) => WorkflowRegistry::new(dir),
            None => WorkflowRegistry::from_config()?,
        };

        match self.command {
            Commands::Trail {
                workflow,
                status,
                activities,
                metadata,
                fallback,
                json,
            } => {
                show_trail(
                    &registry,
                    &workflow,
                    status.as_deref(),
                    activities.as_deref(),
                    metadata.as_deref(),
                    fallback,
                    json,
                )
                .await
            }
            Commands::Filter {
                workflow,
                status,
                activities,
            } => show_filtered(&registry, &workflow, status.as_deref(), &activities).await,
            Commands::Resolve {
                workflow,
                status,
                activities,
                json,
            } => {
                show_resolution(
                    &registry,
                    &workflow,
                    status.as_deref(),
                    activities.as_deref(),
                    json,
                )
                .await
            }
            Commands::Workflows => list_workflows(&registry),
            Commands::Config => show_config(&registry),
        }
    }
}

fn load_definition(registry: &WorkflowRegistry, name: &str) -> Result<WorkflowDefinition> {
    registry
        .load(name)
        .with_context(|| format!("Failed to load workflow '{}'", name))
}

/// Read an activity log, warning when it is not oldest-first
async fn read_activities(path: Option<&Path>) -> Result<Vec<ActivityRecord>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read activity log: {}", path.display()))?;
    let activities: Vec<ActivityRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse activity log: {}", path.display()))?;

    if let Some(idx) = first_out_of_order(&activities) {
        warn!(
            position = idx,
            status = %activities[idx].status,
            "Activity log is not in chronological order"
        );
    }

    Ok(activities)
}

async fn read_outcomes(path: Option<&Path>) -> Result<Option<OutcomeIndex>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    let metadata: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse metadata: {}", path.display()))?;

    Ok(Some(OutcomeIndex::from_metadata(&metadata)))
}

/// Fallback timestamp: explicit value, else now if configured
fn fallback_timestamp(explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| {
        let fallback_to_now = crate::config::config()
            .map(|c| c.display.fallback_to_now)
            .unwrap_or(true);
        fallback_to_now.then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    })
}

async fn show_trail(
    registry: &WorkflowRegistry,
    workflow: &str,
    status: Option<&str>,
    activities: Option<&Path>,
    metadata: Option<&Path>,
    fallback: Option<String>,
    json: bool,
) -> Result<()> {
    let definition = load_definition(registry, workflow)?;
    let activities = read_activities(activities).await?;
    let outcomes = read_outcomes(metadata).await?;
    let fallback = fallback_timestamp(fallback);

    let mut request = TramlineRequest::new(status, &activities);
    if let Some(ref ts) = fallback {
        request = request.with_fallback(ts);
    }

    let tramline = definition
        .engine()
        .build_decorated(&request, outcomes.as_ref());

    if json {
        println!("{}", serde_json::to_string_pretty(&tramline)?);
    } else {
        print_trail(&definition, status, &tramline);
    }

    Ok(())
}

fn print_trail(definition: &WorkflowDefinition, status: Option<&str>, tramline: &Tramline) {
    println!("Workflow: {}", definition.name);
    println!("Status: {}", status.unwrap_or("(none)"));
    println!();

    if tramline.is_empty() {
        println!("  (empty critical path)");
    }

    for stop in &tramline.stops {
        let marker = match (stop.completed, stop.error, stop.warning) {
            (_, true, _) => "[!]",
            (true, false, true) => "[~]",
            (true, false, false) => "[x]",
            (false, false, _) => "[ ]",
        };
        println!(
            "  {} {:<30} {:<20} {}",
            marker,
            stop.title,
            stop.status,
            stop.subtitle.as_deref().unwrap_or("")
        );
    }

    println!();
    match tramline.last_completed() {
        Some(idx) => println!(
            "Reached: {} ({} of {})",
            tramline.stops[idx].title,
            idx + 1,
            tramline.len()
        ),
        None => println!("Reached: (nothing yet)"),
    }
    println!("Ended: {}", if tramline.ended { "yes" } else { "no" });
}

async fn show_filtered(
    registry: &WorkflowRegistry,
    workflow: &str,
    status: Option<&str>,
    activities: &Path,
) -> Result<()> {
    let definition = load_definition(registry, workflow)?;
    let activities = read_activities(Some(activities)).await?;

    let filtered = definition
        .engine()
        .filter(&TramlineRequest::new(status, &activities));

    if filtered.len() < activities.len() {
        eprintln!(
            "Dropped {} contradicting activities",
            activities.len() - filtered.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&filtered)?);

    Ok(())
}

async fn show_resolution(
    registry: &WorkflowRegistry,
    workflow: &str,
    status: Option<&str>,
    activities: Option<&Path>,
    json: bool,
) -> Result<()> {
    let definition = load_definition(registry, workflow)?;
    let activities = read_activities(activities).await?;

    let mode = definition
        .engine()
        .resolve(&TramlineRequest::new(status, &activities));

    if json {
        println!("{}", serde_json::to_string_pretty(&mode)?);
        return Ok(());
    }

    let path = &definition.tramline.critical_path;

    let describe = |index: usize| {
        path.get(index)
            .map(|s| format!("{} ({})", index, s))
            .unwrap_or_else(|| format!("{} (end of path)", index))
    };

    match mode {
        ResolutionMode::AllIncomplete => println!("All incomplete (no live status)"),
        ResolutionMode::OnPath { index } => println!("On path at {}", describe(index)),
        ResolutionMode::Alternate { index } => println!("Alternate of {}", describe(index)),
        ResolutionMode::ErrorReplace { index } => println!("Error replacing {}", describe(index)),
        ResolutionMode::ErrorInsert { index } => println!("Error inserted before {}", describe(index)),
        ResolutionMode::EndInsert { index } => println!("End inserted before {}", describe(index)),
        ResolutionMode::Unknown => println!("Unknown status"),
    }

    Ok(())
}

fn list_workflows(registry: &WorkflowRegistry) -> Result<()> {
    let names = registry.list()?;

    if names.is_empty() {
        println!("No workflows found in {}", registry.dir().display());
        return Ok(());
    }

    println!("{:<24} {:<8} {}", "WORKFLOW", "STOPS", "DESCRIPTION");
    println!("{}", "-".repeat(70));

    for name in names {
        match registry.load(&name) {
            Ok(definition) => println!(
                "{:<24} {:<8} {}",
                name,
                definition.tramline.critical_path.len(),
                definition.description
            ),
            Err(e) => warn!(workflow = %name, error = %e, "Skipping unreadable workflow"),
        }
    }

    Ok(())
}

fn show_config(registry: &WorkflowRegistry) -> Result<()> {
    let cfg = crate::config::config()?;

    println!("Tramline Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:      {}", cfg.home.display());
    println!("  Workflows: {}", registry.dir().display());
    println!();
    println!("Display:");
    println!("  Fallback to now: {}", cfg.display.fallback_to_now);

    Ok(())
}
