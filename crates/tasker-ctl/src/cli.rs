//! Top-level argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tasker_shared::ids::{CorrelationId, OrchestratedFlowId};

use crate::output::clap_styles;

#[derive(Debug, Parser)]
#[command(
    name = "tasker-ctl",
    about = "Operate a Tasker dataflow orchestration fabric",
    version,
    styles = clap_styles()
)]
pub struct Cli {
    /// Base URL of the orchestration engine's HTTP surface (§4.4, §6).
    #[arg(long, env = "TASKER_ORCHESTRATOR_URL", global = true)]
    pub orchestrator_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an `OrchestratedFlow` (§4.4 trigger c).
    Start {
        /// The `OrchestratedFlow` id to start.
        flow_id: OrchestratedFlowId,
        /// An existing correlation id to attach to this execution,
        /// instead of minting a fresh one (§3 "Correlation").
        #[arg(long)]
        correlation_id: Option<CorrelationId>,
    },
    /// Check a processor's health (§6, §9 "Health-gated admission").
    Health {
        /// The processor's template version.
        version: u32,
        /// The processor's registered name.
        name: String,
    },
    /// Compare two `Schema.definition` documents for breaking changes
    /// (§4.7).
    SchemaDiff {
        /// Path to the current schema definition (JSON).
        before: PathBuf,
        /// Path to the proposed schema definition (JSON).
        after: PathBuf,
        /// Emit the full report as JSON instead of a human summary.
        #[arg(long)]
        json: bool,
    },
}
