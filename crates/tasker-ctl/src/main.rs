//! `tasker-ctl` — operator CLI for a Tasker orchestration fabric.
//!
//! Thin by design (§10): it wraps [`tasker_client::OrchestratorClient`]
//! for the two operator actions the HTTP surface exposes (start a
//! flow, read a processor's health) and [`tasker_sdk`] for offline
//! breaking-change schema analysis. It carries no business logic of
//! its own.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use tasker_client::OrchestratorClient;

const DEFAULT_ORCHESTRATOR_URL: &str = "http://localhost:8090";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = run(cli).await;
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    let base_url = cli
        .orchestrator_url
        .unwrap_or_else(|| DEFAULT_ORCHESTRATOR_URL.to_string());
    let client = OrchestratorClient::new(base_url);

    let result = match cli.command {
        Command::Start {
            flow_id,
            correlation_id,
        } => commands::handle_start(&client, flow_id, correlation_id)
            .await
            .map(|()| false)
            .map_err(anyhow::Error::from),
        Command::Health { version, name } => commands::handle_health(&client, version, &name)
            .await
            .map(|()| false)
            .map_err(anyhow::Error::from),
        Command::SchemaDiff { before, after, json } => {
            commands::handle_schema_diff(&before, &after, json)
        }
    };

    match result {
        Ok(breaking) => {
            if breaking {
                1
            } else {
                0
            }
        }
        Err(err) => {
            output::error(err);
            2
        }
    }
}
