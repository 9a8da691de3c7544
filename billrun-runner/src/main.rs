//! Billrun
//!
//! Runs a billing route end to end: stages the route, waits for the staged
//! request to succeed, then proves it and waits again.
//!
//! Architecture:
//! - Configuration: command-line arguments, environment, billing profile
//! - Launcher: runs `bsrun*` / `bsprove*` shell functions and reads the id
//! - Scheduler: polls the status store until a request is terminal
//! - Service: chains stage and prove, reporting failures as errors
//!
//! Exit status: 0 when both requests succeed, 1 when a request fails or
//! times out, 2 when a launcher prints something that is not an id, 3 when
//! the launcher, the status store or the configuration cannot be used.

mod command;
mod config;
mod launcher;
mod profile;
mod report;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use billrun_store::MySqlStatusStore;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::CommandTemplate;
use crate::config::{Args, Config};
use crate::launcher::ShellLauncher;
use crate::profile::Profile;
use crate::report::ChainReport;
use crate::scheduler::Waiter;
use crate::service::orchestrator::Phase;
use crate::service::{Orchestrator, RunError};

const INFRASTRUCTURE_FAILURE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; stdout is kept for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "billrun=info,billrun_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let json = args.json;

    match run(args).await {
        Ok(report) => {
            if json {
                match report.to_json() {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        error!("Failed to encode run report: {}", e);
                        return ExitCode::from(INFRASTRUCTURE_FAILURE);
                    }
                }
            } else {
                report.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            if let Some(Phase::Prove) = e.downcast_ref::<RunError>().map(RunError::phase) {
                warn!("The stage request succeeded; only the prove request needs attention");
            }
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Loads configuration, opens the status store and runs the chain
async fn run(args: Args) -> Result<ChainReport> {
    let config = Config::from_args(args);
    config.validate()?;

    info!(
        "Loaded configuration: route={}, due_date={}, timeout={:?}, poll_interval={:?}",
        config.route, config.due_date, config.timeout, config.poll_interval
    );

    let profile = Profile::load(&config.profile_path).context("Failed to load billing profile")?;

    let store = MySqlStatusStore::connect(profile.connect_options())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to status store at {}/{}",
                profile.host, profile.database
            )
        })?;

    info!("Status store connected");

    let template = CommandTemplate::new(&config.bs_utils, &profile.path);
    let waiter = Waiter::new(Arc::new(store), config.poll_interval);
    let orchestrator = Orchestrator::new(Arc::new(ShellLauncher::new()), waiter, config.timeout);

    let report = orchestrator
        .run_chain(&template, config.route, config.due_date)
        .await?;

    Ok(report)
}

/// The single place a failed run is mapped to an exit status
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RunError>()
        .map(RunError::exit_code)
        .unwrap_or(INFRASTRUCTURE_FAILURE)
}
