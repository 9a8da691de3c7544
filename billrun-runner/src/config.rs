//! Runner configuration
//!
//! Command-line arguments (each also readable from a `BILLRUN_*` environment
//! variable) and the validated configuration the run is driven from.

use billrun_core::Route;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BS_UTILS: &str = "/opt/clover/billing/test-tools/bin/bsUtils.sh";
pub const DEFAULT_PROFILE: &str = "/opt/clover/configs/billing.properties";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "billrun")]
#[command(
    about = "Run a billing route, wait for it to complete, then prove it",
    long_about = None
)]
pub struct Args {
    /// The route to run synchronously
    pub route: Route,

    /// The due date for the route (YYYY-MM-DD, default today)
    #[arg(short = 'd', long = "due-date", env = "BILLRUN_DUE_DATE")]
    pub due_date: Option<NaiveDate>,

    /// Source this bsUtils before running routes
    #[arg(short = 'b', long, env = "BILLRUN_BS_UTILS", default_value = DEFAULT_BS_UTILS)]
    pub bs_utils: PathBuf,

    /// Align with this properties file
    #[arg(short = 'p', long, env = "BILLRUN_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: PathBuf,

    /// Timeout after this many minutes, per request
    #[arg(short = 't', long, env = "BILLRUN_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,

    /// Seconds between status polls
    #[arg(long, env = "BILLRUN_POLL_INTERVAL", default_value_t = 10)]
    pub poll_interval: u64,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub route: Route,
    pub due_date: NaiveDate,

    /// Shell library sourced before every launcher call
    pub bs_utils: PathBuf,

    /// Billing properties file (database credentials, passed to launchers)
    pub profile_path: PathBuf,

    /// Maximum time to wait on each request
    pub timeout: Duration,

    /// How often to poll the status store
    pub poll_interval: Duration,
}

impl Config {
    /// Builds the configuration, defaulting the due date to today
    pub fn from_args(args: Args) -> Self {
        Self {
            route: args.route,
            due_date: args
                .due_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            bs_utils: args.bs_utils,
            profile_path: args.profile,
            timeout: Duration::from_secs(args.timeout.saturating_mul(60)),
            poll_interval: Duration::from_secs(args.poll_interval),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if !self.bs_utils.exists() {
            anyhow::bail!("File does not exist: {}", self.bs_utils.display());
        }

        if !self.profile_path.exists() {
            anyhow::bail!("File does not exist: {}", self.profile_path.display());
        }

        Ok(())
    }
}
