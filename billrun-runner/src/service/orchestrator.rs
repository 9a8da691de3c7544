//! Route orchestration
//!
//! Launches a billing request, waits for it, and chains the prove request off
//! the staged request's id. Nothing here exits the process: every way a run
//! can end is a [`RunError`] that `main` turns into an exit status.

use billrun_core::{InvalidJobId, JobId, Route, WaitOutcome};
use billrun_store::StoreError;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::command::CommandTemplate;
use crate::launcher::{LaunchError, Launcher};
use crate::report::{ChainReport, StageReport};
use crate::scheduler::Waiter;

/// Which half of a run a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stage,
    Prove,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Stage => f.write_str("stage"),
            Phase::Prove => f.write_str("prove"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    /// The launcher printed something that is not a request id
    #[error("{phase} launcher gave an {source}")]
    UnexpectedResponse {
        phase: Phase,
        #[source]
        source: InvalidJobId,
    },
    #[error("{phase} request {id} completed with errors")]
    JobFailed { phase: Phase, id: JobId },
    #[error("timed out while waiting for {phase} request {id}")]
    TimedOut { phase: Phase, id: JobId },
    #[error("{phase} launcher could not run: {source}")]
    Launch {
        phase: Phase,
        #[source]
        source: LaunchError,
    },
    #[error("status store failed while waiting on {phase} request: {source}")]
    Store {
        phase: Phase,
        #[source]
        source: StoreError,
    },
}

impl RunError {
    /// Process exit status for this failure
    ///
    /// - 1: a request failed or timed out
    /// - 2: a launcher printed an unrecognized id
    /// - 3: the launcher or the status store could not be used
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::JobFailed { .. } | RunError::TimedOut { .. } => 1,
            RunError::UnexpectedResponse { .. } => 2,
            RunError::Launch { .. } | RunError::Store { .. } => 3,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            RunError::UnexpectedResponse { phase, .. }
            | RunError::JobFailed { phase, .. }
            | RunError::TimedOut { phase, .. }
            | RunError::Launch { phase, .. }
            | RunError::Store { phase, .. } => *phase,
        }
    }
}

/// Runs launchers one at a time and waits on what they start
pub struct Orchestrator {
    launcher: Arc<dyn Launcher>,
    waiter: Waiter,
    /// Budget for each individual wait
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(launcher: Arc<dyn Launcher>, waiter: Waiter, timeout: Duration) -> Self {
        Self {
            launcher,
            waiter,
            timeout,
        }
    }

    /// Runs `command`, then waits for the request it started to succeed
    pub async fn launch_and_wait(
        &self,
        phase: Phase,
        command: &str,
    ) -> Result<StageReport, RunError> {
        info!("Starting: `{}`", command);

        let raw = self
            .launcher
            .launch(command)
            .await
            .map_err(|source| RunError::Launch { phase, source })?;

        let id = JobId::parse(&raw).map_err(|source| {
            error!("Unexpected response: {}", raw.trim());
            RunError::UnexpectedResponse { phase, source }
        })?;

        info!("Route {} is running", id);

        let wait = self
            .waiter
            .wait(&id, self.timeout)
            .await
            .map_err(|source| RunError::Store { phase, source })?;

        match wait.outcome {
            WaitOutcome::Succeeded => Ok(StageReport::new(id, &wait)),
            WaitOutcome::Failed => Err(RunError::JobFailed { phase, id }),
            WaitOutcome::TimedOut => Err(RunError::TimedOut { phase, id }),
        }
    }

    /// Stages `route`, then proves the staged request
    ///
    /// The prove command is only built once the stage request has succeeded,
    /// and its wait gets a full timeout of its own.
    pub async fn run_chain(
        &self,
        template: &CommandTemplate,
        route: Route,
        due_date: NaiveDate,
    ) -> Result<ChainReport, RunError> {
        let stage = self
            .launch_and_wait(Phase::Stage, &template.stage(route, due_date))
            .await?;

        let prove_command = template.prove(route, &stage.job_id, due_date);
        let prove = self
            .launch_and_wait(Phase::Prove, &prove_command)
            .await
            .inspect_err(|e| {
                error!("Stage request {} succeeded but prove did not: {}", stage.job_id, e)
            })?;

        info!(
            "Route {} for {} proved (stage {}, prove {})",
            route, due_date, stage.job_id, prove.job_id
        );

        Ok(ChainReport {
            route,
            due_date,
            stage,
            prove,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use billrun_core::{JobStatus, StatusRow};
    use billrun_store::ScriptedStatusStore;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Launcher replaying canned outputs and recording every command
    #[derive(Default)]
    struct ScriptedLauncher {
        outputs: Mutex<VecDeque<Result<String, LaunchError>>>,
        commands: Mutex<Vec<String>>,
    }

    impl ScriptedLauncher {
        fn with_outputs(outputs: &[&str]) -> Self {
            let launcher = Self::default();
            for output in outputs {
                launcher
                    .outputs
                    .lock()
                    .unwrap()
                    .push_back(Ok(output.to_string()));
            }
            launcher
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Launcher for ScriptedLauncher {
        async fn launch(&self, command: &str) -> Result<String, LaunchError> {
            self.commands.lock().unwrap().push(command.to_string());
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    struct Harness {
        launcher: Arc<ScriptedLauncher>,
        store: Arc<ScriptedStatusStore>,
        orchestrator: Orchestrator,
    }

    fn harness(outputs: &[&str], timeout: Duration) -> Harness {
        let launcher = Arc::new(ScriptedLauncher::with_outputs(outputs));
        let store = Arc::new(ScriptedStatusStore::new());
        let waiter = Waiter::new(store.clone(), Duration::from_secs(10));
        let orchestrator = Orchestrator::new(launcher.clone(), waiter, timeout);
        Harness {
            launcher,
            store,
            orchestrator,
        }
    }

    fn id(raw: &str) -> JobId {
        JobId::parse(raw).unwrap()
    }

    fn rows(status: JobStatus) -> Vec<StatusRow> {
        vec![StatusRow::new("MonthlyRoute", status)]
    }

    fn template() -> CommandTemplate {
        CommandTemplate::new("/opt/bsUtils.sh", "/opt/billing.properties")
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_and_prove_succeed() {
        let h = harness(&["STAGE00001\n", "PROVE00001\n"], Duration::from_secs(60));
        h.store.push_rows(&id("STAGE00001"), rows(JobStatus::Succeeded));
        h.store.push_rows(&id("PROVE00001"), rows(JobStatus::Succeeded));

        let report = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap();

        assert_eq!(report.stage.job_id, id("STAGE00001"));
        assert_eq!(report.prove.job_id, id("PROVE00001"));
        assert_ne!(report.stage.job_id, report.prove.job_id);

        let commands = h.launcher.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].ends_with("bsrunMonthly -d 2024-03-01"));
        assert!(commands[1].ends_with("bsproveMonthly -r STAGE00001 -d 2024-03-01"));
        assert_eq!(h.store.queries(), vec![id("STAGE00001"), id("PROVE00001")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prove_command_embeds_stage_id_verbatim() {
        let h = harness(&["ABCDEFGHIJ", "KLMNOPQRST"], Duration::from_secs(60));
        h.store.push_rows(&id("ABCDEFGHIJ"), rows(JobStatus::Succeeded));
        h.store.push_rows(&id("KLMNOPQRST"), rows(JobStatus::Succeeded));

        h.orchestrator
            .run_chain(&template(), Route::Adjustment, due())
            .await
            .unwrap();

        let prove = &h.launcher.commands()[1];
        assert!(prove.contains("bsproveAdjustment"));
        assert!(prove.contains("-r ABCDEFGHIJ"));
        assert!(prove.contains("-d 2024-03-01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_errors_never_build_prove() {
        let h = harness(&["STAGE00001", "PROVE00001"], Duration::from_secs(60));
        h.store.push_rows(&id("STAGE00001"), rows(JobStatus::HasErrors));

        let err = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::JobFailed {
                phase: Phase::Stage,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(h.launcher.commands().len(), 1);
        assert_eq!(h.store.query_count(&id("STAGE00001")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_response_skips_polling() {
        let h = harness(&["not-an-id\n"], Duration::from_secs(60));

        let err = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::UnexpectedResponse { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.phase(), Phase::Stage);
        assert!(h.store.queries().is_empty());
        assert_eq!(h.launcher.commands().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prove_gets_its_own_timeout() {
        let h = harness(&["STAGE00001", "PROVE00001"], Duration::from_secs(60));
        h.store
            .push_rows(&id("STAGE00001"), rows(JobStatus::from_label("PENDING")));
        h.store
            .push_rows(&id("STAGE00001"), rows(JobStatus::from_label("PENDING")));
        h.store.push_rows(&id("STAGE00001"), rows(JobStatus::Succeeded));
        h.store
            .push_rows(&id("PROVE00001"), rows(JobStatus::from_label("PENDING")));

        let err = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::TimedOut {
                phase: Phase::Prove,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(h.store.query_count(&id("STAGE00001")), 3);
        // A fresh 60s budget: six polls, not what was left after staging
        assert_eq!(h.store.query_count(&id("PROVE00001")), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_is_fatal() {
        let h = harness(&["STAGE00001"], Duration::from_secs(60));
        h.store.push_failure(&id("STAGE00001"), "access denied");

        let err = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Store { .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(h.store.query_count(&id("STAGE00001")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_launcher_failure_is_fatal() {
        let h = harness(&[], Duration::from_secs(60));
        h.launcher
            .outputs
            .lock()
            .unwrap()
            .push_back(Err(LaunchError::ProcessFailed {
                exit_code: Some(127),
                stderr: "bsrunMonthly: command not found".to_string(),
            }));

        let err = h
            .orchestrator
            .run_chain(&template(), Route::Monthly, due())
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Launch { .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(h.store.queries().is_empty());
    }
}
