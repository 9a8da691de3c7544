//! Run report
//!
//! What a completed stage-and-prove run produced, printed for humans or as
//! JSON for scripts.

use billrun_core::{JobId, Route};
use chrono::NaiveDate;
use colored::*;
use serde::Serialize;

use crate::scheduler::WaitReport;

/// One launched request that reached `SUCCEEDED`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub job_id: JobId,
    pub polls: u32,
    pub elapsed_secs: u64,
}

impl StageReport {
    pub fn new(job_id: JobId, wait: &WaitReport) -> Self {
        Self {
            job_id,
            polls: wait.polls,
            elapsed_secs: wait.elapsed.as_secs(),
        }
    }
}

/// A route that was staged and then proved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub route: Route,
    pub due_date: NaiveDate,
    pub stage: StageReport,
    pub prove: StageReport,
}

impl ChainReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn print_summary(&self) {
        println!(
            "{}",
            format!("{} route for {} proved", self.route, self.due_date)
                .green()
                .bold()
        );
        print_stage("Stage", &self.stage);
        print_stage("Prove", &self.prove);
    }
}

fn print_stage(label: &str, stage: &StageReport) {
    println!(
        "  {:<6} {}  {}",
        format!("{}:", label).bold(),
        stage.job_id.to_string().cyan(),
        format!("({} poll(s), {}s)", stage.polls, stage.elapsed_secs).dimmed()
    );
}
