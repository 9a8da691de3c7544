//! Billing request domain types

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use regex::Regex;

static RE_JOB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{10,15}$").unwrap());

/// Raw launcher output that does not look like a billing request id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected response: {0:?}")]
pub struct InvalidJobId(pub String);

/// Billing request id printed by a launcher
///
/// Always an uppercase alphanumeric token of 10 to 15 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Parses launcher output into an id
    ///
    /// Surrounding whitespace (the trailing newline of a shell `echo`) is
    /// ignored; everything else must match the id shape exactly.
    pub fn parse(raw: &str) -> Result<Self, InvalidJobId> {
        let trimmed = raw.trim();
        if RE_JOB_ID.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidJobId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = InvalidJobId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a billing request as recorded by the billing system
///
/// Only `SUCCEEDED` and `HAS_ERRORS` are terminal. Every other label is kept
/// verbatim as an in-progress status so new labels do not break waiting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Succeeded,
    HasErrors,
    InProgress(String),
}

impl JobStatus {
    pub const SUCCEEDED: &'static str = "SUCCEEDED";
    pub const HAS_ERRORS: &'static str = "HAS_ERRORS";

    pub fn from_label(label: &str) -> Self {
        match label {
            Self::SUCCEEDED => JobStatus::Succeeded,
            Self::HAS_ERRORS => JobStatus::HasErrors,
            other => JobStatus::InProgress(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            JobStatus::Succeeded => Self::SUCCEEDED,
            JobStatus::HasErrors => Self::HAS_ERRORS,
            JobStatus::InProgress(label) => label,
        }
    }
}

impl From<String> for JobStatus {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `(name, status)` row returned for a billing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub name: String,
    pub status: JobStatus,
}

impl StatusRow {
    pub fn new(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Picks the row that decides a poll and the outcome it decides, if any
///
/// Resolution does not depend on row order: any `HAS_ERRORS` row wins, then
/// any `SUCCEEDED` row. Within a status the first row is returned so notices
/// name a stable job. The outcome is never [`WaitOutcome::TimedOut`].
pub fn resolve_terminal(rows: &[StatusRow]) -> Option<(&StatusRow, WaitOutcome)> {
    if let Some(row) = rows.iter().find(|row| row.status == JobStatus::HasErrors) {
        return Some((row, WaitOutcome::Failed));
    }

    rows.iter()
        .find(|row| row.status == JobStatus::Succeeded)
        .map(|row| (row, WaitOutcome::Succeeded))
}

/// How a wait on a billing request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    Succeeded,
    Failed,
    TimedOut,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Succeeded)
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitOutcome::Succeeded => f.write_str("succeeded"),
            WaitOutcome::Failed => f.write_str("failed"),
            WaitOutcome::TimedOut => f.write_str("timed out"),
        }
    }
}
