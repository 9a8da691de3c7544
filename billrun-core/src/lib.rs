//! Billrun Core
//!
//! Core types for driving billing routes through the external batch system.
//!
//! This crate contains:
//! - Domain types: billing request ids, statuses, status rows and wait outcomes
//! - Routes: the allow-list of provable billing routes

pub mod domain;

pub use domain::job::{InvalidJobId, JobId, JobStatus, StatusRow, WaitOutcome, resolve_terminal};
pub use domain::route::{Route, UnknownRoute};
