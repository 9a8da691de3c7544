//! Service layer
//!
//! Business logic for the runner: launching billing requests and chaining
//! the prove request off a successful stage request.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunError};
