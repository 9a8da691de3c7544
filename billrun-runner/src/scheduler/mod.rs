//! Scheduler layer for the runner
//!
//! Handles waiting on billing requests: polling the status store at a fixed
//! interval until a terminal status or the deadline.

pub mod waiter;

pub use waiter::{WaitReport, Waiter};
