//! Core domain types
//!
//! These types are shared between the status store client (which decodes rows
//! into them) and the runner (which launches routes and waits on them).

pub mod job;
pub mod route;
