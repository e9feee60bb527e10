//! # System Module
//!
//! Read-only status snapshots of an orchestrator.
//!
//! Snapshot assembly is pure: building a [`SystemStatus`] never touches a
//! counter, a score or the execution log.

mod status;

pub use status::*;
