//! # forge
//!
//! The outer surfaces of Nexus Forge around one [`forge_core::Orchestrator`]:
//!
//! - [`api`]: axum router for the REST and webhook endpoints, with the
//!   orchestrator and the request history behind async mutexes
//! - [`cli`]: clap commands (`serve`, `process`, `status`, `demo`) whose
//!   handlers print to any `Write` sink
//!
//! `main.rs` only sets up logging and dispatches to [`cli::run`].

pub mod api;
pub mod cli;

pub use forge_core;
