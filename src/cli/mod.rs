//! Command Line Interface (CLI) layer for ORBITSTACK.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the runner (`runner`) that sets up logging, loads the run
//! configuration and hands it to `orbitstack::api::run_pipeline`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
