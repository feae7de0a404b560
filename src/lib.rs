//! Prompt driver - script an interactive console program over its stdio
//!
//! Spawns a program with piped standard streams, answers its prompts from a
//! script, echoes everything it prints, and reports its exit code.

pub mod cli;
pub mod commands;
pub mod common;
pub mod driver;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use driver::{run_cpp_interactively, run_interactively, DriverOptions, Outcome};
