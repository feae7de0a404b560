//! CLI command definitions
//!
//! Defines the clap commands for the prompt driver.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program through a scripted prompt/answer dialogue
    Run(RunArgs),

    /// Parse a script file and print its steps
    CheckScript {
        /// Path to the YAML script
        path: PathBuf,
    },
}

/// Options for `run`; every field is optional so the defaults reproduce
/// the classic "5 then 0" dialogue against ./build/tests
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Executable to drive (default: ./build/tests)
    pub program: Option<PathBuf>,

    /// Arguments to pass to the program
    #[arg(last = true)]
    pub args: Vec<String>,

    /// YAML script describing the dialogue
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Input line to send; repeat for each step: --send 5 --send 0
    #[arg(long = "send", short = 's')]
    pub inputs: Vec<String>,

    /// Prompt line awaited after each input
    #[arg(long)]
    pub marker: Option<String>,

    /// Seconds to wait for each marker (0 waits forever)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write a JSON transcript of the run to this file
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Discard the program's stderr instead of forwarding it
    #[arg(long)]
    pub quiet_stderr: bool,

    /// Exit with the program's exit code instead of 0
    #[arg(long)]
    pub exit_with_child: bool,
}
