//! Prompt driver CLI
//!
//! With no subcommand, runs ./build/tests, answers "5" and then "0" to its
//! menu prompt, and reports whether it exited cleanly.

use std::path::PathBuf;

use clap::Parser;
use prompt_driver::commands::{Commands, RunArgs};
use prompt_driver::common::{config::Config, logging};
use prompt_driver::{cli, Result};

#[derive(Parser)]
#[command(name = "prompt-driver", about = "Drive an interactive console program from a script")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log driver activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    cli::dispatch(command, &config).await
}
