//! CLI command handling
//!
//! Resolves command-line flags, script files and configuration into driver
//! options, runs the dialogue, and decides the process exit code.

use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::Result;
use crate::driver::{self, DriverOptions, Script, ScriptFile};

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands, config: &Config) -> Result<i32> {
    match command {
        Commands::Run(args) => run(args, config).await,

        Commands::CheckScript { path } => {
            let file = ScriptFile::load(&path)?;
            let script = file.script(&config.defaults.marker)?;

            if let Some(program) = &file.program {
                println!("Program: {}", program.display());
            }
            if let Some(secs) = file.timeout {
                println!("Timeout: {}s per marker", secs);
            }
            println!("Steps:");
            for (i, step) in script.steps().iter().enumerate() {
                println!("  {}. send {:?}, expect {:?}", i + 1, step.send, step.expect);
            }
            Ok(0)
        }
    }
}

async fn run(args: RunArgs, config: &Config) -> Result<i32> {
    let options = build_options(&args, config)?;
    tracing::debug!(?options, "resolved driver options");

    let mut stdout = tokio::io::stdout();
    let interaction = driver::run_interactively(&options, &mut stdout).await;

    if let Some(path) = &args.transcript {
        if let Err(e) = interaction.write_json(path) {
            tracing::warn!("Could not write transcript to {}: {}", path.display(), e);
        }
    }

    Ok(if args.exit_with_child {
        interaction.outcome.process_exit_code()
    } else {
        0
    })
}

/// Merge flags, script file and config; flags win, then the script, then config
pub fn build_options(args: &RunArgs, config: &Config) -> Result<DriverOptions> {
    let file = args.script.as_deref().map(ScriptFile::load).transpose()?;
    let marker = args
        .marker
        .clone()
        .unwrap_or_else(|| config.defaults.marker.clone());

    let program: PathBuf = args
        .program
        .clone()
        .or_else(|| file.as_ref().and_then(|f| f.program.clone()))
        .unwrap_or_else(|| config.defaults.program.clone());

    let program_args = if !args.args.is_empty() {
        args.args.clone()
    } else {
        file.as_ref().map(|f| f.args.clone()).unwrap_or_default()
    };

    let script = if !args.inputs.is_empty() {
        Script::from_inputs(&args.inputs, &marker)?
    } else if let Some(file) = &file {
        file.script(&marker)?
    } else {
        Script::from_inputs(&config.defaults.inputs, &marker)?
    };

    let timeout_secs = args
        .timeout
        .or_else(|| file.as_ref().and_then(|f| f.timeout))
        .or_else(|| config.timeouts.marker());

    Ok(DriverOptions {
        program,
        args: program_args,
        script,
        marker_timeout: timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        forward_stderr: !args.quiet_stderr && config.output.forward_stderr,
    })
}
