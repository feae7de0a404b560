//! Interactive driver
//!
//! Runs a program to completion while answering its console prompts from a
//! script, echoing everything it prints, and reporting how it exited.

pub mod report;
pub mod script;
pub mod session;
pub mod transcript;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::common::config::DEFAULT_PROGRAM;
use crate::common::Result;

pub use report::Outcome;
pub use script::{Script, ScriptFile, Step};
pub use session::Session;
pub use transcript::{Event, Interaction};

/// Everything needed to drive one program
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Executable to spawn, resolved against the working directory
    pub program: PathBuf,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// The dialogue to perform
    pub script: Script,
    /// Bound on each marker wait; `None` waits forever
    pub marker_timeout: Option<Duration>,
    /// Copy the child's stderr to ours
    pub forward_stderr: bool,
}

impl DriverOptions {
    /// Default dialogue against `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            script: Script::default_dialogue(),
            marker_timeout: None,
            forward_stderr: true,
        }
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Drive a program and print the result line
///
/// Child output and the final report are written to `out`. This never fails:
/// any error along the way becomes an [`Outcome::Exception`], and the child
/// is always reaped before returning.
pub async fn run_interactively<W>(options: &DriverOptions, out: &mut W) -> Interaction
where
    W: AsyncWrite + Unpin,
{
    let (outcome, events) = match Session::spawn(
        &options.program,
        &options.args,
        options.forward_stderr,
    ) {
        Ok(mut session) => {
            let outcome = match converse(&mut session, options, out).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    session.abort().await;
                    Outcome::from(e)
                }
            };
            (outcome, session.into_events())
        }
        Err(e) => (Outcome::from(e), Vec::new()),
    };

    match &outcome {
        Outcome::Exception { message } => tracing::debug!("dialogue failed: {}", message),
        other => tracing::debug!(?other, "dialogue finished"),
    }

    let report = format!("{}\n", outcome);
    if let Err(e) = write_report(out, &report).await {
        tracing::warn!("failed to write report: {}", e);
    }

    Interaction {
        program: options.program.clone(),
        args: options.args.clone(),
        outcome,
        events,
    }
}

/// Run the default "5" then "0" dialogue against `executable_path` on stdout
pub async fn run_cpp_interactively(executable_path: impl AsRef<Path>) -> Outcome {
    let options = DriverOptions::new(executable_path.as_ref());
    let mut stdout = tokio::io::stdout();
    run_interactively(&options, &mut stdout).await.outcome
}

async fn converse<W>(session: &mut Session, options: &DriverOptions, out: &mut W) -> Result<Outcome>
where
    W: AsyncWrite + Unpin,
{
    for step in options.script.steps() {
        session.step(step, options.marker_timeout, out).await?;
    }

    let status = session.finish().await?;
    let outcome = Outcome::from_status(status);
    session.record(Event::Exited {
        code: match outcome {
            Outcome::Failed { code } => code,
            _ => 0,
        },
    });
    Ok(outcome)
}

async fn write_report<W>(out: &mut W, report: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(report.as_bytes()).await?;
    out.flush().await
}
