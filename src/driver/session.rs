//! Child process session
//!
//! Owns the spawned program and its three pipes. The dialogue is strictly
//! sequential: a step's input is written and flushed, then stdout is drained
//! line by line until the step's marker, and only then does the next step run.
//! Stderr is drained on a separate task so a chatty child cannot fill it.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use super::script::Step;
use super::transcript::Event;
use crate::common::{Error, Result};

/// How long to let the stderr relay finish after the child exits
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// A running child driven over its standard streams
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    stderr_relay: Option<JoinHandle<()>>,
    events: Vec<Event>,
}

impl Session {
    /// Spawn `program` with all three standard streams piped
    pub fn spawn(program: &Path, args: &[String], forward_stderr: bool) -> Result<Self> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| Error::spawn(program, e))?;
        tracing::debug!(program = %program.display(), pid = ?child.id(), "spawned child");

        let stdin = child.stdin.take().ok_or(Error::PipeUnavailable("stdin"))?;
        let stdout = child.stdout.take().ok_or(Error::PipeUnavailable("stdout"))?;
        let stderr = child.stderr.take().ok_or(Error::PipeUnavailable("stderr"))?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            stderr_relay: Some(tokio::spawn(relay_stderr(stderr, forward_stderr))),
            events: Vec::new(),
        })
    }

    /// Write a line to the child's stdin and flush it
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(Error::PipeUnavailable("stdin"))?;
        stdin.write_all(text.as_bytes()).await?;
        stdin.flush().await?;

        tracing::debug!(input = %text.trim_end(), "sent input");
        self.events.push(Event::Sent {
            text: text.to_string(),
        });
        Ok(())
    }

    /// Echo stdout to `out` until a line matching `marker` has been echoed
    pub async fn expect<W>(
        &mut self,
        marker: &str,
        timeout: Option<Duration>,
        out: &mut W,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let drain = drain_until_marker(&mut self.stdout, marker, out, &mut self.events);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.map_err(|_| {
                Error::MarkerTimeout {
                    marker: marker.to_string(),
                    secs: limit.as_secs(),
                }
            })?,
            None => drain.await,
        }
    }

    /// Run one scripted step: send its input, then wait for its marker
    pub async fn step<W>(&mut self, step: &Step, timeout: Option<Duration>, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        self.send(&step.input_line()).await?;
        self.expect(&step.expect, timeout, out).await
    }

    /// Close stdin and wait for the child to exit on its own
    pub async fn finish(&mut self) -> Result<ExitStatus> {
        self.stdin.take();
        let status = self.child.wait().await?;
        tracing::debug!(%status, "child exited");
        self.join_stderr().await;
        Ok(status)
    }

    /// Kill the child and reap it; used when the dialogue failed
    pub async fn abort(&mut self) {
        self.stdin.take();
        if let Err(e) = self.child.start_kill() {
            // Already exited
            tracing::debug!("kill after failed dialogue: {}", e);
        }
        match self.child.wait().await {
            Ok(status) => tracing::debug!(%status, "child reaped after failure"),
            Err(e) => tracing::warn!("failed to reap child: {}", e),
        }
        self.join_stderr().await;
    }

    /// Events recorded so far
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub(crate) fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    async fn join_stderr(&mut self) {
        if let Some(mut relay) = self.stderr_relay.take() {
            // A grandchild may still hold the pipe open
            if tokio::time::timeout(STDERR_GRACE, &mut relay).await.is_err() {
                relay.abort();
            }
        }
    }
}

/// Read one line, decoding lossily and folding `\r\n` to `\n`
///
/// Returns `None` at end of stream. A final line without a terminator is
/// returned as-is.
pub async fn read_line<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\r\n") {
        buf.truncate(buf.len() - 2);
        buf.push(b'\n');
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Echo lines from `reader` to `out` until one matches `marker`
///
/// Every line, the marker included, is written and flushed as soon as it is
/// read. End of stream before the marker is an error rather than an endless
/// wait: a closed pipe can never produce the marker.
pub async fn drain_until_marker<R, W>(
    reader: &mut R,
    marker: &str,
    out: &mut W,
    events: &mut Vec<Event>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = read_line(reader).await?.ok_or_else(|| Error::UnexpectedEof {
            marker: marker.to_string(),
        })?;

        out.write_all(line.as_bytes()).await?;
        out.flush().await?;

        if super::script::is_marker(&line, marker) {
            tracing::debug!(marker, "marker seen");
            events.push(Event::Marker { line });
            return Ok(());
        }
        events.push(Event::Received { line });
    }
}

async fn relay_stderr(stderr: ChildStderr, forward: bool) {
    let mut reader = BufReader::new(stderr);
    let mut err_out = tokio::io::stderr();

    loop {
        match read_line(&mut reader).await {
            Ok(Some(line)) => {
                tracing::trace!(line = %line.trim_end(), "child stderr");
                if forward && err_out.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("stderr relay stopped: {}", e);
                break;
            }
        }
    }
    let _ = err_out.flush().await;
}
