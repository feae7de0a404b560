//! Interaction outcome and the report line printed for it

use serde::Serialize;
use std::fmt;
use std::process::ExitStatus;

use crate::common::Error;

/// How a driven program finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Exited with code 0
    Success,
    /// Exited with a non-zero code; negative codes are Unix signal numbers
    Failed { code: i32 },
    /// The dialogue could not be completed
    Exception { message: String },
}

impl Outcome {
    /// Classify a finished child
    pub fn from_status(status: ExitStatus) -> Self {
        match exit_code(status) {
            0 => Outcome::Success,
            code => Outcome::Failed { code },
        }
    }

    /// Process exit code mirroring this outcome
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed { code } if *code < 0 => 128 - code,
            Outcome::Failed { code } => *code,
            Outcome::Exception { .. } => 1,
        }
    }
}

impl From<Error> for Outcome {
    fn from(e: Error) -> Self {
        Outcome::Exception {
            message: e.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "C++ executable ran successfully."),
            Outcome::Failed { code } => {
                write!(f, "Error running C++ executable. Exit code: {}", code)
            }
            Outcome::Exception { message } => write!(f, "Exception: {}", message),
        }
    }
}

/// Exit code of a finished child, `-signal` if it was killed by a signal
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => -signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
