//! Dialogue scripts
//!
//! A script is an ordered list of steps. Each step writes one input line to
//! the child and then drains output until the step's marker line appears.
//! Scripts come from the built-in default, from configuration, or from a YAML
//! file such as:
//!
//! ```yaml
//! program: ./build/tests
//! timeout: 30
//! steps:
//!   - send: "5"
//!     expect: "> Run test (1 ~ 5) or exit (0):"
//!   - send: "0"
//! ```

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::common::config::DEFAULT_MARKER;
use crate::common::{Error, Result};

/// One (input, marker) pair of a dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Text written to the child's stdin
    pub send: String,
    /// Line awaited on the child's stdout after sending
    pub expect: String,
}

impl Step {
    pub fn new(send: impl Into<String>, expect: impl Into<String>) -> Self {
        Self {
            send: send.into(),
            expect: expect.into(),
        }
    }

    /// The input as written to the pipe, always newline terminated
    pub fn input_line(&self) -> String {
        if self.send.ends_with('\n') {
            self.send.clone()
        } else {
            format!("{}\n", self.send)
        }
    }
}

/// Compare an output line to a marker, ignoring surrounding whitespace on the line
pub fn is_marker(line: &str, marker: &str) -> bool {
    line.trim() == marker
}

/// An ordered, non-empty dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Build a script, rejecting an empty step list
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::Config("script has no steps".to_string()));
        }
        if let Some(step) = steps.iter().find(|s| s.expect.trim().is_empty()) {
            return Err(Error::Config(format!(
                "step sending {:?} has a blank marker",
                step.send
            )));
        }
        Ok(Self { steps })
    }

    /// Send "5", wait for the menu prompt, send "0", wait for it again
    pub fn default_dialogue() -> Self {
        Self {
            steps: vec![Step::new("5", DEFAULT_MARKER), Step::new("0", DEFAULT_MARKER)],
        }
    }

    /// One step per input, all awaiting the same marker
    pub fn from_inputs<S: AsRef<str>>(inputs: &[S], marker: &str) -> Result<Self> {
        Self::new(
            inputs
                .iter()
                .map(|input| Step::new(input.as_ref(), marker))
                .collect(),
        )
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::default_dialogue()
    }
}

/// A script file loaded from YAML
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScriptFile {
    /// Program to run; relative paths resolve against the script's directory
    pub program: Option<PathBuf>,
    /// Arguments to pass to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Seconds to wait for each marker
    pub timeout: Option<u64>,
    /// Dialogue steps
    pub steps: Vec<StepSpec>,
}

/// A step as written in a script file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    /// Input to send; bare YAML numbers are accepted
    #[serde(deserialize_with = "scalar_string")]
    pub send: String,
    /// Marker to await (defaults to the configured marker)
    pub expect: Option<String>,
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    use serde::de::Error as _;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {:?}",
            other
        ))),
    }
}

impl ScriptFile {
    /// Load and parse a script file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        let mut file = Self::parse(&content).map_err(|e| match e {
            Error::ScriptParse { error, .. } => Error::ScriptParse {
                path: path.display().to_string(),
                error,
            },
            other => other,
        })?;

        // Resolve program path relative to the script file
        let script_dir = path.parent().unwrap_or(Path::new("."));
        if let Some(program) = &file.program {
            if program.is_relative() {
                file.program = Some(script_dir.join(program));
            }
        }

        Ok(file)
    }

    /// Parse script text without touching the filesystem
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ScriptParse {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })
    }

    /// Build the dialogue, filling missing markers with `default_marker`
    pub fn script(&self, default_marker: &str) -> Result<Script> {
        Script::new(
            self.steps
                .iter()
                .map(|spec| {
                    Step::new(
                        spec.send.clone(),
                        spec.expect.as_deref().unwrap_or(default_marker),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_match_trims_line() {
        assert!(is_marker("> Run test (1 ~ 5) or exit (0):\n", DEFAULT_MARKER));
        assert!(is_marker("  > Run test (1 ~ 5) or exit (0):  ", DEFAULT_MARKER));
        assert!(is_marker("\t> Run test (1 ~ 5) or exit (0):\r\n", DEFAULT_MARKER));
        assert!(!is_marker("> Run test (1 ~ 5) or exit (0): 5", DEFAULT_MARKER));
        assert!(!is_marker("Enter value:", DEFAULT_MARKER));
    }

    #[test]
    fn test_input_line_newline() {
        assert_eq!(Step::new("5", "m").input_line(), "5\n");
        assert_eq!(Step::new("0\n", "m").input_line(), "0\n");
        assert_eq!(Step::new("", "m").input_line(), "\n");
    }

    #[test]
    fn test_default_dialogue() {
        let script = Script::default_dialogue();
        let sends: Vec<_> = script.steps().iter().map(|s| s.input_line()).collect();
        assert_eq!(sends, vec!["5\n", "0\n"]);
        assert!(script.steps().iter().all(|s| s.expect == DEFAULT_MARKER));
    }

    #[test]
    fn test_empty_script_rejected() {
        let inputs: [&str; 0] = [];
        assert!(Script::from_inputs(&inputs, DEFAULT_MARKER).is_err());
    }

    #[test]
    fn test_parse_script_file() {
        let file = ScriptFile::parse(
            r#"
program: ./bin/menu
timeout: 10
steps:
  - send: 3
    expect: "choose:"
  - send: "0"
"#,
        )
        .unwrap();

        assert_eq!(file.program, Some(PathBuf::from("./bin/menu")));
        assert_eq!(file.timeout, Some(10));

        let script = file.script(DEFAULT_MARKER).unwrap();
        assert_eq!(
            script.steps(),
            &[Step::new("3", "choose:"), Step::new("0", DEFAULT_MARKER)]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let err = ScriptFile::parse("steps: []\nretries: 3\n").unwrap_err();
        assert!(matches!(err, Error::ScriptParse { .. }));
    }

    #[test]
    fn test_empty_steps_rejected_when_building() {
        let file = ScriptFile::parse("steps: []\n").unwrap();
        assert!(matches!(file.script(DEFAULT_MARKER), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_resolves_program_relative_to_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialogue.yaml");
        std::fs::write(&path, "program: build/tests\nsteps:\n  - send: \"0\"\n").unwrap();

        let file = ScriptFile::load(&path).unwrap();
        assert_eq!(file.program, Some(dir.path().join("build/tests")));
    }
}
