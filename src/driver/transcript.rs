//! JSON record of an interaction

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::report::Outcome;
use crate::common::Result;

/// Something that happened on the child's pipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Input written to stdin
    Sent { text: String },
    /// Ordinary output line
    Received { line: String },
    /// Output line that matched the awaited marker
    Marker { line: String },
    /// Child terminated
    Exited { code: i32 },
}

/// Full record of one driven run
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub outcome: Outcome,
    pub events: Vec<Event>,
}

impl Interaction {
    /// Output lines in the order they were echoed, markers included
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            Event::Received { line } | Event::Marker { line } => Some(line.as_str()),
            _ => None,
        })
    }

    /// Write the interaction as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Interaction {
        Interaction {
            program: PathBuf::from("./build/tests"),
            args: Vec::new(),
            outcome: Outcome::Success,
            events: vec![
                Event::Sent { text: "5\n".into() },
                Event::Received { line: "Enter value:\n".into() },
                Event::Marker { line: "> go\n".into() },
                Event::Exited { code: 0 },
            ],
        }
    }

    #[test]
    fn test_output_lines() {
        let interaction = sample();
        let lines: Vec<_> = interaction.output_lines().collect();
        assert_eq!(lines, vec!["Enter value:\n", "> go\n"]);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        sample().write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"]["status"], "success");
        assert_eq!(value["events"][0]["event"], "sent");
        assert_eq!(value["events"][2]["event"], "marker");
        assert_eq!(value["events"][3]["code"], 0);
    }
}
