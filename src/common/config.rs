//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Executable driven when nothing else is specified
pub const DEFAULT_PROGRAM: &str = "./build/tests";

/// Prompt line the driven program prints before reading a choice
pub const DEFAULT_MARKER: &str = "> Run test (1 ~ 5) or exit (0):";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default dialogue settings
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// Program to run
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Marker awaited after each input
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Input lines sent in order
    #[serde(default = "default_inputs")]
    pub inputs: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            program: default_program(),
            marker: default_marker(),
            inputs: default_inputs(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRAM)
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_inputs() -> Vec<String> {
    vec!["5".to_string(), "0".to_string()]
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Default)]
pub struct Timeouts {
    /// How long to wait for each marker; 0 waits forever
    #[serde(default)]
    pub marker_secs: u64,
}

impl Timeouts {
    /// The marker timeout, if bounded
    pub fn marker(&self) -> Option<u64> {
        (self.marker_secs > 0).then_some(self.marker_secs)
    }
}

/// Output configuration
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Forward the child's stderr to our stderr
    #[serde(default = "default_forward_stderr")]
    pub forward_stderr: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            forward_stderr: default_forward_stderr(),
        }
    }
}

fn default_forward_stderr() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        if config.defaults.marker.trim().is_empty() {
            return Err(super::Error::Config(
                "defaults.marker must not be blank".to_string(),
            ));
        }
        Ok(config)
    }
}
