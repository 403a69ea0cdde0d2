//! Runtime settings for the CLI.
//!
//! Settings merge three layers, lowest to highest: built-in defaults, an
//! optional `flowscript.toml` (or an explicit `--config` path), and
//! `FLOWSCRIPT_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings for the simulator-backed `run` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Delay between streamed words, in milliseconds.
    pub chat_delay_ms: u64,
    /// Length of simulated embedding vectors.
    pub embedding_dims: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_delay_ms: 15,
            embedding_dims: 16,
        }
    }
}

impl Settings {
    /// Load settings, optionally from an explicit config file path.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let builder = match path {
            Some(path) => Config::builder().add_source(File::with_name(path)),
            None => Config::builder().add_source(File::with_name("flowscript").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("FLOWSCRIPT"))
            .build()?
            .try_deserialize()
    }
}
