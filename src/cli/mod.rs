//! CLI subcommand implementations for the vidscout binary.

pub mod pick_cmd;
pub mod sources_cmd;

use std::path::Path;

use anyhow::Result;

use crate::config::ScoutConfig;

/// Load the config file when given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScoutConfig> {
    match path {
        Some(p) => Ok(ScoutConfig::load(p)?),
        None => Ok(ScoutConfig::default()),
    }
}
