//! `vidscout sources` — list the configured source URLs in order.

use std::path::Path;

use anyhow::Result;

/// Run the sources command.
pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config.sources)?);
    } else {
        for (i, source) in config.sources.iter().enumerate() {
            println!("{:>2}. {source}", i + 1);
        }
    }
    Ok(())
}
