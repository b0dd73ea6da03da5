//! `vidscout pick` — run one extraction pass and print the selected video.

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::renderer::chromium::ChromiumRenderer;
use crate::rotator::SourceRotator;

/// Run the pick command.
pub async fn run(
    config_path: Option<&Path>,
    seed: Option<u64>,
    browser: bool,
    json: bool,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let mut rotator = SourceRotator::new(config)?;
    if let Some(seed) = seed {
        rotator = rotator.with_seed(seed);
    }
    if browser {
        match ChromiumRenderer::new().await {
            Ok(renderer) => rotator = rotator.with_renderer(Box::new(renderer)),
            Err(e) => warn!(error = %e, "browser unavailable, continuing HTTP-only"),
        }
    }

    let picked = rotator.pick().await;
    rotator.shutdown().await;

    let candidate = picked?;
    if json {
        println!("{}", serde_json::to_string_pretty(&candidate)?);
    } else {
        println!("{}", candidate.title);
        if let Some(code) = &candidate.code {
            println!("  code:  {code}");
        }
        println!("  url:   {}", candidate.url);
        if let Some(image) = &candidate.image {
            println!("  image: {image}");
        }
    }
    Ok(())
}
