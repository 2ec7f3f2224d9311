//! Implementation of the `lh extract` command.

use anyhow::{Context, Result};
use lh_ingest::extract_import_layer;

use crate::Config;

pub fn run(config: &Config) -> Result<()> {
    let summary = extract_import_layer(&config.import_dir, &config.extract_dir)
        .context("extraction failed")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to render summary")?
    );
    Ok(())
}
