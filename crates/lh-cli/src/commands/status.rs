//! Implementation of the `lh status` command.

use anyhow::{Context, Result};
use lh_core::timeline::Timeline;
use lh_ingest::TimelineStore;

use crate::Config;

pub fn run(config: &Config) -> Result<()> {
    let mut store = TimelineStore::new(&config.extract_dir);
    let summary = store
        .load()
        .context("failed to load the extracted layer")?
        .clone();
    let items: usize = store.timelines().iter().map(Timeline::len).sum();

    println!("Extracted layer: {}", config.extract_dir.display());
    println!("Files seen:      {}", summary.files_seen);
    println!("Timelines:       {}", summary.timelines_parsed);
    println!("Timeline items:  {items}");
    Ok(())
}
