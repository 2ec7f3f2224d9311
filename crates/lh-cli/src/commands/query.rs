//! One-shot query commands (`lh places`, `lh activity-types`).

use anyhow::{Context, Result, anyhow};
use lh_core::{QueryKind, RawQuery, run_query};
use lh_ingest::{ClassificationStore, TimelineStore};

use crate::Config;

pub fn run(config: &Config, kind: QueryKind, filters: &[String]) -> Result<()> {
    let raw = parse_filters(filters)?;

    let mut store = TimelineStore::new(&config.extract_dir);
    store
        .load()
        .context("failed to load the extracted layer")?;

    let mut classification = ClassificationStore::new(&config.classification_path);
    if let Err(error) = classification.ensure_loaded() {
        // placeClass filters resolve to nothing without the file
        tracing::debug!(%error, "classification file not loaded");
    }

    let output = run_query(store.timelines(), kind, &raw, &classification)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to render result")?
    );
    Ok(())
}

/// Parses repeated `--filter KEY=VALUE` pairs into a raw query map.
pub fn parse_filters(pairs: &[String]) -> Result<RawQuery> {
    let mut raw = RawQuery::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid filter '{pair}', expected KEY=VALUE"))?;
        raw.set(key, value);
    }
    Ok(raw)
}
