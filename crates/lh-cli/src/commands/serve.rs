//! Implementation of the `lh serve` command.

use std::net::SocketAddr;

use anyhow::{Context, Result, anyhow};
use lh_server::AppState;

use crate::Config;

pub fn run(config: &Config, listen: Option<&str>) -> Result<()> {
    let listen = listen.unwrap_or(&config.listen);
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address: {listen}"))?;

    let state = AppState::new(
        &config.import_dir,
        &config.extract_dir,
        &config.classification_path,
    )
    .shared();

    if config.auto_load_on_start {
        let mut store = state
            .store
            .write()
            .map_err(|_| anyhow!("state lock poisoned"))?;
        match store.load() {
            Ok(summary) => {
                tracing::info!(timelines = summary.timelines_parsed, "loaded on startup");
            }
            Err(error) => tracing::warn!(%error, "startup load failed; starting empty"),
        }
    }
    {
        let mut classification = state
            .classification
            .write()
            .map_err(|_| anyhow!("state lock poisoned"))?;
        if let Err(error) = classification.ensure_loaded() {
            tracing::warn!(%error, "classification file not loaded; placeClass filters are inert");
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;
    runtime
        .block_on(lh_server::run(addr, state))
        .context("server exited with an error")
}
