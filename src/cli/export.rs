use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use sigtree::convert::import;

/// Export a sigtree store back to a recording JSON file
pub fn run(store: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !store.exists() {
        anyhow::bail!("Store does not exist: {}", store.display());
    }
    let output = output.unwrap_or_else(|| store.with_extension("json"));

    let recording =
        import(&store).with_context(|| format!("Failed to import {}", store.display()))?;
    recording
        .to_raw()
        .write_to_path(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Exported {} channels x {} samples and {} events to {}",
        recording.signal.n_channels(),
        recording.signal.n_samples(),
        recording.events.len(),
        output.display()
    );
    Ok(())
}
