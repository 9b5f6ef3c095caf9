use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::DATA_FILE;
use crate::model::Dataset;

/// Read and decode `data.json` from the data directory.
pub async fn fetch_dataset(data_dir: &Path) -> Result<Dataset> {
    let path = data_dir.join(DATA_FILE);
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let dataset: Dataset = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(dataset)
}
