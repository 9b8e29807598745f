//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of the store data file exists.
///
/// An empty `data_file` means the store runs in memory and nothing is created.
pub async fn ensure_data_dir(data_file: &str) -> anyhow::Result<()> {
    if data_file.trim().is_empty() {
        warn!("store.data_file is empty; records will not survive a restart");
        return Ok(());
    }
    let dir = match Path::new(data_file).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    debug!(dir = %dir.display(), "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("ensure_data_dir_{}", std::process::id()));
        let file = root.join("nested").join("store.json");
        ensure_data_dir(file.to_str().unwrap()).await?;
        assert!(tokio::fs::metadata(root.join("nested")).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_store_needs_no_directory() -> anyhow::Result<()> {
        ensure_data_dir("").await?;
        ensure_data_dir("store.json").await?;
        Ok(())
    }
}
