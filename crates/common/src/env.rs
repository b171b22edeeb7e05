//! Environment/runtime helpers
//!
//! Sanity checks to ensure the store directory exists at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of the store file exists.
pub async fn ensure_store_dir(store_path: &Path) -> anyhow::Result<()> {
    let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(parent).await.is_ok() {
        debug!(dir = %parent.display(), "store directory present");
        return Ok(());
    }
    warn!(dir = %parent.display(), "store directory missing; creating it");
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}
