//! File system utils.

use std::path::Path;

use anyhow::Context;

pub struct FsHandler;

impl FsHandler {
    /// Ensure a target directory exists before a batch of writes.
    ///
    /// Consumers of the published artifacts (frontend tree, subgraph config)
    /// may not have their directories checked in, so every batch of output
    /// writes goes through this helper first.
    pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(path).context(format!(
            "Failed to create output directory: {}",
            path.display()
        ))?;
        tracing::debug!("Ensured output directory: {}", path.display());

        Ok(())
    }
}
