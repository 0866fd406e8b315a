//! Publishing deployed contracts to downstream consumer trees.
//!
//! Publishing propagates a deployed contract's identity (address, ABI,
//! bytecode) into the frontend tree and the subgraph tree. Per contract it
//! regenerates three frontend modules and the ABI mirror from scratch, and
//! merge-updates the shared address registry. A contract without compiled
//! output or without a recorded address is skipped without touching any
//! output file.

use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    compiled::{ArtifactError, CompiledArtifact, solidity_unit_name},
    config::ProjectPaths,
    fs::FsHandler,
    store::{ArtifactStore, StoreError},
};

/// File name of the regenerated manifest in the frontend tree.
const MANIFEST_FILENAME: &str = "contracts.ts";

/// Errors raised while publishing.
///
/// [`ArtifactMissing`](PublishError::ArtifactMissing) and
/// [`NotYetDeployed`](PublishError::NotYetDeployed) are per-contract
/// conditions the scan skips over; everything else aborts the run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no compiled artifact for {0} (make sure it is getting compiled)")]
    ArtifactMissing(String),
    #[error("{0} has no recorded address (make sure it is getting deployed)")]
    NotYetDeployed(String),
    #[error("corrupt compiled artifact for {0}")]
    CorruptArtifact(String, #[source] serde_json::Error),
    #[error("corrupt registry at {0}")]
    CorruptRegistry(PathBuf, #[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Regenerates the published bundles for every deployed contract.
pub struct Publisher {
    paths: ProjectPaths,
    store: ArtifactStore,
}

impl Publisher {
    pub fn new(paths: ProjectPaths) -> Self {
        let store = ArtifactStore::new(&paths.artifacts_dir);
        Self { paths, store }
    }

    fn registry_path(&self) -> PathBuf {
        self.paths.graph_dir.join("config").join("config.json")
    }

    fn manifest_path(&self) -> PathBuf {
        self.paths.publish_dir.join(MANIFEST_FILENAME)
    }

    /// Publish every contract unit found in the sources tree.
    ///
    /// Returns the names that were published. Contracts that are not compiled
    /// or not deployed yet are logged and skipped; the manifest is then fully
    /// regenerated from the successful names, dropping stale entries from
    /// removed contracts.
    pub fn publish_all(&self) -> Result<Vec<String>, PublishError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.paths.contracts_dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(solidity_unit_name) {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut published = Vec::new();
        for name in names {
            match self.publish_one(&name) {
                Ok(()) => published.push(name),
                Err(e @ (PublishError::ArtifactMissing(_) | PublishError::NotYetDeployed(_))) => {
                    tracing::warn!(contract = %name, reason = %e, "Can't publish yet");
                }
                Err(e) => return Err(e),
            }
        }

        FsHandler::ensure_dir(&self.paths.publish_dir)?;
        let manifest = serde_json::to_string(&published)
            .expect("a list of names always serializes");
        std::fs::write(self.manifest_path(), format!("export default {manifest};\n"))?;
        tracing::info!(count = published.len(), "Manifest regenerated");

        Ok(published)
    }

    /// Publish one contract into both consumer trees.
    ///
    /// All inputs are loaded before the first write: a contract that cannot
    /// be published leaves every output file untouched, including the shared
    /// registry.
    pub fn publish_one(&self, name: &str) -> Result<(), PublishError> {
        tracing::info!(
            contract = %name,
            dir = %self.paths.publish_dir.display(),
            "Publishing"
        );

        let artifact = match CompiledArtifact::load(&self.paths.artifacts_dir, name) {
            Ok(artifact) => artifact,
            Err(ArtifactError::Missing(name)) => return Err(PublishError::ArtifactMissing(name)),
            Err(ArtifactError::Parse(name, e)) => {
                return Err(PublishError::CorruptArtifact(name, e));
            }
            Err(ArtifactError::Io(e)) => return Err(e.into()),
        };
        let address = match self.store.read_address(name) {
            Ok(address) => address,
            Err(StoreError::NotFound(name)) => return Err(PublishError::NotYetDeployed(name)),
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };
        let mut registry = self.load_registry()?;

        let abi_json = serde_json::to_string_pretty(&artifact.abi)
            .expect("a parsed ABI always serializes");
        registry.insert(format!("{name}Address"), Value::String(address.clone()));

        // Frontend modules: one minimal single-value export each.
        FsHandler::ensure_dir(&self.paths.publish_dir)?;
        std::fs::write(
            self.paths.publish_dir.join(format!("{name}.address.ts")),
            format!("export default \"{address}\";\n"),
        )?;
        std::fs::write(
            self.paths.publish_dir.join(format!("{name}.abi.ts")),
            format!("export default {abi_json};\n"),
        )?;
        std::fs::write(
            self.paths.publish_dir.join(format!("{name}.bytecode.ts")),
            format!("export default \"{}\";\n", artifact.bytecode),
        )?;

        // Shared registry, merge-updated in place.
        let registry_path = self.registry_path();
        if let Some(parent) = registry_path.parent() {
            FsHandler::ensure_dir(parent)?;
        }
        std::fs::write(
            &registry_path,
            serde_json::to_string_pretty(&Value::Object(registry))
                .expect("a JSON map always serializes"),
        )?;

        // ABI mirror for the subgraph.
        let abis_dir = self.paths.graph_dir.join("abis");
        FsHandler::ensure_dir(&abis_dir)?;
        std::fs::write(abis_dir.join(format!("{name}.json")), &abi_json)?;

        tracing::info!(contract = %name, address = %address, "Published to the frontend");
        Ok(())
    }

    /// Load the shared registry, treating a missing file as an empty map.
    fn load_registry(&self) -> Result<Map<String, Value>, PublishError> {
        match std::fs::read_to_string(self.registry_path()) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| PublishError::CorruptRegistry(self.registry_path(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}
