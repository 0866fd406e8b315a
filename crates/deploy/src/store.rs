//! On-disk deployment artifacts.
//!
//! The artifact store is the durable record of what was deployed: one
//! `<name>.address` and (optionally) one `<name>.args` file per contract in a
//! single flat directory. Writes are whole-file overwrites; each artifact has
//! a single producer per run, so no locking or atomic-rename discipline is
//! needed.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors reading or writing deployment artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No address has been recorded for the contract. This means "not yet
    /// deployed" and is distinct from a deployment error.
    #[error("no recorded address for {0} (not yet deployed)")]
    NotFound(String),
    /// The `.args` artifact exists but does not contain valid hex.
    #[error("invalid hex in args artifact for {0}")]
    InvalidArgs(String, #[source] hex::FromHexError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads and writes per-contract deployment artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the artifact files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn address_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.address"))
    }

    fn args_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.args"))
    }

    /// Record the on-chain address for `name`.
    ///
    /// Always called right after a confirmed deployment, before any attempt to
    /// encode constructor arguments: the address record must never depend on
    /// whether that encoding succeeds.
    pub fn write_address(&self, name: &str, address: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.address_path(name), address)?;
        tracing::debug!(contract = %name, address = %address, "Recorded address artifact");
        Ok(())
    }

    /// Read the recorded address for `name`.
    ///
    /// Returns [`StoreError::NotFound`] when no `.address` artifact exists;
    /// callers must treat this as "not yet deployed".
    pub fn read_address(&self, name: &str) -> Result<String, StoreError> {
        match std::fs::read_to_string(self.address_path(name)) {
            Ok(address) => Ok(address.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Record the ABI-encoded constructor arguments for `name`.
    ///
    /// The on-disk form is lowercase hex without a `0x` prefix, as expected by
    /// manual contract-verification tooling.
    pub fn write_args(&self, name: &str, encoded: &[u8]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.args_path(name), hex::encode(encoded))?;
        tracing::debug!(contract = %name, bytes = encoded.len(), "Recorded args artifact");
        Ok(())
    }

    /// Read the recorded constructor arguments for `name`.
    ///
    /// A missing `.args` file means "no constructor arguments to declare" and
    /// yields an empty sequence, not an error.
    pub fn read_args(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        match std::fs::read_to_string(self.args_path(name)) {
            Ok(encoded) => hex::decode(encoded.trim())
                .map_err(|e| StoreError::InvalidArgs(name.to_string(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether an address has been recorded for `name`.
    pub fn has_address(&self, name: &str) -> bool {
        self.address_path(name).is_file()
    }
}
