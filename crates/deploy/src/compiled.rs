//! Compiler-produced contract descriptions.
//!
//! Compiled artifacts are owned by the external compiler toolchain and are
//! read-only inputs here. Per contract, the compiler writes a JSON file at
//! `<artifacts>/contracts/<Name>.sol/<Name>.json` with the ABI, the creation
//! bytecode, and the link references left open for external libraries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a compiled artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The compiler has not produced output for this contract.
    #[error("no compiled artifact for {0} (has it been compiled?)")]
    Missing(String),
    #[error("failed to parse compiled artifact for {0}")]
    Parse(String, #[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A byte range inside the creation bytecode where a library address must be
/// linked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

/// Link references by source file, then library name.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// The compiler's description of one contract: ABI, creation bytecode and
/// unresolved library references.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    pub abi: JsonAbi,
    /// Creation bytecode as a 0x-prefixed hex string. May contain unlinked
    /// library placeholders until [`link_references`](Self::link_references)
    /// are resolved.
    pub bytecode: String,
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl CompiledArtifact {
    /// Path of the compiled artifact for `name` under `artifacts_dir`,
    /// following the compiler's `contracts/<Name>.sol/<Name>.json` layout.
    pub fn path_for(artifacts_dir: &Path, name: &str) -> PathBuf {
        artifacts_dir
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    /// Load the compiled artifact for `name` from `artifacts_dir`.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, ArtifactError> {
        let path = Self::path_for(artifacts_dir, name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::Missing(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| ArtifactError::Parse(name.to_string(), e))
    }
}

/// Contract unit name for a Solidity source file name.
///
/// Returns `None` for non-Solidity files and for editor swap droppings that
/// show up next to sources while a file is being edited.
pub fn solidity_unit_name(file_name: &str) -> Option<&str> {
    if file_name.contains(".swp") || file_name.contains(".swap") {
        return None;
    }
    file_name.strip_suffix(".sol")
}
