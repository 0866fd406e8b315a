//! Deployment configuration.
//!
//! All knobs of a deployment run live in one [`LvpConfig`] that can be
//! serialized to and from TOML. The plan parameters default to the values the
//! LVP contracts ship with; the network section carries the
//! environment-derived pieces (RPC endpoint, mnemonic file, Etherscan key)
//! that select which chain the deployer targets.

use std::path::PathBuf;

use alloy_primitives::{Address, address};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// The default name for the lvpkit configuration file.
pub const LVPCONF_FILENAME: &str = "Lvpkit.toml";

/// Address receiving ownership of Vendor and Voting after deployment.
const DEFAULT_OWNERSHIP_ADDRESS: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Well-known development mnemonic of local Hardhat/Anvil nodes. Only ever
/// used as a fallback when deploying to a localhost endpoint without a
/// mnemonic file.
const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Full configuration for a deploy/publish run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LvpConfig {
    /// Address receiving ownership of Vendor and Voting after deployment.
    ///
    /// Kept ahead of the table-valued sections so the TOML form serializes.
    pub ownership_address: Address,
    /// Which chain the deployer targets and how it signs.
    pub network: NetworkConfig,
    /// Where sources, compiled output and published bundles live.
    pub paths: ProjectPaths,
    /// LVPToken constructor parameters.
    pub token: TokenConfig,
    /// Vendor constructor parameters and funding.
    pub vendor: VendorConfig,
    /// Voting window parameters.
    pub voting: VotingConfig,
}

impl Default for LvpConfig {
    fn default() -> Self {
        Self {
            ownership_address: DEFAULT_OWNERSHIP_ADDRESS,
            network: NetworkConfig::default(),
            paths: ProjectPaths::default(),
            token: TokenConfig::default(),
            vendor: VendorConfig::default(),
            voting: VotingConfig::default(),
        }
    }
}

impl LvpConfig {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file, or from the default file name
    /// inside a directory.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(LVPCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}

/// Which chain the deployer targets and how it signs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint of the target chain.
    pub rpc_url: Url,
    /// File holding the deployment account's BIP-39 phrase.
    pub mnemonic_path: PathBuf,
    /// Account index to derive from the mnemonic.
    pub account_index: u32,
    /// Third-party verification API key. Opaque: only plumbed through to
    /// operators who verify the recorded constructor args manually.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etherscan_api_key: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: Url::parse("http://localhost:8545").expect("static URL"),
            mnemonic_path: PathBuf::from("mnemonic.txt"),
            account_index: 0,
            etherscan_api_key: None,
        }
    }
}

impl NetworkConfig {
    /// Whether the endpoint points at a local development node.
    pub fn is_localhost(&self) -> bool {
        matches!(self.rpc_url.host_str(), Some("localhost") | Some("127.0.0.1"))
    }

    /// Load the deployment mnemonic.
    ///
    /// A missing mnemonic file is tolerated for localhost endpoints, where the
    /// well-known development phrase is substituted; any other endpoint
    /// requires a real mnemonic on disk.
    pub fn load_mnemonic(&self) -> Result<String> {
        match std::fs::read_to_string(&self.mnemonic_path) {
            Ok(phrase) => Ok(phrase.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.is_localhost() {
                    tracing::warn!(
                        path = %self.mnemonic_path.display(),
                        "No mnemonic file found, using the development account"
                    );
                    Ok(DEV_MNEMONIC.to_string())
                } else {
                    anyhow::bail!(
                        "No mnemonic file at {} for a deploy account on {}",
                        self.mnemonic_path.display(),
                        self.rpc_url
                    )
                }
            }
            Err(e) => Err(e).context(format!(
                "Failed to read mnemonic from {}",
                self.mnemonic_path.display()
            )),
        }
    }
}

/// Where sources, compiled output and published bundles live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPaths {
    /// Solidity source tree watched and scanned for contract units.
    pub contracts_dir: PathBuf,
    /// Compiler output tree; also holds the deployment artifact files.
    pub artifacts_dir: PathBuf,
    /// Frontend consumer tree receiving the generated modules.
    pub publish_dir: PathBuf,
    /// Subgraph consumer tree receiving the registry and ABI mirror.
    pub graph_dir: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            contracts_dir: PathBuf::from("contracts"),
            artifacts_dir: PathBuf::from("artifacts"),
            publish_dir: PathBuf::from("../source/public/contracts"),
            graph_dir: PathBuf::from("../subgraph"),
        }
    }
}

/// LVPToken constructor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Total supply minted at construction, in whole tokens.
    pub total_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            total_supply: 10_000,
        }
    }
}

/// Vendor constructor parameters and funding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub buy_price_per_bnb: u64,
    pub sell_price_per_bnb: u64,
    /// Whole tokens transferred from LVPToken to the Vendor after deployment.
    pub funding_tokens: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            buy_price_per_bnb: 100,
            sell_price_per_bnb: 100,
            funding_tokens: 1_000,
        }
    }
}

/// Voting window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Voting window length, starting when the plan is built.
    pub duration_mins: i64,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self { duration_mins: 60 }
    }
}
