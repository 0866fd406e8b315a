use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "lvpkit")]
#[command(
    author,
    version,
    about = "Deploy and publish the LVP contracts in a few clicks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "LVP_VERBOSITY", default_value_t = LevelFilter::INFO, global = true)]
    pub verbosity: LevelFilter,

    /// Path to an existing Lvpkit.toml configuration file to load.
    ///
    /// Accepts either the file itself or a directory containing it. When not
    /// provided, the built-in defaults (local development node, shipped plan
    /// parameters) are used together with any CLI/env overrides.
    #[arg(long, alias = "conf", env = "LVP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full deployment plan against the configured chain.
    Deploy(DeployArgs),
    /// Publish compiled, deployed contracts to the frontend and subgraph trees.
    Publish,
    /// Watch the contract sources and re-run the deploy plan on every change.
    Watch,
    /// Print the account addresses derived from the configured mnemonic.
    Accounts(AccountsArgs),
}

/// Network overrides for a deploy run. Anything not provided falls back to
/// the loaded configuration file, then to the built-in defaults.
#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// The URL of the target JSON-RPC endpoint.
    #[arg(long, alias = "rpc", env = "LVP_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Path to the file holding the deploy account's mnemonic.
    #[arg(long, env = "LVP_MNEMONIC_PATH")]
    pub mnemonic_path: Option<PathBuf>,

    /// Account index to derive from the mnemonic.
    #[arg(long, env = "LVP_ACCOUNT_INDEX")]
    pub account_index: Option<u32>,

    /// Third-party verification API key (plumbed through for operators who
    /// verify the recorded constructor args manually).
    #[arg(long, env = "LVP_ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Save the effective configuration to Lvpkit.toml before deploying.
    #[arg(long, env = "LVP_SAVE_CONFIG", default_value_t = false)]
    pub save_config: bool,
}

#[derive(Debug, Clone, Args)]
pub struct AccountsArgs {
    /// How many accounts to derive.
    #[arg(long, default_value_t = 10)]
    pub count: u32,
}
