//! lvpkit is a CLI tool to deploy and publish the LVP smart contracts in a few clicks.

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command, DeployArgs};
use comfy_table::Table;
use lvpkit_deploy::{ArtifactStore, Deployer, LVPCONF_FILENAME, LvpConfig, Publisher, watcher};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // If a config file is provided, start from it; otherwise from defaults.
    let config = match &cli.config {
        Some(config_path) => {
            let config = LvpConfig::load_from_file(config_path)?;
            tracing::info!(
                config_path = %config_path.display(),
                rpc = %config.network.rpc_url,
                "Loaded deployment configuration"
            );
            config
        }
        None => LvpConfig::default(),
    };

    match cli.command {
        Command::Deploy(args) => {
            let config = apply_overrides(config, &args);
            if args.save_config {
                config.save_to_file(&PathBuf::from(LVPCONF_FILENAME))?;
            }

            let summary = Deployer::new(config).deploy().await?;
            println!("{}", summary.table());
        }
        Command::Publish => {
            let published = Publisher::new(config.paths.clone()).publish_all()?;
            tracing::info!(count = published.len(), "Publish run complete");

            let store = ArtifactStore::new(&config.paths.artifacts_dir);
            let mut table = Table::new();
            table.set_header(vec!["Contract", "Address"]);
            for name in &published {
                table.add_row(vec![name.clone(), store.read_address(name)?]);
            }
            println!("{table}");
        }
        Command::Watch => {
            watcher::watch(&config.paths.contracts_dir, cli.config.as_deref()).await?;
        }
        Command::Accounts(args) => {
            for address in Deployer::new(config).accounts(args.count)? {
                println!("{address}");
            }
        }
    }

    Ok(())
}

/// Fold CLI/env network overrides into the loaded configuration.
fn apply_overrides(mut config: LvpConfig, args: &DeployArgs) -> LvpConfig {
    if let Some(rpc_url) = &args.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(mnemonic_path) = &args.mnemonic_path {
        config.network.mnemonic_path = mnemonic_path.clone();
    }
    if let Some(account_index) = args.account_index {
        config.network.account_index = account_index;
    }
    if let Some(key) = &args.etherscan_api_key {
        config.network.etherscan_api_key = Some(key.clone());
    }
    config
}
