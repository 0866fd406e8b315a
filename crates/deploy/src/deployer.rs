//! Deployment orchestration.
//!
//! The deployer walks the plan strictly in order: every step's on-chain
//! confirmation has returned before the next step's inputs are resolved.
//! After each confirmed creation the address artifact is written first, then
//! constructor-argument encoding is attempted; the address record never
//! depends on whether that encoding succeeds. There is no rollback: a failing
//! step leaves earlier deployments recorded and on-chain.

use std::collections::BTreeMap;

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::{MnemonicBuilder, coins_bip39::English};
use anyhow::{Context, Result};
use comfy_table::Table;

use crate::{
    compiled::CompiledArtifact,
    config::LvpConfig,
    encoder::{self, EncodedArgs},
    factory::{ContractFactory, DeployedContract},
    plan::{ArgBinding, DeploymentPlan, PlanRun, PlanStep},
    rpc,
    store::ArtifactStore,
};

/// Timeout for the pre-deploy RPC readiness probe.
const CHAIN_READY_TIMEOUT_SECS: u64 = 30;

/// Outcome of a completed deploy run.
#[derive(Debug)]
pub struct DeploySummary {
    /// Chain ID reported by the target endpoint.
    pub chain_id: u64,
    /// Deployed contracts in plan order.
    pub contracts: Vec<(String, Address)>,
}

impl DeploySummary {
    /// Render the contract/address table shown at the end of a run.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["Contract", "Address"]);
        for (name, address) in &self.contracts {
            table.add_row(vec![name.clone(), address.to_string()]);
        }
        table
    }
}

/// Drives the deployment plan against the configured chain.
pub struct Deployer {
    config: LvpConfig,
}

impl Deployer {
    pub fn new(config: LvpConfig) -> Self {
        Self { config }
    }

    /// Derive the deploy account and connect a signing provider.
    async fn connect(&self) -> Result<DynProvider> {
        let phrase = self.config.network.load_mnemonic()?;
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .index(self.config.network.account_index)
            .context("Invalid account index for mnemonic derivation")?
            .build()
            .context("Failed to derive deploy account from mnemonic")?;
        tracing::info!(address = %signer.address(), "Deploying with account");

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.config.network.rpc_url.clone());

        Ok(provider.erased())
    }

    /// Derive the first `count` account addresses from the configured
    /// mnemonic, in index order.
    pub fn accounts(&self, count: u32) -> Result<Vec<Address>> {
        let phrase = self.config.network.load_mnemonic()?;
        let mut addresses = Vec::with_capacity(count as usize);
        for index in 0..count {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase.clone())
                .index(index)
                .context("Invalid account index for mnemonic derivation")?
                .build()
                .context("Failed to derive account from mnemonic")?;
            addresses.push(signer.address());
        }
        Ok(addresses)
    }

    /// Run the full deployment plan.
    pub async fn deploy(&self) -> Result<DeploySummary> {
        tracing::info!(rpc = %self.config.network.rpc_url, "Starting deployment...");

        let chain_id = rpc::wait_for_chain(
            self.config.network.rpc_url.as_str(),
            CHAIN_READY_TIMEOUT_SECS,
        )
        .await?;
        tracing::info!(chain_id, "Chain is ready");

        let provider = self.connect().await?;
        let store = ArtifactStore::new(&self.config.paths.artifacts_dir);
        let plan = DeploymentPlan::lvp(&self.config);

        let mut run = PlanRun::default();
        let mut handles: BTreeMap<String, DeployedContract> = BTreeMap::new();
        let mut contracts = Vec::new();

        for step in plan.steps() {
            match step {
                PlanStep::Deploy {
                    name,
                    args,
                    value,
                    libraries,
                } => {
                    let contract = self
                        .deploy_one(&provider, &store, &run, name, args, *value, libraries)
                        .await?;
                    run.record_address(name, contract.address());
                    contracts.push((name.clone(), contract.address()));
                    handles.insert(name.clone(), contract);
                }
                PlanStep::Call { on, function, args } => {
                    let contract = handles.get(on).with_context(|| {
                        format!("Plan calls {on}.{function} before deploying {on}")
                    })?;
                    let args = run.resolve(args)?;

                    tracing::info!(contract = %on, function = %function, "Running configuration call");
                    contract
                        .call(function, &args)
                        .await
                        .with_context(|| format!("Configuration call {on}.{function} failed"))?;
                }
            }
        }

        let summary = DeploySummary {
            chain_id,
            contracts,
        };
        tracing::info!(
            artifacts = %store.dir().display(),
            "Artifacts (address and args) saved"
        );

        Ok(summary)
    }

    /// Deploy a single contract and persist its deployment record.
    #[allow(clippy::too_many_arguments)]
    async fn deploy_one(
        &self,
        provider: &DynProvider,
        store: &ArtifactStore,
        run: &PlanRun,
        name: &str,
        args: &[ArgBinding],
        value: Option<U256>,
        libraries: &BTreeMap<String, Address>,
    ) -> Result<DeployedContract> {
        tracing::info!(contract = %name, "Deploying");

        let artifact = CompiledArtifact::load(&self.config.paths.artifacts_dir, name)
            .with_context(|| format!("Cannot deploy {name}"))?;
        let factory = ContractFactory::from_artifact(name, &artifact, libraries)?;
        let args = run.resolve(args)?;

        let contract = factory
            .deploy(provider, &args, value)
            .await
            .with_context(|| format!("Failed to deploy {name}"))?;

        // The address record must exist regardless of what happens to the
        // args encoding below.
        store.write_address(name, &contract.address().to_string())?;
        tracing::info!(
            contract = %name,
            address = %contract.address(),
            "Contract deployed"
        );

        match encoder::encode_constructor_args(factory.abi(), &args) {
            Ok(EncodedArgs::Encoded(encoded)) => store.write_args(name, &encoded)?,
            Ok(EncodedArgs::Skipped(reason)) => {
                tracing::debug!(contract = %name, %reason, "No args artifact written");
            }
            Err(e) => {
                tracing::warn!(
                    contract = %name,
                    error = %e,
                    "Constructor args could not be encoded; args artifact not written"
                );
            }
        }

        Ok(contract)
    }
}
