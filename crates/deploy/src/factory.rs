//! Contract creation through a factory abstraction.
//!
//! A [`ContractFactory`] wraps one compiled artifact: it resolves library
//! references against provided addresses, assembles the creation transaction
//! (bytecode concatenated with the ABI-encoded constructor arguments), submits
//! it and waits for on-chain confirmation. The resulting [`DeployedContract`]
//! handle can invoke further methods on the deployed instance, which is how
//! the post-deploy configuration calls (token funding, ownership handoff) run.

use std::collections::BTreeMap;
use std::time::Duration;

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, PendingTransactionError, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;
use thiserror::Error;

use crate::compiled::{CompiledArtifact, LinkReferences};

/// How long to wait for a submitted transaction to be confirmed.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors raised while creating a contract or calling into it.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("constructor arguments given but {0} declares no constructor")]
    UnexpectedConstructorArgs(String),
    #[error("failed to ABI-encode arguments for {0}")]
    Encoding(String, #[source] alloy_dyn_abi::Error),
    #[error("unresolved library reference {library} ({file}) in {contract}")]
    MissingLibrary {
        contract: String,
        file: String,
        library: String,
    },
    #[error("malformed link reference for {library} in {contract} bytecode")]
    MalformedLink { contract: String, library: String },
    #[error("invalid bytecode hex for {0}")]
    InvalidBytecode(String, #[source] hex::FromHexError),
    #[error("creation transaction for {0} reverted")]
    Reverted(String),
    #[error("no contract address in the creation receipt for {0}")]
    ContractNotDeployed(String),
    #[error("function {function} not found in ABI of {contract}")]
    UnknownFunction { contract: String, function: String },
    #[error("call to {contract}.{function} reverted")]
    CallReverted { contract: String, function: String },
    #[error(transparent)]
    Rpc(#[from] TransportError),
    #[error(transparent)]
    Confirmation(#[from] PendingTransactionError),
}

/// Factory for deploying one contract from its compiled artifact.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractFactory {
    /// Build a factory from a compiled artifact, linking any declared library
    /// references against `libraries` (keyed by library name, or
    /// `<source file>:<name>` when names collide across files).
    pub fn from_artifact(
        name: &str,
        artifact: &CompiledArtifact,
        libraries: &BTreeMap<String, Address>,
    ) -> Result<Self, DeploymentError> {
        let linked = link_bytecode(name, &artifact.bytecode, &artifact.link_references, libraries)?;
        let bytecode = hex::decode(linked.trim_start_matches("0x"))
            .map_err(|e| DeploymentError::InvalidBytecode(name.to_string(), e))?;

        Ok(Self {
            name: name.to_string(),
            abi: artifact.abi.clone(),
            bytecode: bytecode.into(),
        })
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Assemble the creation transaction for the given constructor arguments.
    ///
    /// The transaction input is the linked bytecode, concatenated with the
    /// ABI-encoded arguments when the contract declares a constructor.
    /// `value` carries transaction-level overrides (funds to send along with
    /// the creation).
    pub fn deploy_request(
        &self,
        params: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<TransactionRequest, DeploymentError> {
        let data: Bytes = match (self.abi.constructor(), params.is_empty()) {
            (None, false) => {
                return Err(DeploymentError::UnexpectedConstructorArgs(
                    self.name.clone(),
                ));
            }
            (None, true) => self.bytecode.clone(),
            (Some(constructor), _) => {
                let input = constructor
                    .abi_encode_input(params)
                    .map_err(|e| DeploymentError::Encoding(self.name.clone(), e))?;
                self.bytecode.iter().copied().chain(input).collect()
            }
        };

        let mut tx = TransactionRequest::default().with_deploy_code(data);
        if let Some(value) = value {
            tx = tx.with_value(value);
        }

        Ok(tx)
    }

    /// Submit the creation transaction and wait for on-chain confirmation.
    ///
    /// Returns a handle for the deployed instance. Performs no artifact
    /// writes: persistence is the orchestrator's responsibility, so a failed
    /// creation leaves no record behind.
    pub async fn deploy(
        &self,
        provider: &DynProvider,
        params: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<DeployedContract, DeploymentError> {
        let tx = self.deploy_request(params, value)?;

        tracing::debug!(contract = %self.name, "Submitting creation transaction");
        let receipt = provider
            .send_transaction(tx)
            .await?
            .with_required_confirmations(1)
            .with_timeout(Some(CONFIRMATION_TIMEOUT))
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(DeploymentError::Reverted(self.name.clone()));
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| DeploymentError::ContractNotDeployed(self.name.clone()))?;

        Ok(DeployedContract {
            name: self.name.clone(),
            address,
            abi: self.abi.clone(),
            provider: provider.clone(),
        })
    }
}

/// Handle for a deployed contract instance.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    name: String,
    address: Address,
    abi: JsonAbi,
    provider: DynProvider,
}

impl DeployedContract {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Invoke a state-changing method on the deployed instance and wait for
    /// its receipt. The function is looked up in the artifact ABI, so only
    /// methods the compiler knows about can be called.
    pub async fn call(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<(), DeploymentError> {
        let func = self
            .abi
            .function(function)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| DeploymentError::UnknownFunction {
                contract: self.name.clone(),
                function: function.to_string(),
            })?;

        let calldata = func
            .abi_encode_input(args)
            .map_err(|e| DeploymentError::Encoding(self.name.clone(), e))?;

        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(calldata));

        tracing::debug!(contract = %self.name, function = %function, "Submitting call");
        let receipt = self
            .provider
            .send_transaction(tx)
            .await?
            .with_required_confirmations(1)
            .with_timeout(Some(CONFIRMATION_TIMEOUT))
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(DeploymentError::CallReverted {
                contract: self.name.clone(),
                function: function.to_string(),
            });
        }

        Ok(())
    }
}

/// Substitute library addresses into the bytecode's link-reference ranges.
///
/// Operates on the hex string, not decoded bytes: unlinked bytecode carries
/// non-hex placeholder markers in exactly these ranges.
fn link_bytecode(
    contract: &str,
    bytecode: &str,
    refs: &LinkReferences,
    libraries: &BTreeMap<String, Address>,
) -> Result<String, DeploymentError> {
    let mut code = bytecode.trim_start_matches("0x").to_string();

    for (file, libs) in refs {
        for (library, offsets) in libs {
            let address = libraries
                .get(library)
                .or_else(|| libraries.get(&format!("{file}:{library}")))
                .ok_or_else(|| DeploymentError::MissingLibrary {
                    contract: contract.to_string(),
                    file: file.clone(),
                    library: library.clone(),
                })?;
            let addr_hex = hex::encode(address.as_slice());

            for offset in offsets {
                // Offsets index bytes of the creation bytecode.
                let start = offset.start * 2;
                let end = start + offset.length * 2;
                if offset.length != Address::len_bytes() || end > code.len() {
                    return Err(DeploymentError::MalformedLink {
                        contract: contract.to_string(),
                        library: library.clone(),
                    });
                }
                code.replace_range(start..end, &addr_hex);
            }
        }
    }

    Ok(code)
}
