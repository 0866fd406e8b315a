//! lvpkit-deploy - Deployment and publishing library for the LVP contracts.
//!
//! This crate drives the fixed deployment plan for the LVP token, vendor and
//! voting contracts, persists per-contract deployment artifacts, and
//! republishes each deployed contract's identity (address, ABI, bytecode)
//! into the frontend and subgraph consumer trees.

mod deployer;
pub use deployer::{DeploySummary, Deployer};

mod compiled;
mod config;
mod encoder;
mod factory;
mod fs;
mod plan;
mod publisher;
pub mod rpc;
mod store;
pub mod watcher;

pub use compiled::{
    ArtifactError, CompiledArtifact, LinkOffset, LinkReferences, solidity_unit_name,
};
pub use config::{
    LVPCONF_FILENAME, LvpConfig, NetworkConfig, ProjectPaths, TokenConfig, VendorConfig,
    VotingConfig,
};
pub use encoder::{EncodedArgs, SkipReason, encode_constructor_args};
pub use factory::{ContractFactory, DeployedContract, DeploymentError};
pub use fs::FsHandler;
pub use plan::{ArgBinding, DeploymentPlan, PlanRun, PlanStep, TOKEN, UnresolvedAddress, VENDOR, VOTING};
pub use publisher::{PublishError, Publisher};
pub use store::{ArtifactStore, StoreError};
