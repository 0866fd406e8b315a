//! Integration tests for lvpkit-deploy.
//!
//! These tests exercise the full artifact-to-publish workflow against a
//! temporary project tree: compiled artifacts and deployment records go in,
//! frontend modules, the shared registry, the ABI mirror and the manifest
//! come out. No chain is required; the on-chain half of the workflow is
//! covered by the unit tests around the plan and factory.
//! Run with: cargo test --test integration_test

use std::path::PathBuf;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use lvpkit_deploy::{
    ArtifactStore, CompiledArtifact, DeploymentPlan, EncodedArgs, LvpConfig, PlanRun, PlanStep,
    ProjectPaths, Publisher, TOKEN, VENDOR, VOTING, encode_constructor_args,
};
use serde_json::Value;
use tempdir::TempDir;

const TOKEN_ABI: &str = r#"[
    {
        "type": "constructor",
        "stateMutability": "nonpayable",
        "inputs": [{"name": "_totalSupply", "type": "uint256", "internalType": "uint256"}]
    },
    {
        "type": "function",
        "name": "transfer",
        "stateMutability": "nonpayable",
        "inputs": [
            {"name": "to", "type": "address", "internalType": "address"},
            {"name": "amount", "type": "uint256", "internalType": "uint256"}
        ],
        "outputs": [{"name": "", "type": "bool", "internalType": "bool"}]
    }
]"#;

const VENDOR_ABI: &str = r#"[
    {
        "type": "constructor",
        "stateMutability": "nonpayable",
        "inputs": [
            {"name": "_buyPrice", "type": "uint256", "internalType": "uint256"},
            {"name": "_sellPrice", "type": "uint256", "internalType": "uint256"},
            {"name": "_token", "type": "address", "internalType": "address"}
        ]
    }
]"#;

/// Test project context: a contracts tree, a compiled-artifacts tree and the
/// two consumer trees, all under one temp directory.
struct TestProject {
    _tmp: TempDir,
    paths: ProjectPaths,
}

impl TestProject {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix).unwrap();
        let paths = ProjectPaths {
            contracts_dir: tmp.path().join("contracts"),
            artifacts_dir: tmp.path().join("artifacts"),
            publish_dir: tmp.path().join("source/public/contracts"),
            graph_dir: tmp.path().join("subgraph"),
        };
        std::fs::create_dir_all(&paths.contracts_dir).unwrap();
        Self { _tmp: tmp, paths }
    }

    fn add_contract(&self, name: &str, abi: &str, bytecode: &str) {
        std::fs::write(
            self.paths.contracts_dir.join(format!("{name}.sol")),
            format!("// {name} source\n"),
        )
        .unwrap();

        let artifact_path = CompiledArtifact::path_for(&self.paths.artifacts_dir, name);
        std::fs::create_dir_all(artifact_path.parent().unwrap()).unwrap();
        std::fs::write(
            artifact_path,
            format!(r#"{{"abi": {abi}, "bytecode": "{bytecode}"}}"#),
        )
        .unwrap();
    }

    fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.paths.artifacts_dir)
    }

    fn registry_path(&self) -> PathBuf {
        self.paths.graph_dir.join("config").join("config.json")
    }
}

/// Simulate the persistence half of a deploy step: record the address, then
/// encode and record the constructor args the way the deployer does.
fn record_deployment(project: &TestProject, name: &str, address: Address, args: &[DynSolValue]) {
    let store = project.store();
    store.write_address(name, &address.to_string()).unwrap();

    let artifact = CompiledArtifact::load(&project.paths.artifacts_dir, name).unwrap();
    if let EncodedArgs::Encoded(encoded) = encode_constructor_args(&artifact.abi, args).unwrap() {
        store.write_args(name, &encoded).unwrap();
    }
}

#[test]
fn test_full_publish_round() {
    let project = TestProject::new("lvpkit-it-full");
    project.add_contract(TOKEN, TOKEN_ABI, "0x600160");
    project.add_contract(VENDOR, VENDOR_ABI, "0x600260");
    project.add_contract(VOTING, "[]", "0x600360");

    let token_address = Address::repeat_byte(0xa1);
    let vendor_address = Address::repeat_byte(0xb2);

    record_deployment(
        &project,
        TOKEN,
        token_address,
        &[DynSolValue::Uint(U256::from(10_000u64), 256)],
    );
    record_deployment(
        &project,
        VENDOR,
        vendor_address,
        &[
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Address(token_address),
        ],
    );
    // Voting is compiled but never deployed in this run.

    let publisher = Publisher::new(project.paths.clone());
    let published = publisher.publish_all().unwrap();
    assert_eq!(published, vec![TOKEN.to_string(), VENDOR.to_string()]);

    // Frontend bundle: three modules per published contract.
    for name in [TOKEN, VENDOR] {
        for suffix in ["address.ts", "abi.ts", "bytecode.ts"] {
            let module = project.paths.publish_dir.join(format!("{name}.{suffix}"));
            assert!(module.is_file(), "Missing frontend module {name}.{suffix}");
        }
    }
    assert!(
        !project.paths.publish_dir.join("Voting.address.ts").exists(),
        "Undeployed contracts must not be published"
    );

    // Shared registry holds both addresses.
    let registry: Value =
        serde_json::from_str(&std::fs::read_to_string(project.registry_path()).unwrap()).unwrap();
    assert_eq!(
        registry["LVPTokenAddress"],
        Value::String(token_address.to_string())
    );
    assert_eq!(
        registry["VendorAddress"],
        Value::String(vendor_address.to_string())
    );

    // ABI mirror for the subgraph.
    let mirrored: Value = serde_json::from_str(
        &std::fs::read_to_string(project.paths.graph_dir.join("abis/LVPToken.json")).unwrap(),
    )
    .unwrap();
    assert!(mirrored.is_array());

    // Manifest lists exactly the published names.
    let manifest =
        std::fs::read_to_string(project.paths.publish_dir.join("contracts.ts")).unwrap();
    assert_eq!(manifest, "export default [\"LVPToken\",\"Vendor\"];\n");
}

#[test]
fn test_republish_after_source_removal_drops_manifest_entry() {
    let project = TestProject::new("lvpkit-it-removal");
    project.add_contract(TOKEN, TOKEN_ABI, "0x6001");
    project.add_contract(VENDOR, VENDOR_ABI, "0x6002");

    let token_address = Address::repeat_byte(0x01);
    record_deployment(
        &project,
        TOKEN,
        token_address,
        &[DynSolValue::Uint(U256::from(10_000u64), 256)],
    );
    record_deployment(
        &project,
        VENDOR,
        Address::repeat_byte(0x02),
        &[
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Address(token_address),
        ],
    );

    let publisher = Publisher::new(project.paths.clone());
    assert_eq!(publisher.publish_all().unwrap().len(), 2);

    // The vendor source goes away; the next run regenerates the manifest
    // without it, while its registry entry survives the merge untouched.
    std::fs::remove_file(project.paths.contracts_dir.join("Vendor.sol")).unwrap();
    let published = publisher.publish_all().unwrap();
    assert_eq!(published, vec![TOKEN.to_string()]);

    let manifest =
        std::fs::read_to_string(project.paths.publish_dir.join("contracts.ts")).unwrap();
    assert_eq!(manifest, "export default [\"LVPToken\"];\n");

    let registry: Value =
        serde_json::from_str(&std::fs::read_to_string(project.registry_path()).unwrap()).unwrap();
    assert!(
        registry.get("VendorAddress").is_some(),
        "Registry entries are merged, not regenerated"
    );
}

#[test]
fn test_argless_contract_never_grows_an_args_artifact() {
    let project = TestProject::new("lvpkit-it-argless");
    project.add_contract(VOTING, "[]", "0x6003");

    // Two deploy rounds of a contract without constructor metadata: neither
    // may leave an args artifact behind.
    for round in 0..2 {
        record_deployment(&project, VOTING, Address::repeat_byte(0x33), &[]);
        assert!(
            !project.paths.artifacts_dir.join("Voting.args").exists(),
            "No stale args artifact after round {round}"
        );
        assert!(
            project.store().read_args(VOTING).unwrap().is_empty(),
            "Args read back empty after round {round}"
        );
    }
}

#[test]
fn test_recorded_args_embed_upstream_addresses() {
    let project = TestProject::new("lvpkit-it-args");
    project.add_contract(TOKEN, TOKEN_ABI, "0x6001");
    project.add_contract(VENDOR, VENDOR_ABI, "0x6002");

    // Resolve the shipped plan's vendor step against a recorded token
    // address, exactly as the deployer does between steps.
    let plan = DeploymentPlan::lvp(&LvpConfig::default());
    let token_address = Address::repeat_byte(0x7e);
    let mut run = PlanRun::default();
    run.record_address(TOKEN, token_address);

    let vendor_args = match &plan.steps()[1] {
        PlanStep::Deploy { args, .. } => run.resolve(args).unwrap(),
        other => panic!("Expected vendor deploy step, got {:?}", other),
    };
    record_deployment(&project, VENDOR, Address::repeat_byte(0x99), &vendor_args);

    // The persisted encoding ends with the token address word: the recorded
    // store state is enough to reconstruct which token the vendor was wired
    // to.
    let encoded = project.store().read_args(VENDOR).unwrap();
    assert_eq!(encoded.len(), 96);
    assert_eq!(&encoded[76..96], token_address.as_slice());

    // And the token address read back from the store matches what the run
    // recorded for it.
    project
        .store()
        .write_address(TOKEN, &token_address.to_string())
        .unwrap();
    assert_eq!(
        project.store().read_address(TOKEN).unwrap(),
        token_address.to_string()
    );
}
