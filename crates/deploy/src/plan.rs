//! The deployment plan.
//!
//! The fixed multi-contract deployment order is modeled as an explicit
//! sequence of steps with declared bindings between them, instead of inline
//! sequential code: a later step that needs an earlier contract's address says
//! so with [`ArgBinding::AddressOf`], and the executor resolves it from the
//! addresses recorded so far. This keeps step failure boundaries and
//! already-completed state inspectable independently of the orchestration
//! entry point.

use std::collections::BTreeMap;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::config::LvpConfig;

pub const TOKEN: &str = "LVPToken";
pub const VENDOR: &str = "Vendor";
pub const VOTING: &str = "Voting";

/// A constructor or call argument, either fixed up front or bound to the
/// address of a contract deployed earlier in the same run.
#[derive(Debug, Clone)]
pub enum ArgBinding {
    Literal(DynSolValue),
    AddressOf(String),
}

impl ArgBinding {
    fn address_of(name: &str) -> Self {
        Self::AddressOf(name.to_string())
    }

    fn uint(value: u64) -> Self {
        Self::Literal(DynSolValue::Uint(U256::from(value), 256))
    }
}

/// One step of the plan, executed strictly after all earlier steps confirmed.
#[derive(Debug, Clone)]
pub enum PlanStep {
    /// Create a contract from its compiled artifact.
    Deploy {
        name: String,
        args: Vec<ArgBinding>,
        value: Option<U256>,
        /// Addresses for external library references left open at link time.
        libraries: BTreeMap<String, Address>,
    },
    /// Invoke a method on a contract deployed earlier in the run.
    Call {
        on: String,
        function: String,
        args: Vec<ArgBinding>,
    },
}

/// The ordered sequence of deployment and configuration steps for one run.
///
/// Constructed once per deploy invocation from configuration; not persisted.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    steps: Vec<PlanStep>,
}

impl DeploymentPlan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// The fixed LVP plan: token, then the vendor holding the token address,
    /// then vendor funding and ownership handoff, then voting and its
    /// ownership handoff. The voting window opens when the plan is built.
    pub fn lvp(config: &LvpConfig) -> Self {
        let starting_at = chrono::Utc::now().timestamp() as u64;
        let ending_at = starting_at + config.voting.duration_mins as u64 * 60;
        let funding_wei =
            U256::from(config.vendor.funding_tokens) * U256::from(10u64).pow(U256::from(18u64));
        let owner = DynSolValue::Address(config.ownership_address);

        Self {
            steps: vec![
                PlanStep::Deploy {
                    name: TOKEN.to_string(),
                    args: vec![ArgBinding::uint(config.token.total_supply)],
                    value: None,
                    libraries: BTreeMap::new(),
                },
                PlanStep::Deploy {
                    name: VENDOR.to_string(),
                    args: vec![
                        ArgBinding::uint(config.vendor.buy_price_per_bnb),
                        ArgBinding::uint(config.vendor.sell_price_per_bnb),
                        ArgBinding::address_of(TOKEN),
                    ],
                    value: None,
                    libraries: BTreeMap::new(),
                },
                PlanStep::Call {
                    on: TOKEN.to_string(),
                    function: "transfer".to_string(),
                    args: vec![
                        ArgBinding::address_of(VENDOR),
                        ArgBinding::Literal(DynSolValue::Uint(funding_wei, 256)),
                    ],
                },
                PlanStep::Call {
                    on: VENDOR.to_string(),
                    function: "transferOwnership".to_string(),
                    args: vec![ArgBinding::Literal(owner.clone())],
                },
                PlanStep::Deploy {
                    name: VOTING.to_string(),
                    args: vec![
                        ArgBinding::uint(starting_at),
                        ArgBinding::uint(ending_at),
                        ArgBinding::address_of(TOKEN),
                    ],
                    value: None,
                    libraries: BTreeMap::new(),
                },
                PlanStep::Call {
                    on: VOTING.to_string(),
                    function: "transferOwnership".to_string(),
                    args: vec![ArgBinding::Literal(owner)],
                },
            ],
        }
    }
}

/// A step references the address of a contract that has not been recorded in
/// this run.
#[derive(Debug, Error)]
#[error("step references the address of {0}, which is not deployed in this run")]
pub struct UnresolvedAddress(pub String);

/// Addresses recorded while a plan executes, used to resolve the bindings of
/// later steps.
#[derive(Debug, Default)]
pub struct PlanRun {
    addresses: BTreeMap<String, Address>,
}

impl PlanRun {
    pub fn record_address(&mut self, name: &str, address: Address) {
        self.addresses.insert(name.to_string(), address);
    }

    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.addresses.get(name).copied()
    }

    /// Resolve bindings into concrete call values.
    pub fn resolve(&self, args: &[ArgBinding]) -> Result<Vec<DynSolValue>, UnresolvedAddress> {
        args.iter()
            .map(|arg| match arg {
                ArgBinding::Literal(value) => Ok(value.clone()),
                ArgBinding::AddressOf(name) => self
                    .address_of(name)
                    .map(DynSolValue::Address)
                    .ok_or_else(|| UnresolvedAddress(name.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy_args<'a>(step: &'a PlanStep, expected_name: &str) -> &'a [ArgBinding] {
        match step {
            PlanStep::Deploy { name, args, .. } => {
                assert_eq!(name, expected_name);
                args
            }
            other => panic!("Expected Deploy step for {expected_name}, got {:?}", other),
        }
    }

    #[test]
    fn test_lvp_plan_order() {
        let plan = DeploymentPlan::lvp(&LvpConfig::default());
        let steps = plan.steps();

        assert_eq!(steps.len(), 6);
        deploy_args(&steps[0], TOKEN);
        deploy_args(&steps[1], VENDOR);
        match &steps[2] {
            PlanStep::Call { on, function, .. } => {
                assert_eq!(on, TOKEN);
                assert_eq!(function, "transfer");
            }
            other => panic!("Expected token funding call, got {:?}", other),
        }
        match &steps[3] {
            PlanStep::Call { on, function, .. } => {
                assert_eq!(on, VENDOR);
                assert_eq!(function, "transferOwnership");
            }
            other => panic!("Expected vendor ownership call, got {:?}", other),
        }
        deploy_args(&steps[4], VOTING);
        match &steps[5] {
            PlanStep::Call { on, function, .. } => {
                assert_eq!(on, VOTING);
                assert_eq!(function, "transferOwnership");
            }
            other => panic!("Expected voting ownership call, got {:?}", other),
        }
    }

    #[test]
    fn test_vendor_and_voting_bind_to_token_address() {
        let plan = DeploymentPlan::lvp(&LvpConfig::default());
        let token_address = Address::repeat_byte(0xaa);

        let mut run = PlanRun::default();
        run.record_address(TOKEN, token_address);

        let vendor_args = run.resolve(deploy_args(&plan.steps()[1], VENDOR)).unwrap();
        assert_eq!(
            vendor_args.last().unwrap(),
            &DynSolValue::Address(token_address),
            "Vendor's constructor receives the recorded token address"
        );

        let voting_args = run.resolve(deploy_args(&plan.steps()[4], VOTING)).unwrap();
        assert_eq!(
            voting_args.last().unwrap(),
            &DynSolValue::Address(token_address),
            "Voting's constructor receives the same token address"
        );
    }

    #[test]
    fn test_unresolved_address_is_an_error() {
        let plan = DeploymentPlan::lvp(&LvpConfig::default());
        let run = PlanRun::default();

        let result = run.resolve(deploy_args(&plan.steps()[1], VENDOR));
        assert_eq!(result.unwrap_err().0, TOKEN);
    }

    #[test]
    fn test_voting_window_spans_configured_duration() {
        let mut config = LvpConfig::default();
        config.voting.duration_mins = 90;
        let plan = DeploymentPlan::lvp(&config);

        let args = deploy_args(&plan.steps()[4], VOTING);
        let (starting_at, ending_at) = match (&args[0], &args[1]) {
            (
                ArgBinding::Literal(DynSolValue::Uint(start, _)),
                ArgBinding::Literal(DynSolValue::Uint(end, _)),
            ) => (*start, *end),
            other => panic!("Expected literal window bounds, got {:?}", other),
        };

        assert_eq!(ending_at - starting_at, U256::from(90u64 * 60));
    }

    #[test]
    fn test_funding_transfer_is_scaled_to_wei() {
        let plan = DeploymentPlan::lvp(&LvpConfig::default());

        let args = match &plan.steps()[2] {
            PlanStep::Call { args, .. } => args,
            other => panic!("Expected funding call, got {:?}", other),
        };
        match &args[1] {
            ArgBinding::Literal(DynSolValue::Uint(amount, _)) => {
                let expected =
                    U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64));
                assert_eq!(*amount, expected, "1000 whole tokens in wei");
            }
            other => panic!("Expected literal amount, got {:?}", other),
        }
    }
}
