//! Scenario replay.
//!
//! A scenario describes the initial world (registry, ledgers, bank balances,
//! deployment config) and an ordered list of calls. Each call targets either
//! the sale or the distributor and is executed exactly as a host would.

use crate::{print_info, print_success};
use colored::*;
use harvest_core::config::u128_flex;
use harvest_core::{CallContext, HarvestConfig, HolderLedger, Host, Registry, Role, TokenLedger};
use harvest_distribution::{DistributionAction, DistributionResponse, ProfitDistributor};
use harvest_sale::{SaleAction, SaleResponse, TokenSale};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySetup {
    pub owner: String,
    #[serde(default)]
    pub registered: Vec<String>,
    #[serde(default)]
    pub special: Vec<String>,
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<Role>>,
}

/// Amount written as a string or an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FlexAmount(#[serde(with = "u128_flex")] pub u128);

#[derive(Debug, Clone, Deserialize)]
pub struct MintSetup {
    pub to: String,
    #[serde(with = "u128_flex")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSetup {
    pub address: String,
    pub symbol: String,
    pub owner: String,
    #[serde(default, with = "u128_flex")]
    pub cap: u128,
    #[serde(default)]
    pub mints: Vec<MintSetup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub caller: String,
    #[serde(default)]
    pub now: u64,
    #[serde(default, with = "u128_flex")]
    pub value: u128,
    #[serde(default)]
    pub sale: Option<SaleAction>,
    #[serde(default)]
    pub distribution: Option<DistributionAction>,
    /// When set, a step whose outcome differs fails the replay
    #[serde(default)]
    pub expect_success: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub config: HarvestConfig,
    pub registry: RegistrySetup,
    #[serde(default)]
    pub ledgers: Vec<LedgerSetup>,
    #[serde(default)]
    pub bank: BTreeMap<String, FlexAmount>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepResponse {
    Sale(SaleResponse),
    Distribution(DistributionResponse),
}

impl StepResponse {
    pub fn success(&self) -> bool {
        match self {
            StepResponse::Sale(r) => r.success,
            StepResponse::Distribution(r) => r.success,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StepResponse::Sale(r) => &r.message,
            StepResponse::Distribution(r) => &r.message,
        }
    }

    pub fn event_count(&self) -> usize {
        match self {
            StepResponse::Sale(r) => r.events.len(),
            StepResponse::Distribution(r) => r.events.len(),
        }
    }
}

/// World after replay.
pub struct Simulation {
    pub host: Host,
    pub sale: TokenSale,
    pub distributor: ProfitDistributor,
    pub responses: Vec<StepResponse>,
}

fn build_host(scenario: &Scenario) -> Result<Host, String> {
    let setup = &scenario.registry;
    let mut registry = Registry::new(&setup.owner);
    for addr in &setup.registered {
        registry.register(&setup.owner, addr)?;
    }
    for addr in &setup.special {
        registry.set_special(&setup.owner, addr, true)?;
    }
    for (addr, roles) in &setup.roles {
        for role in roles {
            registry.grant_role(&setup.owner, addr, *role)?;
        }
    }

    let mut host = Host::new(registry);
    for setup in &scenario.ledgers {
        let mut ledger = TokenLedger::new(&setup.address, &setup.symbol, &setup.owner, setup.cap)?;
        for m in &setup.mints {
            ledger.mint(&setup.owner, &m.to, m.amount)?;
        }
        host.add_ledger(ledger)?;
    }
    for (addr, amount) in &scenario.bank {
        host.bank.credit(addr, amount.0)?;
    }
    Ok(host)
}

pub fn run_scenario(scenario: &Scenario) -> Result<Simulation, Box<dyn std::error::Error>> {
    scenario.config.validate()?;
    let mut host = build_host(scenario)?;
    let mut sale = TokenSale::new(scenario.config.sale.clone(), &host)?;
    let mut distributor = ProfitDistributor::new(scenario.config.distributor.clone())?;
    let mut responses = Vec::with_capacity(scenario.steps.len());

    for (i, step) in scenario.steps.iter().enumerate() {
        let ctx = CallContext::new(&step.caller, step.now).with_value(step.value);
        let response = match (&step.sale, &step.distribution) {
            (Some(action), None) => {
                StepResponse::Sale(sale.execute(&ctx, &mut host, action.clone()))
            }
            (None, Some(action)) => {
                StepResponse::Distribution(distributor.execute(&ctx, &mut host, action.clone()))
            }
            _ => {
                return Err(format!(
                    "step {}: exactly one of `sale` or `distribution` is required",
                    i
                )
                .into())
            }
        };
        log::debug!("step {} by {}: {}", i, step.caller, response.message());
        if let Some(expected) = step.expect_success {
            if expected != response.success() {
                return Err(format!(
                    "step {}: expected success={}, got \"{}\"",
                    i,
                    expected,
                    response.message()
                )
                .into());
            }
        }
        responses.push(response);
    }

    Ok(Simulation {
        host,
        sale,
        distributor,
        responses,
    })
}

pub fn handle(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&data)?;
    if !json {
        print_info(&format!(
            "Replaying {} steps from {}...",
            scenario.steps.len(),
            path.display()
        ));
        println!();
    }

    let sim = run_scenario(&scenario)?;

    if json {
        for r in &sim.responses {
            println!("{}", serde_json::to_string(r)?);
        }
        return Ok(());
    }

    for (i, (step, r)) in scenario.steps.iter().zip(sim.responses.iter()).enumerate() {
        let mark = if r.success() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!(
            "{:>3} {} {} {} ({} events)",
            i,
            mark,
            step.caller.dimmed(),
            r.message(),
            r.event_count()
        );
    }

    let last_now = scenario.steps.last().map(|s| s.now).unwrap_or(0);
    let state = sim.sale.state();
    println!();
    println!("{} {:?}", "Phase:".bold(), sim.sale.phase(last_now));
    println!(
        "{} {}/{}",
        "Tokens sold:".bold(),
        state.tokens_sold.to_string().cyan(),
        sim.sale.config().max_cap
    );
    println!(
        "{} base {} / secondary {}",
        "Raised:".bold(),
        state.base_raised,
        state.secondary_raised
    );
    println!("{} {}", "Epochs:".bold(), sim.distributor.epoch());
    println!(
        "{} {}",
        "Outstanding income:".bold(),
        sim.distributor.income().outstanding()
    );
    let token = sim.host.ledger(&sim.sale.config().token_ledger)?;
    println!("{} {}", "Token holders:".bold(), token.holder_count());
    println!();
    print_success("Scenario complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = include_str!("../../../../demos/scenario.json");

    #[test]
    fn test_demo_scenario_replays() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let sim = run_scenario(&scenario).unwrap();
        assert_eq!(sim.responses.len(), scenario.steps.len());
        assert!(sim.sale.state().finalized);
        assert_eq!(sim.distributor.epoch(), 1);
    }

    #[test]
    fn test_step_needs_one_target() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.steps.truncate(1);
        scenario.steps[0].sale = None;
        assert!(run_scenario(&scenario).is_err());
    }

    #[test]
    fn test_expectation_mismatch_fails_replay() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.steps.truncate(1);
        scenario.steps[0].expect_success = Some(false);
        assert!(run_scenario(&scenario).is_err());
    }

    #[test]
    fn test_bank_amounts_accept_strings_or_integers() {
        let mut value: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        value["bank"] = serde_json::json!({
            "HRValice": 10000,
            "HRVbob": "10_000",
            "HRVmanager": "100000"
        });
        let scenario: Scenario = serde_json::from_value(value).unwrap();
        assert_eq!(scenario.bank["HRValice"], FlexAmount(10_000));
        assert_eq!(scenario.bank["HRVbob"], FlexAmount(10_000));
        let host = build_host(&scenario).unwrap();
        assert_eq!(host.bank.balance_of("HRVmanager"), 100_000);
    }

    #[test]
    fn test_failed_replay_returns_error_to_caller() {
        let mut value: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        value["steps"] = serde_json::json!([{
            "caller": "HRValice", "now": 1000, "value": "300",
            "sale": { "action": "ContributeBase", "beneficiary": "HRValice" },
            "expect_success": false
        }]);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, value.to_string()).unwrap();
        let err = handle(&path, true).unwrap_err();
        assert!(err.to_string().starts_with("step 0: expected success=false"), "{}", err);
    }
}
