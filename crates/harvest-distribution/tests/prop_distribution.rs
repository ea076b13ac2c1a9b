// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS - harvest-distribution
//
// Pro-rata share invariants over random holder sets and profits.
// Run: cargo test --release -p harvest-distribution --test prop_distribution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use harvest_core::{
    CallContext, DistributorConfig, HolderLedger, Host, Registry, Role, TokenLedger,
};
use harvest_distribution::{compute_shares, ProfitDistributor};
use proptest::prelude::*;

const OWNER: &str = "HRVowner";
const MANAGER: &str = "HRVmanager";
const DISTRIBUTOR: &str = "HRVdistributor";
const SHARES: &str = "HRVshares";

fn holder(i: usize) -> String {
    format!("HRVholder{}", i)
}

/// (balance, registered, special) per holder
fn arb_holders() -> impl Strategy<Value = Vec<(u128, bool, bool)>> {
    proptest::collection::vec((1u128..1_000_000_000, prop::bool::weighted(0.85), prop::bool::weighted(0.1)), 1..60)
}

fn setup(holders: &[(u128, bool, bool)]) -> (Registry, TokenLedger) {
    let mut registry = Registry::new(OWNER);
    let mut ledger = TokenLedger::new(SHARES, "SHR", OWNER, 0).unwrap();
    for (i, (balance, registered, special)) in holders.iter().enumerate() {
        ledger.mint(OWNER, &holder(i), *balance).unwrap();
        if *registered {
            registry.register(OWNER, &holder(i)).unwrap();
        }
        if *special {
            registry.set_special(OWNER, &holder(i), true).unwrap();
        }
    }
    (registry, ledger)
}

proptest! {
    /// PROPERTY: each share is exactly floor(P × b / T) and the sum never exceeds P
    #[test]
    fn prop_shares_are_floor_and_bounded(
        holders in arb_holders(),
        profit in 1u128..1_000_000_000_000_000_000,
    ) {
        let (registry, ledger) = setup(&holders);
        let denominator: u128 = holders.iter().filter(|h| !h.2).map(|h| h.0).sum();
        match compute_shares(&ledger, &registry, profit) {
            Ok(table) => {
                prop_assert_eq!(table.denominator, denominator);
                let mut sum = 0u128;
                for (addr, share) in table.holders.iter().zip(table.shares.iter()) {
                    let b = ledger.balance_of(addr);
                    prop_assert_eq!(*share, profit * b / denominator);
                    sum += share;
                }
                prop_assert!(sum <= profit);
                prop_assert_eq!(table.distributed().unwrap(), sum);
            }
            Err(_) => prop_assert_eq!(denominator, 0),
        }
    }

    /// PROPERTY: only registered, non-special holders appear, in ledger order
    #[test]
    fn prop_only_eligible_holders_listed(holders in arb_holders(), profit in 1u128..1_000_000) {
        let (registry, ledger) = setup(&holders);
        if let Ok(table) = compute_shares(&ledger, &registry, profit) {
            let expected: Vec<String> = holders
                .iter()
                .enumerate()
                .filter(|(_, h)| h.1 && !h.2)
                .map(|(i, _)| holder(i))
                .collect();
            prop_assert_eq!(table.holders, expected);
        }
    }

    /// PROPERTY: a pull distribution moves exactly the credited sum out of
    /// the manager's balance and into the distributor
    #[test]
    fn prop_base_distribution_conserves_funds(
        holders in arb_holders(),
        profit in 1u128..1_000_000_000,
    ) {
        let (mut registry, ledger) = setup(&holders);
        registry.grant_role(OWNER, MANAGER, Role::Manager).unwrap();
        let mut host = Host::new(registry);
        host.add_ledger(ledger).unwrap();
        host.bank.credit(MANAGER, profit).unwrap();
        let mut dist = ProfitDistributor::new(DistributorConfig {
            address: DISTRIBUTOR.to_string(),
            owner: OWNER.to_string(),
        })
        .unwrap();

        let ctx = CallContext::new(MANAGER, 1).with_value(profit);
        if let Ok(receipt) = dist.distribute_profit_base(&ctx, &mut host, SHARES) {
            prop_assert_eq!(host.bank.balance_of(DISTRIBUTOR), receipt.distributed);
            prop_assert_eq!(host.bank.balance_of(MANAGER), receipt.residue);
            prop_assert_eq!(dist.income().outstanding(), receipt.distributed);
            prop_assert_eq!(receipt.distributed + receipt.residue, profit);
        } else {
            prop_assert_eq!(host.bank.balance_of(MANAGER), profit);
            prop_assert_eq!(dist.epoch(), 0);
        }
    }
}
