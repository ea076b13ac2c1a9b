//! Fuzz target: pro-rata share computation
//!
//! Random holder sets (balances, registration, special flags) and profits.
//! Verifies compute_shares never panics, never pays out more than the
//! profit, and every share is exactly floor(profit × balance / total).
//!
//! Run: cargo +nightly fuzz run fuzz_distribution_shares

#![no_main]
use arbitrary::Arbitrary;
use harvest_core::{HolderLedger, Registry, TokenLedger};
use harvest_distribution::compute_shares;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzHolder {
    balance: u128,
    registered: bool,
    special: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzSharesInput {
    holders: Vec<FuzzHolder>,
    profit: u128,
}

const OWNER: &str = "HRVowner";

fuzz_target!(|input: FuzzSharesInput| {
    let mut registry = Registry::new(OWNER);
    let mut ledger = match TokenLedger::new("HRVshares", "SHR", OWNER, 0) {
        Ok(l) => l,
        Err(_) => return,
    };

    // Cap holder count to keep iterations fast
    for (i, h) in input.holders.iter().take(64).enumerate() {
        let addr = format!("HRVholder{}", i);
        if h.balance > 0 && ledger.mint(OWNER, &addr, h.balance).is_err() {
            // Supply overflow: stop seeding
            break;
        }
        if h.registered {
            let _ = registry.register(OWNER, &addr);
        }
        if h.special {
            let _ = registry.set_special(OWNER, &addr, true);
        }
    }

    if let Ok(table) = compute_shares(&ledger, &registry, input.profit) {
        let mut sum: u128 = 0;
        for (addr, share) in table.holders.iter().zip(table.shares.iter()) {
            let b = ledger.balance_of(addr);
            let product = input.profit.checked_mul(b).expect("accepted share must not overflow");
            assert_eq!(*share, product / table.denominator);
            sum = sum.checked_add(*share).expect("sum of shares overflowed");
        }
        assert!(sum <= input.profit);
        assert_eq!(table.holders.len(), table.shares.len());
    }
});
