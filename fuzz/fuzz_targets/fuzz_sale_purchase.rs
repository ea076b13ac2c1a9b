//! Fuzz target: sale purchase sequences
//!
//! Random sequences of base and secondary purchases at random times against
//! a live sale. Verifies no panic and that tokens_sold never exceeds the
//! hard cap and always equals the minted supply.
//!
//! Run: cargo +nightly fuzz run fuzz_sale_purchase

#![no_main]
use arbitrary::Arbitrary;
use harvest_core::{CallContext, HolderLedger, Host, Registry, SaleConfig, TokenLedger};
use harvest_sale::TokenSale;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzPurchase {
    buyer_idx: u8,
    secondary: bool,
    amount: u128,
    now: u16,
}

#[derive(Arbitrary, Debug)]
struct FuzzSaleInput {
    max_cap: u64,
    base_rate: u16,
    secondary_rate: u16,
    min_purchase_base: u16,
    purchases: Vec<FuzzPurchase>,
}

const OWNER: &str = "HRVowner";
const SALE: &str = "HRVsale";
const BUYERS: [&str; 4] = ["HRValice", "HRVbob", "HRVcarol", "HRVdave"];

fuzz_target!(|input: FuzzSaleInput| {
    let max_cap = input.max_cap as u128;
    if max_cap == 0 || input.base_rate == 0 || input.secondary_rate == 0 {
        return;
    }

    let mut registry = Registry::new(OWNER);
    // HRVdave stays unregistered
    for b in &BUYERS[..3] {
        let _ = registry.register(OWNER, b);
    }
    let mut host = Host::new(registry);
    let token = TokenLedger::new("HRVtoken", "HRV", SALE, 0).expect("ledger");
    let mut usd = TokenLedger::new("HRVusd", "USD", OWNER, 0).expect("ledger");
    for b in BUYERS {
        let _ = usd.mint(OWNER, b, u64::MAX as u128);
        let _ = host.bank.credit(b, u64::MAX as u128);
    }
    let _ = host.add_ledger(token);
    let _ = host.add_ledger(usd);

    let config = SaleConfig {
        sale_address: SALE.to_string(),
        vault_address: "HRVvault".to_string(),
        owner: OWNER.to_string(),
        wallet: "HRVwallet".to_string(),
        token_ledger: "HRVtoken".to_string(),
        secondary_ledger: "HRVusd".to_string(),
        start_time: 1_000,
        end_time: 50_000,
        min_cap: max_cap / 2,
        max_cap,
        base_rate: input.base_rate as u128,
        secondary_rate: input.secondary_rate as u128,
        min_purchase_base: input.min_purchase_base as u128,
        managed_allocation: 0,
        management_wallet: String::new(),
    };
    let mut sale = match TokenSale::new(config, &host) {
        Ok(s) => s,
        Err(_) => return,
    };

    for p in input.purchases.iter().take(32) {
        let buyer = BUYERS[p.buyer_idx as usize % BUYERS.len()];
        let ctx = CallContext::new(buyer, p.now as u64);
        let _ = if p.secondary {
            if let Ok(l) = host.ledger_mut("HRVusd") {
                let _ = l.approve(buyer, SALE, p.amount);
            }
            sale.contribute_secondary_via_approval(&ctx, &mut host, buyer)
        } else {
            sale.contribute_base(&ctx.with_value(p.amount), &mut host, buyer)
        };
        assert!(sale.state().tokens_sold <= max_cap);
    }

    let supply = host.ledger("HRVtoken").map(|l| l.total_supply()).unwrap_or(0);
    assert_eq!(supply, sale.state().tokens_sold);
});
