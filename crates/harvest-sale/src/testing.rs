// SPDX-License-Identifier: AGPL-3.0-only
//! Shared fixture for the sale unit tests.

use crate::sale::TokenSale;
use harvest_core::{HolderLedger, Host, Registry, Role, SaleConfig, TokenLedger};

pub const OWNER: &str = "HRVowner";
pub const MANAGER: &str = "HRVmanager";
pub const SALE: &str = "HRVsale";
pub const VAULT: &str = "HRVvault";
pub const WALLET: &str = "HRVwallet";
pub const TEAM: &str = "HRVteam";
pub const TOKEN: &str = "HRVtoken";
pub const SECONDARY: &str = "HRVsecondary";
pub const ISSUER: &str = "HRVissuer";
pub const ALICE: &str = "HRValice";
pub const BOB: &str = "HRVbob";
pub const CAROL: &str = "HRVcarol";
/// Never registered
pub const DAVE: &str = "HRVdave";

pub const START: u64 = 1_000;
pub const END: u64 = 2_000;
pub const BASE_RATE: u128 = 10;
pub const SECONDARY_RATE: u128 = 5;
pub const MIN_CAP: u128 = 5_000;
pub const MAX_CAP: u128 = 10_000;
pub const MIN_PURCHASE: u128 = 10;
pub const MANAGED: u128 = 2_000;
pub const TOKEN_CAP: u128 = 20_000;
pub const FUNDS: u128 = 1_000_000;

pub fn make_config() -> SaleConfig {
    SaleConfig {
        sale_address: SALE.to_string(),
        vault_address: VAULT.to_string(),
        owner: OWNER.to_string(),
        wallet: WALLET.to_string(),
        token_ledger: TOKEN.to_string(),
        secondary_ledger: SECONDARY.to_string(),
        start_time: START,
        end_time: END,
        min_cap: MIN_CAP,
        max_cap: MAX_CAP,
        base_rate: BASE_RATE,
        secondary_rate: SECONDARY_RATE,
        min_purchase_base: MIN_PURCHASE,
        managed_allocation: MANAGED,
        management_wallet: TEAM.to_string(),
    }
}

pub fn make_host() -> Host {
    let mut registry = Registry::new(OWNER);
    for addr in [ALICE, BOB, CAROL] {
        registry.register(OWNER, addr).unwrap();
    }
    registry.grant_role(OWNER, MANAGER, Role::Manager).unwrap();

    let mut host = Host::new(registry);
    host.add_ledger(TokenLedger::new(TOKEN, "HRV", SALE, TOKEN_CAP).unwrap())
        .unwrap();
    let mut secondary = TokenLedger::new(SECONDARY, "SEC", ISSUER, 0).unwrap();
    for addr in [ALICE, BOB, CAROL] {
        secondary.mint(ISSUER, addr, FUNDS).unwrap();
        host.bank.credit(addr, FUNDS).unwrap();
    }
    host.add_ledger(secondary).unwrap();
    host
}

pub fn make_sale() -> (Host, TokenSale) {
    let host = make_host();
    let sale = TokenSale::new(make_config(), &host).unwrap();
    (host, sale)
}
