// SPDX-License-Identifier: AGPL-3.0-only
//! Shared fixture for the distribution unit tests.
//!
//! Share ledger holders in order: H1=1, H2=1, H3=2, H4=0 (held 1, moved it
//! to the special treasury), TREASURY=1 (special).

use crate::engine::ProfitDistributor;
use harvest_core::{DistributorConfig, HolderLedger, Host, Registry, Role, TokenLedger};

pub const OWNER: &str = "HRVowner";
pub const MANAGER: &str = "HRVmanager";
pub const OPERATOR: &str = "HRVoperator";
pub const DISTRIBUTOR: &str = "HRVdistributor";
pub const ISSUER: &str = "HRVissuer";
pub const SHARES: &str = "HRVshares";
pub const PAYOUT: &str = "HRVusd";
pub const TREASURY: &str = "HRVtreasury";
pub const H1: &str = "HRVholder1";
pub const H2: &str = "HRVholder2";
pub const H3: &str = "HRVholder3";
pub const H4: &str = "HRVholder4";
pub const FUNDS: u128 = 1_000_000;

pub fn make_host() -> Host {
    let mut registry = Registry::new(OWNER);
    for addr in [H1, H2, H3, H4, TREASURY] {
        registry.register(OWNER, addr).unwrap();
    }
    registry.set_special(OWNER, TREASURY, true).unwrap();
    registry.grant_role(OWNER, MANAGER, Role::Manager).unwrap();
    registry.grant_role(OWNER, OPERATOR, Role::Operator).unwrap();

    let mut shares = TokenLedger::new(SHARES, "SHR", ISSUER, 0).unwrap();
    for (addr, amount) in [(H1, 1), (H2, 1), (H3, 2), (H4, 1)] {
        shares.mint(ISSUER, addr, amount).unwrap();
    }
    shares.transfer(H4, TREASURY, 1).unwrap();

    let mut usd = TokenLedger::new(PAYOUT, "USD", ISSUER, 0).unwrap();
    usd.mint(ISSUER, MANAGER, FUNDS).unwrap();

    let mut host = Host::new(registry);
    host.add_ledger(shares).unwrap();
    host.add_ledger(usd).unwrap();
    host.bank.credit(MANAGER, FUNDS).unwrap();
    host
}

pub fn make_distributor() -> (Host, ProfitDistributor) {
    let dist = ProfitDistributor::new(DistributorConfig {
        address: DISTRIBUTOR.to_string(),
        owner: OWNER.to_string(),
    })
    .unwrap();
    (make_host(), dist)
}
