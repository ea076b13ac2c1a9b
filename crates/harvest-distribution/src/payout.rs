// SPDX-License-Identifier: AGPL-3.0-only
//! Payout capability with two implementations: credit an income ledger for
//! later withdrawal (pull), or move tokens from the manager straight to the
//! holder (push).

use crate::income::IncomeLedger;
use harvest_core::{EngineError, EngineResult, HolderLedger, Host};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    Pull,
    Push,
}

pub trait Payout {
    fn kind(&self) -> PayoutKind;

    /// Deliver `amount` to `holder`.
    fn pay(&mut self, host: &mut Host, holder: &str, amount: u128) -> EngineResult<()>;
}

/// Credits the holder's unclaimed income.
pub struct PullCredit<'a> {
    pub income: &'a mut IncomeLedger,
}

impl Payout for PullCredit<'_> {
    fn kind(&self) -> PayoutKind {
        PayoutKind::Pull
    }

    fn pay(&mut self, _host: &mut Host, holder: &str, amount: u128) -> EngineResult<()> {
        self.income.credit(holder, amount)
    }
}

/// `transfer_from(spender, from → holder)` on the payout ledger.
pub struct PushTransfer<'a> {
    pub ledger: &'a str,
    /// Account holding the approval (the distributor)
    pub spender: &'a str,
    /// Funding account (the manager)
    pub from: &'a str,
}

impl Payout for PushTransfer<'_> {
    fn kind(&self) -> PayoutKind {
        PayoutKind::Push
    }

    fn pay(&mut self, host: &mut Host, holder: &str, amount: u128) -> EngineResult<()> {
        host.ledger_mut(self.ledger)?
            .transfer_from(self.spender, self.from, holder, amount)
            .map_err(EngineError::Transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::{Registry, TokenLedger};

    #[test]
    fn test_pull_credit_touches_only_income() {
        let mut host = Host::new(Registry::new("HRVowner"));
        let mut income = IncomeLedger::new();
        let mut payout = PullCredit {
            income: &mut income,
        };
        payout.pay(&mut host, "HRValice", 7).unwrap();
        assert_eq!(payout.kind(), PayoutKind::Pull);
        assert_eq!(income.get_income("HRValice"), 7);
        assert_eq!(host.bank.total(), 0);
    }

    #[test]
    fn test_push_transfer_spends_approval() {
        let mut host = Host::new(Registry::new("HRVowner"));
        let mut usd = TokenLedger::new("HRVusd", "USD", "HRVissuer", 0).unwrap();
        usd.mint("HRVissuer", "HRVmanager", 100).unwrap();
        usd.approve("HRVmanager", "HRVdistributor", 10).unwrap();
        host.add_ledger(usd).unwrap();

        let mut payout = PushTransfer {
            ledger: "HRVusd",
            spender: "HRVdistributor",
            from: "HRVmanager",
        };
        payout.pay(&mut host, "HRValice", 6).unwrap();
        let usd = host.ledger("HRVusd").unwrap();
        assert_eq!(usd.balance_of("HRValice"), 6);
        assert_eq!(usd.allowance("HRVmanager", "HRVdistributor"), 4);

        assert!(payout.pay(&mut host, "HRVbob", 5).is_err());
    }
}
