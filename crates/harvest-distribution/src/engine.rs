// SPDX-License-Identifier: AGPL-3.0-only
//! # Distribution Engine
//!
//! Turns a manager-funded lump sum into per-holder payouts over a target
//! ledger's holder set, proportional to holding.
//!
//! Two funding paths:
//! - **base currency** (`distribute_profit_base`): the attached payment is
//!   split into income credits, withdrawn later by each holder (pull)
//! - **token** (`distribute_profit_token`): exactly the amount the manager
//!   approved to the distributor on the payout ledger is split and
//!   transferred straight to each holder (push)
//!
//! In both paths only the sum of the floor-rounded shares leaves the
//! manager. Each successful call advances the epoch counter by one.

use crate::events::DistributionEvent;
use crate::income::IncomeLedger;
use crate::payout::{Payout, PayoutKind, PullCredit, PushTransfer};
use crate::shares::{compute_shares, ShareTable};
use harvest_core::math::checked_sum;
use harvest_core::{
    authorize, CallContext, DistributorConfig, EngineError, EngineResult, HolderLedger, Host,
    Role, AMOUNT_CEILING,
};
use serde::{Deserialize, Serialize};

/// Summary of one distribution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReceipt {
    pub epoch: u64,
    pub target_ledger: String,
    pub payout: PayoutKind,
    #[serde(with = "harvest_core::u128_str")]
    pub total_profit: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub denominator: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub distributed: u128,
    /// Kept by the manager
    #[serde(with = "harvest_core::u128_str")]
    pub residue: u128,
    pub holders: Vec<String>,
    #[serde(with = "harvest_core::u128_vec_str")]
    pub shares: Vec<u128>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitDistributor {
    config: DistributorConfig,
    epoch: u64,
    income: IncomeLedger,
    /// Sum of all pull credits ever created
    total_credited: u128,
    /// Sum of income withdrawn plus push transfers
    total_paid_out: u128,
    events: Vec<DistributionEvent>,
}

fn check_profit(profit: u128) -> EngineResult<()> {
    if profit == 0 {
        return Err(EngineError::InvalidInput("profit must be > 0".to_string()));
    }
    if profit >= AMOUNT_CEILING {
        return Err(EngineError::Arithmetic(format!(
            "profit {} is at the numeric ceiling",
            profit
        )));
    }
    Ok(())
}

impl ProfitDistributor {
    pub fn new(config: DistributorConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::InvalidInput)?;
        log::info!(
            "distributor {} deployed (owner {})",
            config.address,
            config.owner
        );
        Ok(Self {
            config,
            epoch: 0,
            income: IncomeLedger::new(),
            total_credited: 0,
            total_paid_out: 0,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// Id of the last completed distribution (0 before the first).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn income(&self) -> &IncomeLedger {
        &self.income
    }

    pub fn get_income(&self, holder: &str) -> u128 {
        self.income.get_income(holder)
    }

    pub fn total_credited(&self) -> u128 {
        self.total_credited
    }

    pub fn total_paid_out(&self) -> u128 {
        self.total_paid_out
    }

    pub fn events(&self) -> &[DistributionEvent] {
        &self.events
    }

    // ─────────────────────────────────────────────────────────────
    // DISTRIBUTION
    // ─────────────────────────────────────────────────────────────

    /// Split the attached base-currency payment over `target_ledger` holders
    /// as withdrawable income.
    pub fn distribute_profit_base(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        target_ledger: &str,
    ) -> EngineResult<DistributionReceipt> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Manager)?;
        let profit = ctx.value;
        check_profit(profit)?;
        let available = host.bank.balance_of(&ctx.caller);
        if available < profit {
            return Err(EngineError::Transfer(format!(
                "attached {} exceeds balance {} of {}",
                profit, available, ctx.caller
            )));
        }

        let table = compute_shares(host.ledger(target_ledger)?, host.gate(), profit)?;
        let distributed = table.distributed()?;

        let mut income = self.income.clone();
        {
            let mut payout = PullCredit {
                income: &mut income,
            };
            for (holder, share) in table.payable() {
                payout.pay(host, holder, share)?;
            }
        }
        let total_credited = checked_sum(self.total_credited, distributed, "total credited")?;

        if distributed > 0 {
            let escrow = self.config.address.clone();
            host.atomic(|h| {
                h.bank
                    .transfer(&ctx.caller, &escrow, distributed)
                    .map_err(EngineError::Transfer)
            })?;
        }

        self.income = income;
        self.total_credited = total_credited;
        Ok(self.record(target_ledger, PayoutKind::Pull, table, distributed))
    }

    /// Split the caller's full approval on `payout_ledger` over
    /// `target_ledger` holders, transferring each share directly.
    pub fn distribute_profit_token(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        payout_ledger: &str,
        target_ledger: &str,
    ) -> EngineResult<DistributionReceipt> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Manager)?;
        let profit = host
            .ledger(payout_ledger)?
            .allowance(&ctx.caller, &self.config.address);
        check_profit(profit)?;

        let table = compute_shares(host.ledger(target_ledger)?, host.gate(), profit)?;
        let distributed = table.distributed()?;
        let total_paid_out = checked_sum(self.total_paid_out, distributed, "total paid out")?;

        let spender = self.config.address.clone();
        host.atomic(|h| {
            let mut payout = PushTransfer {
                ledger: payout_ledger,
                spender: &spender,
                from: &ctx.caller,
            };
            for (holder, share) in table.payable() {
                payout.pay(h, holder, share)?;
            }
            Ok(())
        })?;

        self.total_paid_out = total_paid_out;
        Ok(self.record(target_ledger, PayoutKind::Push, table, distributed))
    }

    fn record(
        &mut self,
        target_ledger: &str,
        payout: PayoutKind,
        table: ShareTable,
        distributed: u128,
    ) -> DistributionReceipt {
        self.epoch += 1;
        let receipt = DistributionReceipt {
            epoch: self.epoch,
            target_ledger: target_ledger.to_string(),
            payout,
            total_profit: table.profit,
            denominator: table.denominator,
            distributed,
            residue: table.profit - distributed,
            holders: table.holders,
            shares: table.shares,
        };
        log::info!(
            "epoch {}: distributed {}/{} over {} ({:?}, {} holders)",
            receipt.epoch,
            receipt.distributed,
            receipt.total_profit,
            target_ledger,
            payout,
            receipt.holders.len()
        );
        self.events.push(DistributionEvent::ProfitDistributed {
            epoch: receipt.epoch,
            target_ledger: receipt.target_ledger.clone(),
            payout,
            total_profit: receipt.total_profit,
            holders: receipt.holders.clone(),
            shares: receipt.shares.clone(),
        });
        receipt
    }

    // ─────────────────────────────────────────────────────────────
    // INCOME
    // ─────────────────────────────────────────────────────────────

    /// Caller withdraws `amount` of their own credited income.
    pub fn withdraw(&mut self, ctx: &CallContext, host: &mut Host, amount: u128) -> EngineResult<()> {
        let total_paid_out = checked_sum(self.total_paid_out, amount, "total paid out")?;
        let escrow = self.config.address.clone();
        self.income.pay_out(host, &escrow, &ctx.caller, amount)?;
        self.total_paid_out = total_paid_out;
        log::info!("{} withdrew {} income", ctx.caller, amount);
        self.events.push(DistributionEvent::IncomeWithdrawn {
            holder: ctx.caller.clone(),
            amount,
        });
        Ok(())
    }

    /// Owner or operator pays out `holder`'s entire credited income.
    pub fn do_transfer(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        holder: &str,
    ) -> EngineResult<u128> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Operator)?;
        let owed = self.income.get_income(holder);
        if owed == 0 {
            return Err(EngineError::State(format!("no income owed to {}", holder)));
        }
        let total_paid_out = checked_sum(self.total_paid_out, owed, "total paid out")?;
        let escrow = self.config.address.clone();
        self.income.pay_out(host, &escrow, holder, owed)?;
        self.total_paid_out = total_paid_out;
        log::info!("{} paid out {} income to {}", ctx.caller, owed, holder);
        self.events.push(DistributionEvent::IncomeTransferred {
            holder: holder.to_string(),
            by: ctx.caller.clone(),
            amount: owed,
        });
        Ok(owed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use harvest_core::ErrorKind;

    // ── Base currency (pull) ──

    #[test]
    fn test_one_one_two_scenario() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10).with_value(4);
        let receipt = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();

        assert_eq!(receipt.epoch, 1);
        assert_eq!(receipt.denominator, 4);
        assert_eq!(receipt.holders, vec![H1, H2, H3, H4]);
        assert_eq!(receipt.shares, vec![1, 1, 2, 0]);
        assert_eq!(receipt.residue, 0);
        assert_eq!(dist.get_income(H1), 1);
        assert_eq!(dist.get_income(H2), 1);
        assert_eq!(dist.get_income(H3), 2);
        assert_eq!(dist.get_income(H4), 0);
        assert_eq!(dist.get_income(TREASURY), 0);
        assert_eq!(host.bank.balance_of(DISTRIBUTOR), 4);
        assert_eq!(host.bank.balance_of(MANAGER), FUNDS - 4);

        // Zero-balance holder has nothing to withdraw
        let h4 = CallContext::new(H4, 11);
        let err = dist.withdraw(&h4, &mut host, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(dist.events().len(), 1);

        let h3 = CallContext::new(H3, 11);
        dist.withdraw(&h3, &mut host, 2).unwrap();
        assert_eq!(host.bank.balance_of(H3), 2);
        assert_eq!(dist.get_income(H3), 0);
        assert_eq!(dist.total_paid_out(), 2);
    }

    #[test]
    fn test_residue_stays_with_manager() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10).with_value(7);
        let receipt = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();
        // floor(7/4)=1, 1, floor(14/4)=3 → 5 distributed
        assert_eq!(receipt.shares, vec![1, 1, 3, 0]);
        assert_eq!(receipt.distributed, 5);
        assert_eq!(receipt.residue, 2);
        assert_eq!(host.bank.balance_of(MANAGER), FUNDS - 5);
        assert_eq!(dist.total_credited(), 5);
        assert_eq!(dist.income().outstanding(), 5);
    }

    #[test]
    fn test_unregistered_holder_gets_nothing() {
        let (mut host, mut dist) = make_distributor();
        host.registry.unregister(OWNER, H2).unwrap();
        let ctx = CallContext::new(MANAGER, 10).with_value(4);
        let receipt = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();
        assert_eq!(receipt.holders, vec![H1, H3, H4]);
        assert_eq!(dist.get_income(H2), 0);
        assert_eq!(receipt.distributed, 3);
        assert_eq!(host.bank.balance_of(MANAGER), FUNDS - 3);
    }

    #[test]
    fn test_ceiling_profit_rejected() {
        let (mut host, mut dist) = make_distributor();
        host.bank.credit(MANAGER, u128::MAX - FUNDS).unwrap();
        let ctx = CallContext::new(MANAGER, 10).with_value(u128::MAX);
        let err = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert_eq!(dist.epoch(), 0);
        assert!(dist.events().is_empty());
        assert_eq!(host.bank.balance_of(DISTRIBUTOR), 0);
    }

    #[test]
    fn test_overflowing_share_rejected() {
        let (mut host, mut dist) = make_distributor();
        host.bank.credit(MANAGER, u128::MAX - FUNDS).unwrap();
        // profit × 2 does not fit
        let ctx = CallContext::new(MANAGER, 10).with_value(u128::MAX / 2 + 1);
        let err = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert_eq!(dist.income().outstanding(), 0);
    }

    #[test]
    fn test_manager_check() {
        let (mut host, mut dist) = make_distributor();
        host.bank.credit(OPERATOR, 10).unwrap();
        let ctx = CallContext::new(OPERATOR, 10).with_value(4);
        let err = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eligibility);
        assert_eq!(host.bank.balance_of(OPERATOR), 10);
    }

    #[test]
    fn test_zero_profit_and_underfunded_rejected() {
        let (mut host, mut dist) = make_distributor();
        let zero = CallContext::new(MANAGER, 10);
        assert_eq!(
            dist.distribute_profit_base(&zero, &mut host, SHARES)
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidInput
        );
        let rich = CallContext::new(MANAGER, 10).with_value(FUNDS + 1);
        assert_eq!(
            dist.distribute_profit_base(&rich, &mut host, SHARES)
                .unwrap_err()
                .kind(),
            ErrorKind::Transfer
        );
    }

    #[test]
    fn test_epochs_increment() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10).with_value(4);
        dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();
        let second = dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();
        assert_eq!(second.epoch, 2);
        assert_eq!(dist.epoch(), 2);
        assert_eq!(dist.get_income(H3), 4);
        match dist.events().last() {
            Some(DistributionEvent::ProfitDistributed { epoch, shares, .. }) => {
                assert_eq!(*epoch, 2);
                assert_eq!(shares, &vec![1, 1, 2, 0]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    // ── Income ──

    #[test]
    fn test_withdraw_bounds() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10).with_value(40);
        dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();
        let h3 = CallContext::new(H3, 11);
        assert_eq!(dist.get_income(H3), 20);
        assert_eq!(
            dist.withdraw(&h3, &mut host, 21).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            dist.withdraw(&h3, &mut host, 0).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        dist.withdraw(&h3, &mut host, 5).unwrap();
        assert_eq!(dist.get_income(H3), 15);
        assert_eq!(host.bank.balance_of(H3), 5);
    }

    #[test]
    fn test_do_transfer() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10).with_value(4);
        dist.distribute_profit_base(&ctx, &mut host, SHARES).unwrap();

        let stranger = CallContext::new(H1, 11);
        assert_eq!(
            dist.do_transfer(&stranger, &mut host, H3).unwrap_err().kind(),
            ErrorKind::Eligibility
        );

        let op = CallContext::new(OPERATOR, 11);
        assert_eq!(dist.do_transfer(&op, &mut host, H3).unwrap(), 2);
        assert_eq!(host.bank.balance_of(H3), 2);
        assert_eq!(host.bank.balance_of(OPERATOR), 0);
        assert_eq!(
            dist.events().last(),
            Some(&DistributionEvent::IncomeTransferred {
                holder: H3.to_string(),
                by: OPERATOR.to_string(),
                amount: 2,
            })
        );

        // Credit now zero: a second sweep is rejected
        let err = dist.do_transfer(&op, &mut host, H3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    // ── Token (push) ──

    #[test]
    fn test_distribute_profit_token() {
        let (mut host, mut dist) = make_distributor();
        host.ledger_mut(PAYOUT)
            .unwrap()
            .approve(MANAGER, DISTRIBUTOR, 9)
            .unwrap();
        let ctx = CallContext::new(MANAGER, 10);
        let receipt = dist
            .distribute_profit_token(&ctx, &mut host, PAYOUT, SHARES)
            .unwrap();

        // floor(9/4)=2, 2, floor(18/4)=4 → residue 1 left approved
        assert_eq!(receipt.shares, vec![2, 2, 4, 0]);
        assert_eq!(receipt.payout, PayoutKind::Push);
        let usd = host.ledger(PAYOUT).unwrap();
        assert_eq!(usd.balance_of(H1), 2);
        assert_eq!(usd.balance_of(H3), 4);
        assert_eq!(usd.balance_of(MANAGER), FUNDS - 8);
        assert_eq!(usd.allowance(MANAGER, DISTRIBUTOR), 1);
        assert_eq!(dist.get_income(H1), 0);
        assert_eq!(dist.total_paid_out(), 8);
    }

    #[test]
    fn test_token_push_failure_is_atomic() {
        let (mut host, mut dist) = make_distributor();
        // Approval larger than the manager's balance: a later transfer fails
        host.ledger_mut(PAYOUT)
            .unwrap()
            .approve(MANAGER, DISTRIBUTOR, FUNDS * 2)
            .unwrap();
        let ctx = CallContext::new(MANAGER, 10);
        let err = dist
            .distribute_profit_token(&ctx, &mut host, PAYOUT, SHARES)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);
        let usd = host.ledger(PAYOUT).unwrap();
        assert_eq!(usd.balance_of(H1), 0);
        assert_eq!(usd.balance_of(MANAGER), FUNDS);
        assert_eq!(dist.epoch(), 0);
    }

    #[test]
    fn test_token_without_approval_rejected() {
        let (mut host, mut dist) = make_distributor();
        let ctx = CallContext::new(MANAGER, 10);
        let err = dist
            .distribute_profit_token(&ctx, &mut host, PAYOUT, SHARES)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_token_unlimited_approval_rejected() {
        let (mut host, mut dist) = make_distributor();
        host.ledger_mut(PAYOUT)
            .unwrap()
            .approve(MANAGER, DISTRIBUTOR, u128::MAX)
            .unwrap();
        let ctx = CallContext::new(MANAGER, 10);
        let err = dist
            .distribute_profit_token(&ctx, &mut host, PAYOUT, SHARES)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert_eq!(host.ledger(PAYOUT).unwrap().balance_of(H1), 0);
    }
}
