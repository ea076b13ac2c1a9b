// SPDX-License-Identifier: AGPL-3.0-only
//! Pro-rata share computation.
//!
//! `share_i = floor(profit × balance_i / denominator)` where the denominator
//! is the ledger's aggregate balance excluding special holders. Holders are
//! walked in ledger order. Unregistered and special holders are skipped and
//! get nothing; the sum of shares never exceeds `profit`, and what floor
//! rounding leaves behind stays with whoever funded the distribution.

use harvest_core::math::{checked_sum, mul_div_floor};
use harvest_core::{EligibilityGate, EngineError, EngineResult, HolderLedger};
use serde::{Deserialize, Serialize};

/// Ordered per-holder shares for one distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTable {
    #[serde(with = "harvest_core::u128_str")]
    pub profit: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub denominator: u128,
    /// Eligible holders in ledger order, zero shares included
    pub holders: Vec<String>,
    #[serde(with = "harvest_core::u128_vec_str")]
    pub shares: Vec<u128>,
}

impl ShareTable {
    /// Sum of all shares.
    pub fn distributed(&self) -> EngineResult<u128> {
        self.shares
            .iter()
            .try_fold(0u128, |acc, s| checked_sum(acc, *s, "distributed total"))
    }

    /// `profit - distributed`, the rounding residue plus any skipped holders' part.
    pub fn residue(&self) -> EngineResult<u128> {
        Ok(self.profit - self.distributed()?)
    }

    /// Holders with a nonzero share.
    pub fn payable(&self) -> impl Iterator<Item = (&str, u128)> {
        self.holders
            .iter()
            .zip(self.shares.iter())
            .filter(|(_, s)| **s > 0)
            .map(|(h, s)| (h.as_str(), *s))
    }

    pub fn share_of(&self, holder: &str) -> u128 {
        self.holders
            .iter()
            .position(|h| h == holder)
            .and_then(|i| self.shares.get(i).copied())
            .unwrap_or(0)
    }
}

pub fn compute_shares(
    ledger: &dyn HolderLedger,
    gate: &dyn EligibilityGate,
    profit: u128,
) -> EngineResult<ShareTable> {
    if profit == 0 {
        return Err(EngineError::InvalidInput("profit must be > 0".to_string()));
    }
    let denominator = ledger
        .aggregate_balance_excluding_special(gate)
        .ok_or_else(|| EngineError::overflow("aggregate holder balance"))?;
    if denominator == 0 {
        return Err(EngineError::State(format!(
            "ledger {} has no eligible balance to distribute over",
            ledger.address()
        )));
    }

    let mut table = ShareTable {
        profit,
        denominator,
        holders: Vec::new(),
        shares: Vec::new(),
    };
    for i in 0..ledger.holder_count() {
        let holder = match ledger.holder_at(i) {
            Some(h) => h,
            None => continue,
        };
        if gate.is_special(holder) {
            continue;
        }
        if !gate.is_registered(holder) {
            log::debug!("holder {} unregistered, skipped", holder);
            continue;
        }
        let share = mul_div_floor(profit, ledger.balance_of(holder), denominator)?;
        table.holders.push(holder.to_string());
        table.shares.push(share);
    }

    log::debug!(
        "shares over {}: profit={} denominator={} holders={}",
        ledger.address(),
        profit,
        denominator,
        table.holders.len()
    );
    Ok(table)
}
