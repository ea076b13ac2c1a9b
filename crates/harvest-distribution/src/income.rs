// SPDX-License-Identifier: AGPL-3.0-only
//! # Income Ledger
//!
//! Pull half of a base-currency distribution: holder → unclaimed credit.
//! The credited funds sit in the distributor's bank account until withdrawn.
//!
//! ## Invariants
//! - `outstanding` equals the sum of all credits
//! - a debit never exceeds the holder's credit, and the outbound bank
//!   transfer and the decrement apply together or not at all

use harvest_core::math::checked_sum;
use harvest_core::{EngineError, EngineResult, Host};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeLedger {
    credits: BTreeMap<String, u128>,
    outstanding: u128,
}

impl IncomeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_income(&self, holder: &str) -> u128 {
        self.credits.get(holder).copied().unwrap_or(0)
    }

    /// Total owed across all holders.
    pub fn outstanding(&self) -> u128 {
        self.outstanding
    }

    /// Holders with a nonzero credit.
    pub fn creditors(&self) -> impl Iterator<Item = (&str, u128)> {
        self.credits
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn credit(&mut self, holder: &str, amount: u128) -> EngineResult<()> {
        let updated = checked_sum(self.get_income(holder), amount, "holder income")?;
        let outstanding = checked_sum(self.outstanding, amount, "outstanding income")?;
        self.credits.insert(holder.to_string(), updated);
        self.outstanding = outstanding;
        Ok(())
    }

    /// Pay `amount` of `holder`'s credit out of `escrow` and decrement it.
    pub fn pay_out(
        &mut self,
        host: &mut Host,
        escrow: &str,
        holder: &str,
        amount: u128,
    ) -> EngineResult<()> {
        if amount == 0 {
            return Err(EngineError::InvalidInput(
                "withdraw amount must be > 0".to_string(),
            ));
        }
        let owed = self.get_income(holder);
        if owed == 0 {
            return Err(EngineError::State(format!("no income owed to {}", holder)));
        }
        if amount > owed {
            return Err(EngineError::InvalidInput(format!(
                "withdraw {} exceeds credited income {}",
                amount, owed
            )));
        }

        host.atomic(|h| {
            h.bank
                .transfer(escrow, holder, amount)
                .map_err(EngineError::Transfer)
        })?;

        let remaining = owed - amount;
        if remaining == 0 {
            self.credits.remove(holder);
        } else {
            self.credits.insert(holder.to_string(), remaining);
        }
        self.outstanding -= amount;
        Ok(())
    }
}
