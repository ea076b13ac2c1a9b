// SPDX-License-Identifier: AGPL-3.0-only
//! Base-currency balances.
//!
//! Payments attached to a call (`CallContext::value`) are moved by the engine
//! through the bank; the bank itself performs no authorization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeBank {
    balances: BTreeMap<String, u128>,
}

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, addr: &str) -> u128 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    /// Genesis/faucet credit.
    pub fn credit(&mut self, addr: &str, amount: u128) -> Result<(), String> {
        let bal = self.balance_of(addr);
        let new_bal = bal
            .checked_add(amount)
            .ok_or_else(|| format!("Credit overflows balance of {}", addr))?;
        self.balances.insert(addr.to_string(), new_bal);
        Ok(())
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), String> {
        if amount == 0 {
            return Err("Native transfer: amount must be > 0".to_string());
        }
        if to.is_empty() {
            return Err("Native transfer: recipient is empty".to_string());
        }
        let from_bal = self.balance_of(from);
        let new_from = from_bal.checked_sub(amount).ok_or_else(|| {
            format!(
                "Insufficient base balance: {} has {} need {}",
                from, from_bal, amount
            )
        })?;
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| format!("Native transfer overflows balance of {}", to))?;
        self.balances.insert(from.to_string(), new_from);
        self.balances.insert(to.to_string(), new_to);
        Ok(())
    }

    /// Total base currency across all accounts.
    pub fn total(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v))
    }
}
